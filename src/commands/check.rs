//! Validate every content collection

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::new_debouncer;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::config::{SiteConfig, DEFAULT_SITE};
use crate::content::{ContentLoader, EntryError, LoadError};
use crate::{Blog, CONFIG_FILE};

/// Quiet period after the last file event before re-checking
const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(300);

/// Outcome of a check run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub collections: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl CheckSummary {
    pub fn is_ok(&self) -> bool {
        self.invalid == 0
    }
}

/// Load and validate every registered collection, reporting each invalid file
pub fn run(blog: &Blog) -> Result<CheckSummary> {
    let start = Instant::now();
    for warning in config_warnings(&blog.config) {
        tracing::warn!("{}", warning);
    }
    let reports = ContentLoader::new(blog).load_all()?;

    let mut summary = CheckSummary::default();
    for report in &reports {
        summary.collections += 1;
        summary.valid += report.entries.len();
        summary.invalid += report.errors.len();

        for error in &report.errors {
            for line in describe(error) {
                tracing::error!("{}", line);
            }
        }

        tracing::info!(
            "Collection {}: {} valid, {} invalid",
            report.collection,
            report.entries.len(),
            report.errors.len()
        );
    }

    tracing::info!(
        "Checked {} entries in {:.2}s",
        summary.valid + summary.invalid,
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

/// Field-attributed lines for an invalid file, e.g. `posts/a.md: title: required field is missing`
pub fn describe(error: &EntryError) -> Vec<String> {
    match &error.error {
        LoadError::Invalid(invalid) => invalid
            .errors()
            .iter()
            .map(|e| format!("{}: {}", error.path, e))
            .collect(),
        other => vec![format!("{}: {}", error.path, other)],
    }
}

/// Site configuration problems that do not stop content from validating
pub fn config_warnings(config: &SiteConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.has_integration("sitemap") && config.site == DEFAULT_SITE {
        warnings.push(format!(
            "The sitemap integration needs a real `site` URL in {}, found {}",
            CONFIG_FILE, DEFAULT_SITE
        ));
    }
    warnings
}

/// Paths to watch for a blog: the base directory for configuration changes,
/// and every collection directory (or its nearest existing ancestor)
pub fn watch_targets(blog: &Blog) -> Vec<(PathBuf, RecursiveMode)> {
    let mut targets = vec![(blog.base_dir.clone(), RecursiveMode::NonRecursive)];

    let dirs = std::iter::once(&blog.content_dir)
        .chain(blog.collections.iter().map(|c| &c.directory));
    for dir in dirs {
        let target = if dir.is_dir() {
            (dir.clone(), RecursiveMode::Recursive)
        } else {
            // Watch the parent so a directory created later is noticed
            let Some(ancestor) = dir.ancestors().skip(1).find(|p| p.is_dir()) else {
                continue;
            };
            (ancestor.to_path_buf(), RecursiveMode::NonRecursive)
        };
        if let Some(existing) = targets.iter_mut().find(|(p, _)| p == &target.0) {
            if target.1 == RecursiveMode::Recursive {
                existing.1 = RecursiveMode::Recursive;
            }
            continue;
        }
        if targets
            .iter()
            .any(|(p, mode)| *mode == RecursiveMode::Recursive && target.0.starts_with(p))
        {
            continue;
        }
        targets.push(target);
    }

    targets
}

fn rewatch(
    watcher: &mut (impl Watcher + ?Sized),
    watched: &mut Vec<(PathBuf, RecursiveMode)>,
    targets: Vec<(PathBuf, RecursiveMode)>,
) -> Result<()> {
    for old in watched.iter().filter(|w| !targets.contains(w)) {
        tracing::debug!("Unwatching {:?}", old.0);
        if let Err(e) = watcher.unwatch(&old.0) {
            tracing::debug!("Failed to unwatch {:?}: {}", old.0, e);
        }
    }
    watched.retain(|w| targets.contains(w));

    for new in targets {
        if !watched.contains(&new) {
            tracing::debug!("Watching {:?} ({:?})", new.0, new.1);
            watcher.watch(&new.0, new.1)?;
            watched.push(new);
        }
    }
    Ok(())
}

/// Editor and VCS noise that should not trigger a re-check
fn is_relevant(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.contains("node_modules")
        && !path_str.ends_with('~')
}

fn log_outcome(outcome: Result<CheckSummary>) {
    match outcome {
        Ok(summary) if summary.is_ok() => tracing::info!("All {} entries valid", summary.valid),
        Ok(summary) => tracing::warn!("{} invalid entries", summary.invalid),
        Err(e) => tracing::error!("Check failed: {}", e),
    }
}

/// Watch for file changes and re-run the check
///
/// Events are debounced on the trailing edge, so a burst of saves triggers
/// one check after it settles. The site is reloaded on every change and the
/// watched paths follow the reloaded configuration.
pub async fn watch(base_dir: &Path) -> Result<()> {
    let blog = Blog::new(base_dir)?;
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(DEBOUNCE_TIMEOUT, tx)?;

    let mut watched = Vec::new();
    rewatch(debouncer.watcher(), &mut watched, watch_targets(&blog))?;

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Watch error: {:?}", e);
                continue;
            }
        };
        let changed = events.iter().filter(|e| is_relevant(&e.path)).count();
        if changed == 0 {
            continue;
        }

        tracing::info!("{} path(s) changed, re-checking...", changed);
        match Blog::new(base_dir) {
            Ok(blog) => {
                log_outcome(run(&blog));
                if let Err(e) = rewatch(debouncer.watcher(), &mut watched, watch_targets(&blog)) {
                    tracing::error!("Failed to update watched paths: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to reload {}: {}", CONFIG_FILE, e),
        }
    }

    Ok(())
}
