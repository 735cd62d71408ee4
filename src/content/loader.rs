//! Content loader - discovers collection files and validates their front-matter

use anyhow::Result;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

use super::collection::{Collection, POSTS};
use super::error::SchemaValidationError;
use super::frontmatter::{self, FrontMatterError};
use super::schema::{PostMetadata, PostSchema, Schema};
use crate::config::{CollectionKind, SchemaKind};
use crate::Blog;

/// A validated collection entry
#[derive(Debug, Clone)]
pub struct Entry<T = PostMetadata> {
    /// Path relative to the collection directory, without extension
    pub id: String,
    /// URL-friendly form of the id
    pub slug: String,
    /// Collection the entry belongs to
    pub collection: String,
    /// Source file path relative to the site base directory
    pub source: String,
    /// Validated front-matter
    pub data: T,
    /// Content after the front-matter (empty for data entries)
    pub body: String,
}

/// Why a single file could not be loaded
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error(transparent)]
    Invalid(#[from] SchemaValidationError),
}

/// A file that failed to load, with its path relative to the site base
#[derive(Debug)]
pub struct EntryError {
    pub path: String,
    pub error: LoadError,
}

/// Result of loading one collection
#[derive(Debug)]
pub struct LoadReport<T = PostMetadata> {
    pub collection: String,
    pub entries: Vec<Entry<T>>,
    pub errors: Vec<EntryError>,
}

impl<T> LoadReport<T> {
    /// Whether every file in the collection validated
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of files seen
    pub fn total(&self) -> usize {
        self.entries.len() + self.errors.len()
    }
}

/// Loads collection files and validates them with a schema
pub struct ContentLoader<'a, S: Schema = PostSchema> {
    blog: &'a Blog,
    schema: S,
}

impl<'a> ContentLoader<'a, PostSchema> {
    /// Create a loader for blog posts
    pub fn new(blog: &'a Blog) -> Self {
        Self::with_schema(blog, PostSchema)
    }

    /// Load the `posts` collection, newest first
    pub fn load_posts(&self) -> Result<LoadReport> {
        let collection = self
            .blog
            .collections
            .get(POSTS)
            .ok_or_else(|| anyhow::anyhow!("Collection not registered: {}", POSTS))?;

        let mut report = self.load(collection)?;
        sort_newest_first(&mut report.entries);
        Ok(report)
    }

    /// Load every registered collection, in declaration order
    pub fn load_all(&self) -> Result<Vec<LoadReport>> {
        let mut reports = Vec::new();
        for collection in self.blog.collections.iter() {
            let mut report = match collection.schema {
                SchemaKind::Post => self.load(collection)?,
            };
            sort_newest_first(&mut report.entries);
            reports.push(report);
        }
        Ok(reports)
    }
}

impl<'a, S: Schema> ContentLoader<'a, S> {
    /// Create a loader with a custom schema
    pub fn with_schema(blog: &'a Blog, schema: S) -> Self {
        Self { blog, schema }
    }

    /// Load and validate every file of a collection
    ///
    /// Per-file failures, including unreadable or dangling walk entries, are
    /// collected in the report; only a failure to read the collection
    /// directory itself is returned as an error.
    pub fn load(&self, collection: &Collection) -> Result<LoadReport<S::Output>> {
        let mut report = LoadReport {
            collection: collection.name.clone(),
            entries: Vec::new(),
            errors: Vec::new(),
        };

        if !collection.directory.exists() {
            tracing::debug!(
                "Collection directory {:?} does not exist, treating {} as empty",
                collection.directory,
                collection.name
            );
            return Ok(report);
        }

        for entry in WalkDir::new(&collection.directory)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| self.relative_source(p))
                        .unwrap_or_else(|| collection.name.clone());
                    tracing::warn!("Skipping {}: {}", path, e);
                    report.errors.push(EntryError {
                        path,
                        error: LoadError::Walk(e),
                    });
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&collection.directory).unwrap_or(path);
            if !collection.matches(relative) {
                continue;
            }

            match self.load_file(collection, path) {
                Ok(entry) => report.entries.push(entry),
                Err(error) => {
                    let path = self.relative_source(path);
                    tracing::debug!("Invalid entry {}: {}", path, error);
                    report.errors.push(EntryError { path, error });
                }
            }
        }

        tracing::debug!(
            "Loaded collection {} ({} schema): {} valid, {} invalid",
            collection.name,
            self.schema.name(),
            report.entries.len(),
            report.errors.len()
        );

        Ok(report)
    }

    /// Load and validate a single file of a collection
    pub fn load_file(
        &self,
        collection: &Collection,
        path: &Path,
    ) -> Result<Entry<S::Output>, LoadError> {
        let content = fs::read_to_string(path)?;

        let (raw, body) = match collection.kind {
            CollectionKind::Content => {
                let (raw, body) = frontmatter::extract(&content)?;
                (raw.unwrap_or(serde_yaml::Value::Null), body.to_string())
            }
            CollectionKind::Data => (frontmatter::parse_data(path, &content)?, String::new()),
        };

        let data = self.schema.validate(&raw)?;

        let relative = path.strip_prefix(&collection.directory).unwrap_or(path);
        let id = entry_id(relative);
        let slug = slugify_id(&id);

        Ok(Entry {
            id,
            slug,
            collection: collection.name.clone(),
            source: self.relative_source(path),
            data,
            body,
        })
    }

    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.blog.base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Sort posts by date descending, ties broken by id
fn sort_newest_first(entries: &mut [Entry<PostMetadata>]) {
    entries.sort_by(|a, b| {
        b.data
            .date
            .cmp(&a.data.date)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Collection-relative path without extension, `/`-separated
fn entry_id(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn slugify_id(id: &str) -> String {
    id.split('/')
        .map(slug::slugify)
        .collect::<Vec<_>>()
        .join("/")
}
