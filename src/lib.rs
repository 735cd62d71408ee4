//! blog-schema: typed content collections for a static blog
//!
//! This crate loads a blog's site configuration, discovers the files of each
//! content collection and validates their front-matter into typed records.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;

use anyhow::Result;
use std::path::Path;

/// Name of the site configuration file in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A blog site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content directory holding one sub-directory per collection
    pub content_dir: std::path::PathBuf,
    /// Registered content collections
    pub collections: content::CollectionRegistry,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let collections = content::CollectionRegistry::from_config(&config, &content_dir)?;

        Ok(Self {
            config,
            base_dir,
            content_dir,
            collections,
        })
    }

    /// Validate every collection
    pub fn check(&self) -> Result<commands::check::CheckSummary> {
        commands::check::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str) -> Result<std::path::PathBuf> {
        commands::new::create_post(self, title, &commands::new::NewPostOptions::default())
    }
}
