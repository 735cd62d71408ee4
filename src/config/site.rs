//! Site configuration (_config.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::helpers;

/// Placeholder site URL used when `_config.yml` does not set one
pub const DEFAULT_SITE: &str = "http://example.com";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub site: String,

    // Directory
    pub content_dir: String,

    // Build integrations (mdx, sitemap, ...)
    pub integrations: Vec<String>,

    // Date format (Moment.js style) used when listing posts
    pub date_format: String,

    // Content collections, in declaration order
    pub collections: IndexMap<String, CollectionConfig>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut collections = IndexMap::new();
        collections.insert("posts".to_string(), CollectionConfig::default());

        Self {
            site: DEFAULT_SITE.to_string(),

            content_dir: "src/content".to_string(),

            integrations: vec!["mdx".to_string(), "sitemap".to_string()],

            date_format: "YYYY-MM-DD".to_string(),

            collections,
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        helpers::check_date_format(&config.date_format)?;
        Ok(config)
    }

    /// Whether an integration is enabled
    pub fn has_integration(&self, name: &str) -> bool {
        self.integrations.iter().any(|i| i == name)
    }
}

/// Kind of files a collection holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// Markdown/MDX files with front matter
    #[default]
    Content,
    /// YAML/JSON files where the whole file is the entry
    Data,
}

impl CollectionKind {
    /// Glob patterns used when a collection does not set its own
    pub fn default_patterns(self) -> Vec<String> {
        let patterns: &[&str] = match self {
            CollectionKind::Content => &["**/*.md", "**/*.mdx", "**/*.markdown"],
            CollectionKind::Data => &["**/*.yml", "**/*.yaml", "**/*.json"],
        };
        patterns.iter().map(|p| p.to_string()).collect()
    }
}

/// Which schema validates a collection's entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    #[default]
    Post,
}

/// A single collection entry in `collections:`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CollectionConfig {
    #[serde(rename = "type")]
    pub kind: CollectionKind,
    pub schema: SchemaKind,
    /// Directory relative to `content_dir`; defaults to the collection name
    pub directory: Option<String>,
    /// Glob patterns relative to the collection directory
    pub patterns: Option<Vec<String>>,
}
