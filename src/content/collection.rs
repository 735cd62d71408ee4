//! Content collections - named groups of files validated by one schema

use anyhow::{anyhow, Result};
use glob::{MatchOptions, Pattern};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::config::{CollectionConfig, CollectionKind, SchemaKind, SiteConfig};

/// Name of the blog post collection
pub const POSTS: &str = "posts";

/// A registered collection, resolved against the content directory
#[derive(Debug, Clone)]
pub struct Collection {
    pub name: String,
    pub kind: CollectionKind,
    pub schema: SchemaKind,
    /// Absolute directory holding the collection's files
    pub directory: PathBuf,
    patterns: Vec<Pattern>,
}

impl Collection {
    /// Resolve a collection from its `_config.yml` entry
    pub fn new(name: &str, config: &CollectionConfig, content_dir: &Path) -> Result<Self> {
        let directory = content_dir.join(config.directory.as_deref().unwrap_or(name));

        let patterns = config
            .patterns
            .clone()
            .unwrap_or_else(|| config.kind.default_patterns())
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| anyhow!("Invalid pattern {:?} in collection {}: {}", p, name, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            kind: config.kind,
            schema: config.schema,
            directory,
            patterns,
        })
    }

    /// Whether a path relative to the collection directory belongs to it
    ///
    /// Files and directories starting with `_` are excluded.
    pub fn matches(&self, relative: &Path) -> bool {
        let hidden = relative.components().any(|c| {
            c.as_os_str()
                .to_str()
                .map(|s| s.starts_with('_') || s.starts_with('.'))
                .unwrap_or(false)
        });
        if hidden {
            return false;
        }

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(relative, options))
    }
}

/// All collections declared by the site, in declaration order
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    collections: IndexMap<String, Collection>,
}

impl CollectionRegistry {
    /// Build the registry from the site configuration
    pub fn from_config(config: &SiteConfig, content_dir: &Path) -> Result<Self> {
        let mut registry = Self::default();
        for (name, collection) in &config.collections {
            registry.register(Collection::new(name, collection, content_dir)?)?;
        }
        Ok(registry)
    }

    /// Register a collection under its name
    pub fn register(&mut self, collection: Collection) -> Result<()> {
        if self.collections.contains_key(&collection.name) {
            anyhow::bail!("Collection already registered: {}", collection.name);
        }
        tracing::debug!(
            "Registered collection {} ({:?}) at {:?}",
            collection.name,
            collection.kind,
            collection.directory
        );
        self.collections.insert(collection.name.clone(), collection);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts() -> Collection {
        Collection::new(POSTS, &CollectionConfig::default(), Path::new("/site/src/content"))
            .unwrap()
    }

    #[test]
    fn test_default_posts_collection() {
        let collection = posts();
        assert_eq!(collection.kind, CollectionKind::Content);
        assert_eq!(collection.schema, SchemaKind::Post);
        assert_eq!(collection.directory, Path::new("/site/src/content/posts"));
    }

    #[test]
    fn test_matches_content_files() {
        let collection = posts();
        assert!(collection.matches(Path::new("hello.md")));
        assert!(collection.matches(Path::new("2024/hello.mdx")));
        assert!(!collection.matches(Path::new("hello.txt")));
        assert!(!collection.matches(Path::new("_draft.md")));
        assert!(!collection.matches(Path::new("_drafts/hello.md")));
    }

    #[test]
    fn test_custom_directory_and_patterns() {
        let config = CollectionConfig {
            kind: CollectionKind::Data,
            directory: Some("authors".to_string()),
            patterns: Some(vec!["*.json".to_string()]),
            ..Default::default()
        };
        let collection = Collection::new("people", &config, Path::new("content")).unwrap();
        assert_eq!(collection.directory, Path::new("content/authors"));
        assert!(collection.matches(Path::new("jane.json")));
        assert!(!collection.matches(Path::new("nested/jane.json")));
        assert!(!collection.matches(Path::new("jane.yml")));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = CollectionConfig {
            patterns: Some(vec!["[".to_string()]),
            ..Default::default()
        };
        assert!(Collection::new(POSTS, &config, Path::new("content")).is_err());
    }

    #[test]
    fn test_registry_from_config() {
        let config = SiteConfig::default();
        let registry = CollectionRegistry::from_config(&config, Path::new("content")).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(POSTS).is_some());

        let mut registry = registry;
        assert!(registry.register(posts()).is_err());
    }
}
