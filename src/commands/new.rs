//! Create a new post

use anyhow::Result;
use chrono::{SubsecRound, Utc};
use std::fs;
use std::path::PathBuf;

use crate::content::{PostMetadata, PostSchema, Schema, POSTS, DEFAULT_LANG};
use crate::Blog;

/// Optional front-matter for a new post
#[derive(Debug, Clone, Default)]
pub struct NewPostOptions {
    pub layout: Option<String>,
    pub lang: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    /// File name without extension; defaults to the slugified title
    pub path: Option<String>,
}

/// Create a new post in the posts collection
///
/// The front-matter is validated before the file is written, so a freshly
/// scaffolded post always passes `check`.
pub fn create_post(blog: &Blog, title: &str, options: &NewPostOptions) -> Result<PathBuf> {
    let collection = blog
        .collections
        .get(POSTS)
        .ok_or_else(|| anyhow::anyhow!("Collection not registered: {}", POSTS))?;

    let mut meta = PostMetadata::new(title, Utc::now().trunc_subsecs(0));
    meta.layout = options.layout.clone();
    meta.lang = options.lang.clone().unwrap_or_else(|| DEFAULT_LANG.to_string());
    if !options.tags.is_empty() {
        meta.tags = Some(options.tags.clone());
    }
    if !options.categories.is_empty() {
        meta.categories = Some(options.categories.clone());
    }

    let front_matter = serde_yaml::to_string(&meta)?;
    let raw: serde_yaml::Value = serde_yaml::from_str(&front_matter)?;
    PostSchema.validate(&raw)?;

    let name = match &options.path {
        Some(p) => p.clone(),
        None => slug::slugify(title),
    };
    if name.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let file_path = collection.directory.join(format!("{}.md", name));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    // Optional body template
    let scaffold_path = blog.base_dir.join("scaffolds").join("post.md");
    let body = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?.replace("{{ title }}", title)
    } else {
        String::new()
    };

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, format!("---\n{}---\n\n{}", front_matter, body))?;

    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentLoader;
    use tempfile::TempDir;

    #[test]
    fn test_new_post_passes_validation() {
        let tmp = TempDir::new().unwrap();
        let blog = Blog::new(tmp.path()).unwrap();

        let options = NewPostOptions {
            lang: Some("fr".to_string()),
            tags: vec!["rust".to_string(), "yaml: tricky".to_string()],
            ..Default::default()
        };
        let path = create_post(&blog, "Hello: World", &options).unwrap();
        assert!(path.ends_with("src/content/posts/hello-world.md"));

        let report = ContentLoader::new(&blog).load_posts().unwrap();
        assert!(report.is_ok());
        assert_eq!(report.entries.len(), 1);

        let data = &report.entries[0].data;
        assert_eq!(data.title, "Hello: World");
        assert_eq!(data.lang, "fr");
        assert_eq!(data.tags(), ["rust", "yaml: tricky"]);
        assert_eq!(data.categories, None);
    }

    #[test]
    fn test_new_post_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let blog = Blog::new(tmp.path()).unwrap();

        blog.new_post("Same").unwrap();
        assert!(blog.new_post("Same").is_err());
    }

    #[test]
    fn test_new_post_with_scaffold() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("scaffolds")).unwrap();
        fs::write(tmp.path().join("scaffolds/post.md"), "# {{ title }}\n").unwrap();
        let blog = Blog::new(tmp.path()).unwrap();

        let path = blog.new_post("Scaffolded").unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.ends_with("---\n\n# Scaffolded\n"));
    }
}
