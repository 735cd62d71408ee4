//! Validate a single content file and print its normalized front-matter

use anyhow::Result;
use std::path::Path;

use crate::content::{Collection, ContentLoader, Entry, EntryError, POSTS};
use crate::Blog;

/// Validate one file, returning the entry on success
///
/// The file is validated as part of the collection whose directory contains
/// it, falling back to `posts`.
pub fn inspect(blog: &Blog, path: &Path) -> Result<Entry> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        blog.base_dir.join(path)
    };

    let collection = owning_collection(blog, &path)?;
    let loader = ContentLoader::new(blog);

    loader.load_file(collection, &path).map_err(|error| {
        let error = EntryError {
            path: path.display().to_string(),
            error,
        };
        for line in super::check::describe(&error) {
            eprintln!("{}", line);
        }
        anyhow::anyhow!("{} is invalid", error.path)
    })
}

/// Print the validated record as pretty JSON
pub fn run(blog: &Blog, path: &Path) -> Result<()> {
    let entry = inspect(blog, path)?;
    println!("{}", serde_json::to_string_pretty(&entry.data)?);
    Ok(())
}

fn owning_collection<'a>(blog: &'a Blog, path: &Path) -> Result<&'a Collection> {
    blog.collections
        .iter()
        .find(|c| path.starts_with(&c.directory))
        .or_else(|| blog.collections.get(POSTS))
        .ok_or_else(|| anyhow::anyhow!("No collection found for {:?}", path))
}
