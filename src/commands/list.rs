//! List site content

use anyhow::Result;
use std::collections::HashMap;

use crate::content::{ContentLoader, Entry};
use crate::helpers::format_date;
use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let report = ContentLoader::new(blog).load_posts()?;
    if !report.is_ok() {
        tracing::warn!(
            "Skipping {} invalid posts; run `check` for details",
            report.errors.len()
        );
    }
    let posts = report.entries;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in &posts {
                println!(
                    "  {} - {} [{}]",
                    format_date(&post.data.date, &blog.config.date_format),
                    post.data.title,
                    post.source
                );
            }
        }
        "tag" | "tags" => print_counts("Tags", count_by(&posts, |p| p.data.tags())),
        "category" | "categories" => {
            print_counts("Categories", count_by(&posts, |p| p.data.categories()))
        }
        "lang" | "langs" => print_counts(
            "Languages",
            count_by(&posts, |p| std::slice::from_ref(&p.data.lang)),
        ),
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category, lang",
                content_type
            );
        }
    }

    Ok(())
}

/// Count posts per value, most frequent first, ties by name
pub fn count_by<F>(posts: &[Entry], values: F) -> Vec<(String, usize)>
where
    F: Fn(&Entry) -> &[String],
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        for value in values(post) {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<_> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn print_counts(label: &str, counts: Vec<(String, usize)>) {
    println!("{} ({}):", label, counts.len());
    for (name, count) in counts {
        println!("  {} ({})", name, count);
    }
}
