//! CLI entry point for blog-schema

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_schema::commands::new::NewPostOptions;

#[derive(Parser)]
#[command(name = "blog-schema")]
#[command(version)]
#[command(about = "Validate the content collections of a static blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the front-matter of every collection entry
    #[command(alias = "c")]
    Check {
        /// Re-check when content or configuration changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Layout to reference from the front-matter
        #[arg(short, long)]
        layout: Option<String>,

        /// Language of the post (defaults to "en")
        #[arg(long)]
        lang: Option<String>,

        /// Tag to add (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Category to add (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// File name for the new post, without extension
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Validate one file and print its normalized front-matter as JSON
    Inspect {
        /// Path to the content file
        file: PathBuf,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag, category, lang)
        #[arg(default_value = "post")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blog_schema=debug,info"
    } else {
        "blog_schema=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Check { watch } => {
            let blog = blog_schema::Blog::new(&base_dir)?;
            tracing::info!("Checking content in {:?}", blog.content_dir);

            let summary = blog.check()?;
            if watch {
                blog_schema::commands::check::watch(&base_dir).await?;
            } else if !summary.is_ok() {
                anyhow::bail!(
                    "{} of {} entries have invalid front-matter",
                    summary.invalid,
                    summary.valid + summary.invalid
                );
            } else {
                println!("All {} entries valid", summary.valid);
            }
        }

        Commands::New {
            title,
            layout,
            lang,
            tags,
            categories,
            path,
        } => {
            let blog = blog_schema::Blog::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            let options = NewPostOptions {
                layout,
                lang,
                tags,
                categories,
                path,
            };
            let file = blog_schema::commands::new::create_post(&blog, &title, &options)?;
            println!("Created: {}", file.display());
        }

        Commands::Inspect { file } => {
            let blog = blog_schema::Blog::new(&base_dir)?;
            blog_schema::commands::inspect::run(&blog, &file)?;
        }

        Commands::List { r#type } => {
            let blog = blog_schema::Blog::new(&base_dir)?;
            blog_schema::commands::list::run(&blog, &r#type)?;
        }
    }

    Ok(())
}
