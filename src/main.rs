//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands;
use folio::Folio;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Build pipeline for a markdown blog with a year/tag archive", long_about = None)]
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
    /// Sync post assets and generate the static site
    #[command(alias = "b")]
    Build {
        /// Rebuild on file changes
        #[arg(short, long)]
        watch: bool,

        /// Override the deployment base path, e.g. /blog/
        #[arg(long)]
        base: Option<String>,
    },

    /// Copy post assets into the public directory
    SyncAssets,

    /// List site content
    List {
        /// Type of content to list (posts, drafts, tags, years)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Print the year/tag navigation tree
    Tree {
        /// Keep only nodes whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one post by id
    Show {
        id: String,

        /// Print rendered HTML instead of normalized markdown
        #[arg(long)]
        html: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Tag for the post (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Mark the post as a draft
        #[arg(long)]
        draft: bool,
    },

    /// Remove the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "folio=debug,info" } else { "folio=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build { watch, base } => {
            let folio = Folio::open(&base_dir, base.as_deref())?;

            tracing::info!("Building site...");
            folio.build()?;
            println!("Built successfully!");

            if watch {
                commands::generate::watch(&folio).await?;
            }
        }

        Commands::SyncAssets => {
            let folio = Folio::new(&base_dir)?;
            if folio.sync_assets()? {
                println!("Synced assets to {:?}", folio.public_assets_dir());
            }
        }

        Commands::List { r#type } => {
            let folio = Folio::new(&base_dir)?;
            commands::list::run(&folio, &r#type)?;
        }

        Commands::Tree { filter, json } => {
            let folio = Folio::new(&base_dir)?;
            commands::tree::run(&folio, filter.as_deref(), json)?;
        }

        Commands::Show { id, html } => {
            let folio = Folio::new(&base_dir)?;
            commands::show::run(&folio, &id, html)?;
        }

        Commands::New { title, tags, draft } => {
            let folio = Folio::new(&base_dir)?;
            let path = folio.new_post(&title, &tags, draft)?;
            println!("Created: {:?}", path);
        }

        Commands::Clean => {
            let folio = Folio::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            folio.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
