//! folio: build pipeline for a markdown blog
//!
//! Posts are markdown files with a small front-matter block. They are
//! parsed into an immutable [`content::Catalog`], grouped into a year/tag
//! navigation tree, normalized and rendered to HTML, and written out as a
//! static site together with the post assets.

pub mod assets;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod nav;
pub mod templates;

pub use error::{Error, Malformation};

use anyhow::Result;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "_config.yml";

/// The site being built
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown posts directory
    pub posts_dir: PathBuf,
    /// Source directory of post assets
    pub assets_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Base path given on the command line, applied over the config file
    base_override: Option<String>,
}

impl Folio {
    /// Create a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        Self::open(base_dir, None)
    }

    /// Like [`Folio::new`], with the configured base path replaced by `base`
    pub fn open<P: AsRef<Path>>(base_dir: P, base: Option<&str>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        if let Some(base) = base {
            config.set_base_path(base);
        }

        let mut folio = Self::with_config(base_dir, config);
        folio.base_override = base.map(str::to_string);
        Ok(folio)
    }

    /// Create a site from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let assets_dir = base_dir.join(&config.assets_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            assets_dir,
            public_dir,
            base_override: None,
        }
    }

    /// Read the configuration file again, keeping a base path override
    pub fn reload(&self) -> Result<Self> {
        Self::open(&self.base_dir, self.base_override.as_deref())
    }

    /// Where post assets are copied to
    pub fn public_assets_dir(&self) -> PathBuf {
        self.public_dir
            .join(self.config.post_assets_dir.trim_matches('/'))
    }

    /// Front-end files copied into the public directory
    pub fn static_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.static_dir)
    }

    /// Path of the site configuration file
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Load every post into a catalog
    pub fn load_catalog(&self) -> Result<content::Catalog> {
        content::loader::ContentLoader::new(self).load_catalog()
    }

    /// Sync assets and generate the static site
    pub fn build(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Copy post assets into the public directory
    pub fn sync_assets(&self) -> Result<bool> {
        assets::sync(&self.assets_dir, &self.public_assets_dir())
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, tags: &[String], draft: bool) -> Result<PathBuf> {
        commands::new::create_post(self, title, tags, draft)
    }
}
