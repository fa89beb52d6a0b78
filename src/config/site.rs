//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    /// Deployment base path, e.g. `/blog/` for a project page
    #[serde(alias = "root")]
    pub base_path: String,

    // Directory
    pub posts_dir: String,
    pub assets_dir: String,
    pub public_dir: String,
    /// Front-end files (scripts, styles) copied as-is into `public_dir`
    pub static_dir: String,
    /// Directory under `public_dir` (and URL segment) for post assets
    pub post_assets_dir: String,

    // Writing
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Random Things".to_string(),
            subtitle: "Archive".to_string(),
            description: String::new(),
            author: String::new(),
            language: "fr".to_string(),

            url: "http://localhost".to_string(),
            base_path: "/".to_string(),

            posts_dir: "post".to_string(),
            assets_dir: "post/assets".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            post_assets_dir: "post-assets".to_string(),

            markdown: MarkdownConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        config.base_path = normalize_base_path(&config.base_path);
        Ok(config)
    }

    /// Replace the base path, normalizing slashes
    pub fn set_base_path(&mut self, base: &str) {
        self.base_path = normalize_base_path(base);
    }

    /// URL prefix under which post assets are served
    pub fn post_assets_base(&self) -> String {
        format!(
            "{}{}/",
            self.base_path,
            self.post_assets_dir.trim_matches('/')
        )
    }
}

/// Make a base path start and end with `/`
pub fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Markdown rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Pass raw HTML through instead of escaping it
    pub raw_html: bool,
    pub highlight_theme: String,
    pub line_number: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            raw_html: false,
            highlight_theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Random Things");
        assert_eq!(config.base_path, "/");
        assert_eq!(config.post_assets_base(), "/post-assets/");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
root: /blog
markdown:
  raw_html: true
"#;
        let mut config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert!(config.markdown.raw_html);
        assert_eq!(config.posts_dir, "post");

        config.set_base_path(&config.base_path.clone());
        assert_eq!(config.base_path, "/blog/");
        assert_eq!(config.post_assets_base(), "/blog/post-assets/");
    }

    #[test]
    fn test_load_normalizes_base_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "base_path: site\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.base_path, "/site/");
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path("repo"), "/repo/");
        assert_eq!(normalize_base_path("/a/b/"), "/a/b/");
    }
}
