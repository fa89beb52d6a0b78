//! Content loader - reads posts from the posts directory

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{Catalog, Post};
use crate::Folio;

/// Loads posts from the posts directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Self {
        Self { folio }
    }

    /// Markdown files directly inside the posts directory, by file name
    pub fn post_files(&self) -> Vec<PathBuf> {
        let posts_dir = &self.folio.posts_dir;
        if !posts_dir.exists() {
            tracing::warn!("Posts directory not found: {:?}", posts_dir);
            return Vec::new();
        }

        WalkDir::new(posts_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_markdown_file(p))
            .collect()
    }

    /// Parse every post. Any malformed post fails the whole load.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();

        for path in self.post_files() {
            let post = self
                .load_post(&path)
                .with_context(|| format!("Failed to load post {:?}", path))?;
            tracing::debug!("Loaded post {} ({})", post.id, post.date);
            posts.push(post);
        }

        Ok(posts)
    }

    /// Load every post into a catalog
    pub fn load_catalog(&self) -> Result<Catalog> {
        let posts = self.load_posts()?;
        let catalog = Catalog::from_posts(posts)?;
        tracing::info!(
            "Loaded {} posts ({} drafts)",
            catalog.len(),
            catalog.drafts().len()
        );
        Ok(catalog)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post> {
        let raw = fs::read_to_string(path)?;
        let source = path.to_string_lossy();
        Ok(Post::parse(&source, &raw)?)
    }
}

/// Check if a file is a markdown post
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Malformation;

    fn write_post(dir: &Path, name: &str, date: &str, draft: bool) {
        let body = format!(
            "---\ntitle: {name}\ndate: {date}\ntags: [misc]\ndraft: {draft}\n---\n\nHello from {name}.\n"
        );
        fs::write(dir.join(name), body).unwrap();
    }

    fn site(dir: &Path) -> Folio {
        Folio::new(dir).unwrap()
    }

    #[test]
    fn test_load_catalog_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("post");
        fs::create_dir_all(posts.join("assets")).unwrap();
        write_post(&posts, "older.md", "2023-05-01", false);
        write_post(&posts, "newer.md", "2024-03-01", false);
        write_post(&posts, "wip.md", "2024-04-01", true);
        fs::write(posts.join("notes.txt"), "not a post").unwrap();
        write_post(&posts.join("assets"), "nested.md", "2024-01-01", false);

        let folio = site(dir.path());
        let catalog = folio.load_catalog().unwrap();

        let ids: Vec<_> = catalog.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["wip", "newer", "older"]);
        assert_eq!(catalog.published_posts().len(), 2);
    }

    #[test]
    fn test_missing_posts_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = site(dir.path()).load_catalog().unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_post_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("post");
        fs::create_dir_all(&posts).unwrap();
        write_post(&posts, "good.md", "2024-03-01", false);
        fs::write(posts.join("broken.md"), "---\ntitle: Broken\n").unwrap();

        let err = site(dir.path()).load_catalog().unwrap_err();
        assert!(format!("{:#}", err).contains("broken.md"));
        let inner = err.downcast_ref::<crate::Error>().unwrap();
        assert_eq!(
            inner.malformation(),
            Some(&Malformation::MissingClosingDelimiter)
        );
    }
}
