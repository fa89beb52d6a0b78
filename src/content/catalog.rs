//! Post catalog - the immutable set of all posts

use std::collections::HashMap;

use super::Post;
use crate::error::{Error, Malformation, Result};

/// All parsed posts, newest first, with O(1) lookup by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    posts: Vec<Post>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from posts in source enumeration order
    pub fn from_posts(posts: Vec<Post>) -> Result<Self> {
        let mut posts = posts;
        // Stable: equal dates keep their enumeration order
        posts.sort_by_key(|p| std::cmp::Reverse(p.timestamp()));

        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(posts.len());
        for (index, post) in posts.iter().enumerate() {
            if let Some(&first) = by_id.get(&post.id) {
                return Err(Error::malformed(
                    &post.source,
                    Malformation::DuplicateId {
                        id: post.id.clone(),
                        first: posts[first].source.clone(),
                    },
                ));
            }
            by_id.insert(post.id.clone(), index);
        }

        Ok(Self { posts, by_id })
    }

    /// Parse `(path, raw)` sources and build the catalog, failing on the
    /// first malformed post
    pub fn parse_sources<'a, I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let posts = sources
            .into_iter()
            .map(|(path, raw)| Post::parse(path, raw))
            .collect::<Result<Vec<_>>>()?;
        Self::from_posts(posts)
    }

    /// Every post, drafts included
    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    /// Posts that are not drafts
    pub fn published_posts(&self) -> Vec<&Post> {
        self.posts.iter().filter(|p| !p.draft).collect()
    }

    /// Draft posts only
    pub fn drafts(&self) -> Vec<&Post> {
        self.posts.iter().filter(|p| p.draft).collect()
    }

    /// Look a post up by id; drafts are found too
    pub fn get(&self, id: &str) -> Option<&Post> {
        self.by_id.get(id).map(|&i| &self.posts[i])
    }

    /// Tags of published posts with their post counts, most used first
    pub fn tags(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for post in self.published_posts() {
            for tag in &post.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        let mut tags: Vec<_> = counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
