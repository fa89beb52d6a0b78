//! Navigation tree - published posts grouped by year, then by tag
//!
//! The sidebar shows one folder per year (newest first), one folder per tag
//! inside it, and the posts as file leaves. A post with several tags shows
//! up under each of them.

use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

use crate::content::{Catalog, Post};

/// A node of the navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavNode {
    Folder {
        id: String,
        name: String,
        children: Vec<NavNode>,
    },
    File {
        /// Post id
        id: String,
        /// Post title
        name: String,
    },
}

impl NavNode {
    pub fn id(&self) -> &str {
        match self {
            NavNode::Folder { id, .. } | NavNode::File { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NavNode::Folder { name, .. } | NavNode::File { name, .. } => name,
        }
    }

    /// Children of a folder; empty for files
    pub fn children(&self) -> &[NavNode] {
        match self {
            NavNode::Folder { children, .. } => children,
            NavNode::File { .. } => &[],
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, NavNode::Folder { .. })
    }
}

/// Build the tree for the published posts of a catalog
pub fn build_from_catalog(catalog: &Catalog) -> Vec<NavNode> {
    build_tree(&catalog.published_posts())
}

/// Group posts into year folders containing tag folders
pub fn build_tree(posts: &[&Post]) -> Vec<NavNode> {
    let mut years: Vec<&str> = Vec::new();
    for post in posts {
        if !years.contains(&post.year()) {
            years.push(post.year());
        }
    }
    years.sort_by(|a, b| compare_years(a, b));

    years
        .into_iter()
        .map(|year| {
            let mut by_tag: BTreeMap<&str, Vec<&Post>> = BTreeMap::new();
            for post in posts.iter().filter(|p| p.year() == year) {
                let mut seen: Vec<&str> = Vec::new();
                for tag in &post.tags {
                    if seen.contains(&tag.as_str()) {
                        continue;
                    }
                    seen.push(tag);
                    by_tag.entry(tag).or_default().push(post);
                }
            }

            let children = by_tag
                .into_iter()
                .map(|(tag, mut tag_posts)| {
                    tag_posts.sort_by_key(|p| Reverse(p.timestamp()));
                    NavNode::Folder {
                        id: format!("category:{}:{}", year, tag),
                        name: tag.to_string(),
                        children: tag_posts
                            .into_iter()
                            .map(|p| NavNode::File {
                                id: p.id.clone(),
                                name: p.title.clone(),
                            })
                            .collect(),
                    }
                })
                .collect();

            NavNode::Folder {
                id: format!("year:{}", year),
                name: year.to_string(),
                children,
            }
        })
        .collect()
}

/// Newest year first: numeric when both parse, otherwise by reverse text
fn compare_years(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) if x != y => y.cmp(&x),
        _ => b.cmp(a),
    }
}

/// Keep the nodes whose name contains `query` (ignoring case).
///
/// A matching node is kept whole; a folder that does not match itself keeps
/// only its matching descendants, and is dropped if there are none.
pub fn filter(nodes: &[NavNode], query: &str) -> Vec<NavNode> {
    if query.is_empty() {
        return nodes.to_vec();
    }
    let query = query.to_lowercase();
    filter_nodes(nodes, &query)
}

fn filter_nodes(nodes: &[NavNode], query: &str) -> Vec<NavNode> {
    nodes
        .iter()
        .filter_map(|node| {
            if node.name().to_lowercase().contains(query) {
                return Some(node.clone());
            }
            match node {
                NavNode::Folder { id, name, children } => {
                    let children = filter_nodes(children, query);
                    (!children.is_empty()).then(|| NavNode::Folder {
                        id: id.clone(),
                        name: name.clone(),
                        children,
                    })
                }
                NavNode::File { .. } => None,
            }
        })
        .collect()
}

/// Indented plain-text rendering, one node per line
pub fn render_text(nodes: &[NavNode]) -> String {
    fn walk(nodes: &[NavNode], depth: usize, out: &mut String) {
        for node in nodes {
            let marker = if node.is_folder() { "+" } else { "-" };
            out.push_str(&format!("{}{} {}", "  ".repeat(depth), marker, node.name()));
            if let NavNode::File { id, .. } = node {
                out.push_str(&format!(" [{}]", id));
            }
            out.push('\n');
            walk(node.children(), depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(nodes, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, title: &str, date: &str, tags: &[&str]) -> Post {
        Post {
            id: id.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            content: "body".to_string(),
            draft: false,
            source: String::new(),
        }
    }

    fn names(nodes: &[NavNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn test_two_years_two_tags() {
        let a = post("a", "Concurrency notes", "2024-03-01", &["go"]);
        let b = post("b", "Borrow checker", "2023-05-01", &["rust"]);
        let tree = build_tree(&[&a, &b]);

        assert_eq!(names(&tree), vec!["2024", "2023"]);
        assert_eq!(tree[0].id(), "year:2024");
        assert_eq!(names(tree[0].children()), vec!["go"]);
        assert_eq!(tree[0].children()[0].id(), "category:2024:go");
        assert_eq!(
            tree[0].children()[0].children(),
            &[NavNode::File {
                id: "a".to_string(),
                name: "Concurrency notes".to_string()
            }]
        );
        assert_eq!(names(tree[1].children()), vec!["rust"]);
        assert_eq!(tree[1].children()[0].children().len(), 1);

        let filtered = filter(&tree, "go");
        assert_eq!(names(&filtered), vec!["2024"]);
        assert_eq!(names(filtered[0].children()), vec!["go"]);
    }

    #[test]
    fn test_post_listed_under_every_distinct_tag() {
        let a = post("a", "A", "2024-01-01", &["web", "rust", "web"]);
        let tree = build_tree(&[&a]);
        let tags = tree[0].children();
        assert_eq!(names(tags), vec!["rust", "web"]);
        assert!(tags.iter().all(|t| t.children().len() == 1));
    }

    #[test]
    fn test_posts_in_tag_newest_first() {
        let old = post("old", "Old", "2024-01-01", &["x"]);
        let undated = post("undated", "Undated", "2024-??", &["x"]);
        let new = post("new", "New", "2024-06-01", &["x"]);
        let tree = build_tree(&[&undated, &old, &new]);

        let ids: Vec<_> = tree[0].children()[0]
            .children()
            .iter()
            .map(|n| n.id())
            .collect();
        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_year_ordering() {
        assert_eq!(compare_years("2024", "2023"), Ordering::Less);
        assert_eq!(compare_years("999", "2023"), Ordering::Greater);
        assert_eq!(compare_years("abcd", "2023"), Ordering::Less);

        let a = post("a", "A", "2023-01-01", &["x"]);
        let b = post("b", "B", "n/a", &["x"]);
        let c = post("c", "C", "2025-01-01", &["x"]);
        assert_eq!(names(&build_tree(&[&a, &b, &c])), vec!["n/a", "2025", "2023"]);
    }

    #[test]
    fn test_filter_keeps_matching_folder_whole() {
        let a = post("a", "Alpha", "2024-01-01", &["rust"]);
        let b = post("b", "Beta", "2024-02-01", &["rust"]);
        let tree = build_tree(&[&a, &b]);

        let by_tag = filter(&tree, "RUST");
        assert_eq!(by_tag[0].children()[0].children().len(), 2);

        let by_title = filter(&tree, "alp");
        let leaves = by_title[0].children()[0].children();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].id(), "a");

        assert!(filter(&tree, "nothing").is_empty());
        assert!(filter(&tree, "rust ").is_empty());
        assert_eq!(filter(&tree, " ").len(), 0);
        assert_eq!(filter(&tree, ""), tree);
    }

    #[test]
    fn test_render_text() {
        let a = post("a", "Alpha", "2024-01-01", &["rust"]);
        let text = render_text(&build_tree(&[&a]));
        assert_eq!(text, "+ 2024\n  + rust\n    - Alpha [a]\n");
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let node = NavNode::File {
            id: "a".to_string(),
            name: "A".to_string(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "file");
    }
}
