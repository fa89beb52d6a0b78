//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Folio;

const DEFAULT_TAG: &str = "misc";

/// Write a new post skeleton into the posts directory and return its path
pub fn create_post(folio: &Folio, title: &str, tags: &[String], draft: bool) -> Result<PathBuf> {
    let title = title.trim();
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    fs::create_dir_all(&folio.posts_dir)?;
    let file_path = folio.posts_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let tags: Vec<&str> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    let tags = if tags.is_empty() {
        vec![DEFAULT_TAG]
    } else {
        tags
    };

    let mut content = String::from("---\n");
    content.push_str(&format!("title: {}\n", quote_title(title)));
    content.push_str(&format!(
        "date: {}\n",
        chrono::Local::now().format("%Y-%m-%d")
    ));
    content.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    if draft {
        content.push_str("draft: true\n");
    }
    content.push_str("---\n\nWrite here.\n");

    fs::write(&file_path, content)?;
    tracing::debug!("Created post {:?}", file_path);

    Ok(file_path)
}

/// Quote titles that would otherwise read back as a flag or a list
fn quote_title(title: &str) -> String {
    let ambiguous = matches!(title, "true" | "false")
        || title.starts_with(['[', '"', '\''])
        || title.ends_with(['"', '\'']);
    if ambiguous {
        format!("\"{}\"", title)
    } else {
        title.to_string()
    }
}
