//! Post model

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use super::frontmatter::{parse_date_string, FrontMatter};
use crate::error::{Error, Malformation, Result};

/// A blog post, immutable once parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Identifier taken from the source file name
    pub id: String,

    /// Post title
    pub title: String,

    /// Date literal as written in the front-matter
    pub date: String,

    /// Post tags, never empty
    pub tags: Vec<String>,

    /// Markdown body
    pub content: String,

    /// Drafts are hidden from listings but can still be looked up
    pub draft: bool,

    /// Path the post was read from
    #[serde(skip)]
    pub source: String,
}

impl Post {
    /// Parse a post from its source path and raw text
    pub fn parse(path: &str, raw: &str) -> Result<Self> {
        let malformed = |reason| Error::malformed(path, reason);

        let (fm, body) = FrontMatter::parse(raw).map_err(malformed)?;

        let title = fm.require_text("title").map_err(malformed)?;
        let date = fm.require_text("date").map_err(malformed)?;
        let tags = fm.tags();
        if tags.is_empty() {
            return Err(malformed(Malformation::MissingField("tags")));
        }
        if body.is_empty() {
            return Err(malformed(Malformation::EmptyBody));
        }

        Ok(Self {
            id: path_to_id(path),
            title,
            date,
            tags,
            content: body,
            draft: fm.flag("draft"),
            source: path.to_string(),
        })
    }

    /// Publication date, if the literal is a recognized format
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_date_string(&self.date)
    }

    /// Sort key in milliseconds; unparseable dates count as the epoch
    pub fn timestamp(&self) -> i64 {
        self.parsed_date()
            .map(|d| d.timestamp_millis())
            .unwrap_or(0)
    }

    /// First four characters of the date literal
    pub fn year(&self) -> &str {
        match self.date.char_indices().nth(4) {
            Some((end, _)) => &self.date[..end],
            None => &self.date,
        }
    }
}

/// File name without a `.md` extension
pub fn path_to_id(path: &str) -> String {
    let filename = Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path);

    match filename.len().checked_sub(3) {
        Some(cut)
            if filename.is_char_boundary(cut) && filename[cut..].eq_ignore_ascii_case(".md") =>
        {
            filename[..cut].to_string()
        }
        _ => filename.to_string(),
    }
}
