//! Front-matter parsing
//!
//! Posts start with a `---` delimited block written in a small YAML subset:
//! `key: value` scalars, `[a, b]` inline lists, and `key:` followed by
//! `- item` lines for block lists. Anything else inside the block is ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::Malformation;

lazy_static! {
    static ref KEY_LINE: Regex = Regex::new(r"^([A-Za-z0-9_-]+):\s*(.*)$").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"^-+\s+(.*)$").unwrap();
}

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FrontMatterValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl FrontMatterValue {
    /// Parse the right hand side of a `key: value` line
    pub fn parse_scalar(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed {
            "true" => FrontMatterValue::Bool(true),
            "false" => FrontMatterValue::Bool(false),
            _ if trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() >= 2 => {
                FrontMatterValue::List(parse_inline_list(trimmed))
            }
            _ => FrontMatterValue::Text(unquote(trimmed).to_string()),
        }
    }

    /// Non-empty trimmed text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FrontMatterValue::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    /// Interpret as a tag list: lists as-is, a single string as one tag
    pub fn to_tags(&self) -> Vec<String> {
        match self {
            FrontMatterValue::List(items) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            FrontMatterValue::Text(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => Vec::new(),
        }
    }
}

/// Parsed front-matter block, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrontMatter {
    fields: IndexMap<String, FrontMatterValue>,
}

impl FrontMatter {
    /// Split raw post text into front-matter and body, parsing the former.
    /// The returned body is trimmed and uses `\n` line endings.
    pub fn parse(content: &str) -> Result<(Self, String), Malformation> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let lines: Vec<&str> = content
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();

        if lines.first().map(|l| l.trim()) != Some("---") {
            return Err(Malformation::MissingOpeningDelimiter);
        }

        let end = lines
            .iter()
            .skip(1)
            .position(|l| l.trim() == "---")
            .map(|i| i + 1)
            .ok_or(Malformation::MissingClosingDelimiter)?;

        let fm = Self::parse_block(&lines[1..end]);
        let body = lines[end + 1..].join("\n").trim().to_string();

        Ok((fm, body))
    }

    /// Parse the lines between the delimiters
    pub fn parse_block(lines: &[&str]) -> Self {
        let mut fields: IndexMap<String, FrontMatterValue> = IndexMap::new();
        let mut list_key: Option<String> = None;

        for raw in lines {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = KEY_LINE.captures(line) {
                let key = caps[1].to_string();
                let value = caps[2].trim();

                if value.is_empty() {
                    fields.insert(key.clone(), FrontMatterValue::List(Vec::new()));
                    list_key = Some(key);
                } else {
                    fields.insert(key, FrontMatterValue::parse_scalar(value));
                    list_key = None;
                }
                continue;
            }

            if let (Some(caps), Some(key)) = (LIST_ITEM.captures(line), list_key.as_ref()) {
                if let Some(FrontMatterValue::List(items)) = fields.get_mut(key) {
                    items.push(unquote(&caps[1]).to_string());
                }
                continue;
            }

            tracing::debug!("Ignoring front-matter line: {}", line);
        }

        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&FrontMatterValue> {
        self.fields.get(key)
    }

    /// Required non-empty text field
    pub fn require_text(&self, key: &'static str) -> Result<String, Malformation> {
        self.get(key)
            .and_then(FrontMatterValue::as_text)
            .map(str::to_string)
            .ok_or(Malformation::MissingField(key))
    }

    /// Tags as a list; empty when absent
    pub fn tags(&self) -> Vec<String> {
        self.get("tags").map(|v| v.to_tags()).unwrap_or_default()
    }

    /// True only for an explicit boolean `true`
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(FrontMatterValue::Bool(true)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Strip one pair of matching surrounding quotes
fn unquote(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    trimmed
}

fn parse_inline_list(value: &str) -> Vec<String> {
    let inner = value[1..value.len() - 1].trim();
    if inner.is_empty() {
        return Vec::new();
    }
    inner
        .split(',')
        .map(|item| unquote(item).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a front-matter date literal into a UTC timestamp.
/// Values without an offset are read as UTC.
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}
