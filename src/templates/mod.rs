//! Built-in site templates using the Tera template engine
//!
//! Every page extends `layout.html`, which carries the archive sidebar. The
//! background canvas and the 3D previews are driven by `app.js`, which
//! attaches to the `data-*` hooks emitted here.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{article_url, html_escape, url_for};
use crate::nav::NavNode;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // URLs must stay as they are; text is escaped with `escape_html`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("index.html", include_str!("folio/index.html")),
            ("article.html", include_str!("folio/article.html")),
            ("not_found.html", include_str!("folio/not_found.html")),
            (
                "partials/sidebar.html",
                include_str!("folio/partials/sidebar.html"),
            ),
        ])?;

        tera.register_filter("escape_html", escape_html_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape HTML special characters, leaving `/` alone
fn escape_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("escape_html", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub language: String,
    /// Site origin without a trailing slash
    pub url: String,
    pub base_path: String,
    pub home_url: String,
    pub css_url: String,
    pub js_url: String,
    pub nav_json_url: String,
}

impl ConfigData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            url: config.url.trim_end_matches('/').to_string(),
            base_path: config.base_path.clone(),
            home_url: url_for(config, "/"),
            css_url: url_for(config, "app.css"),
            js_url: url_for(config, "app.js"),
            nav_json_url: url_for(config, "nav.json"),
        }
    }
}

/// A published post as listed on pages and in `posts.json`
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub url: String,
}

impl PostData {
    pub fn from_post(config: &SiteConfig, post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            date: post.date.clone(),
            tags: post.tags.clone(),
            url: article_url(config, &post.id),
        }
    }
}

/// The navigation tree flattened for a plain template loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavEntry {
    FolderStart { name: String, open: bool },
    FolderEnd,
    File { name: String, url: String, selected: bool },
}

/// Flatten `nodes` depth-first. Top-level folders start expanded and the
/// post `current` is marked selected.
pub fn flatten_nav(config: &SiteConfig, nodes: &[NavNode], current: Option<&str>) -> Vec<NavEntry> {
    fn walk(
        config: &SiteConfig,
        nodes: &[NavNode],
        level: usize,
        current: Option<&str>,
        out: &mut Vec<NavEntry>,
    ) {
        for node in nodes {
            match node {
                NavNode::Folder { name, children, .. } => {
                    out.push(NavEntry::FolderStart {
                        name: name.clone(),
                        open: level == 0,
                    });
                    walk(config, children, level + 1, current, out);
                    out.push(NavEntry::FolderEnd);
                }
                NavNode::File { id, name } => out.push(NavEntry::File {
                    name: name.clone(),
                    url: article_url(config, id),
                    selected: current == Some(id.as_str()),
                }),
            }
        }
    }

    let mut out = Vec::new();
    walk(config, nodes, 0, current, &mut out);
    out
}
