//! Show a single post

use anyhow::Result;
use std::fmt::Write;

use crate::content::normalize::rewrite_anchors;
use crate::content::{Catalog, MarkdownRenderer};
use crate::Folio;

/// Print a post's metadata followed by its normalized markdown or HTML
pub fn run(folio: &Folio, id: &str, html: bool) -> Result<()> {
    let catalog = folio.load_catalog()?;
    print!("{}", render(folio, &catalog, id, html)?);
    Ok(())
}

pub fn render(folio: &Folio, catalog: &Catalog, id: &str, html: bool) -> Result<String> {
    let Some(post) = catalog.get(id) else {
        anyhow::bail!("post not found: {}", id);
    };

    let mut out = String::new();
    writeln!(out, "id:    {}", post.id)?;
    writeln!(out, "title: {}", post.title)?;
    writeln!(out, "date:  {}", post.date)?;
    writeln!(out, "tags:  {}", post.tags.join(", "))?;
    if post.draft {
        writeln!(out, "draft: true")?;
    }
    writeln!(out)?;

    if html {
        let renderer = MarkdownRenderer::from_config(&folio.config);
        out.push_str(&renderer.render_post(&post.content)?);
    } else {
        out.push_str(&rewrite_anchors(&post.content));
        out.push('\n');
    }

    Ok(out)
}
