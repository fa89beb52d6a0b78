//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::{Catalog, Post};
use crate::nav;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let catalog = folio.load_catalog()?;
    print!("{}", render(&catalog, content_type)?);
    Ok(())
}

/// Listing text for one content type
pub fn render(catalog: &Catalog, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = catalog.published_posts();
            writeln!(out, "Posts ({}):", posts.len())?;
            write_posts(&mut out, &posts)?;
        }
        "draft" | "drafts" => {
            let drafts = catalog.drafts();
            writeln!(out, "Drafts ({}):", drafts.len())?;
            write_posts(&mut out, &drafts)?;
        }
        "tag" | "tags" => {
            let tags = catalog.tags();
            writeln!(out, "Tags ({}):", tags.len())?;
            for (tag, count) in tags {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        "year" | "years" => {
            let tree = nav::build_from_catalog(catalog);
            writeln!(out, "Years ({}):", tree.len())?;
            for year in &tree {
                writeln!(out, "  {} ({} tags)", year.name(), year.children().len())?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, drafts, tags, years",
                content_type
            );
        }
    }

    Ok(out)
}

fn write_posts(out: &mut String, posts: &[&Post]) -> std::fmt::Result {
    for post in posts {
        writeln!(
            out,
            "  {} - {} [{}] ({})",
            post.date,
            post.title,
            post.id,
            post.tags.join(", ")
        )?;
    }
    Ok(())
}
