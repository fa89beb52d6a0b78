//! Print the navigation tree

use anyhow::Result;

use crate::content::Catalog;
use crate::nav;
use crate::Folio;

/// Print the year/tag tree, optionally filtered
pub fn run(folio: &Folio, filter: Option<&str>, json: bool) -> Result<()> {
    let catalog = folio.load_catalog()?;
    print!("{}", render(&catalog, filter, json)?);
    Ok(())
}

pub fn render(catalog: &Catalog, filter: Option<&str>, json: bool) -> Result<String> {
    let tree = nav::build_from_catalog(catalog);
    let tree = match filter {
        Some(query) => nav::filter(&tree, query),
        None => tree,
    };

    if json {
        return Ok(serde_json::to_string_pretty(&tree)? + "\n");
    }
    if tree.is_empty() {
        return Ok("No result\n".to_string());
    }
    Ok(nav::render_text(&tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::parse_sources([
            (
                "post/a.md",
                "---\ntitle: Channels\ndate: 2024-03-01\ntags: [go]\n---\nA",
            ),
            (
                "post/b.md",
                "---\ntitle: Lifetimes\ndate: 2023-05-01\ntags: [rust]\n---\nB",
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_filtered_tree() {
        let text = render(&catalog(), Some("go"), false).unwrap();
        assert_eq!(text, "+ 2024\n  + go\n    - Channels [a]\n");
        assert_eq!(render(&catalog(), Some("zzz"), false).unwrap(), "No result\n");
    }

    #[test]
    fn test_render_json() {
        let text = render(&catalog(), None, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["children"][0]["name"], "rust");
    }
}
