//! Content module - posts, the catalog, and markdown processing

mod catalog;
mod frontmatter;
pub mod loader;
mod markdown;
pub mod normalize;
mod post;

pub use catalog::Catalog;
pub use frontmatter::{parse_date_string, FrontMatter, FrontMatterValue};
pub use markdown::{model_preview_html, MarkdownRenderer};
pub use post::{path_to_id, Post};
