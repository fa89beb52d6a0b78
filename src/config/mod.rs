//! Configuration module

mod site;

pub use site::normalize_base_path;
pub use site::MarkdownConfig;
pub use site::SiteConfig;
