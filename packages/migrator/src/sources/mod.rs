//! Readers for what the WordPress exporter leaves on disk.
//!
//! - [`OutputDirectory`] - markdown posts and their images
//! - [`load_categories`] - category terms of the WXR export file

mod categories;
mod posts;

pub use categories::{load_categories, parse_categories};
pub use posts::{parse_frontmatter, OutputDirectory};
