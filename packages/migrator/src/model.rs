//! Source-side records handed to the migration.

use std::path::PathBuf;

/// Identity of a post in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMeta {
    /// Export identifier (the post slug), used in log lines only
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: String,
    /// Local filename of the cover image; replaced by the remote path once uploaded
    pub cover_image: Option<String>,
}

/// A post read from the export output directory.
///
/// `content` is rewritten in place while images are migrated; `source_path`
/// always points at the untouched file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub meta: PostMeta,
    pub frontmatter: Frontmatter,
    /// Markdown body without frontmatter
    pub content: String,
    /// Raw markdown file (frontmatter included) submitted for import
    pub source_path: PathBuf,
    /// Directory holding this post's images
    pub asset_dir: PathBuf,
}

/// A category term from the WordPress export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCategory {
    pub term_slug: String,
    /// Display names in document order; the first one wins
    pub term_name: Vec<String>,
    /// Parent slug, empty for top-level terms
    pub term_parent: String,
}

impl SourceCategory {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            term_slug: slug.into(),
            term_name: vec![name.into()],
            term_parent: parent.into(),
        }
    }
}
