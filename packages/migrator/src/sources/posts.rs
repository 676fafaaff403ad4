use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::model::{Frontmatter, Post, PostMeta};

const FRONTMATTER_DELIMITER: &str = "---";
const IMAGES_DIR: &str = "images";
const POST_FOLDER_FILE: &str = "index.md";

/// Exporter output: one markdown file per post, images beside it.
///
/// With post folders every post is `<slug>/index.md` and owns `<slug>/images`.
/// Without them posts are `<slug>.md` sharing the sibling `images` directory.
/// Year and month folders are walked through transparently.
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    root: PathBuf,
    post_folders: bool,
}

impl OutputDirectory {
    pub fn new(root: impl Into<PathBuf>, post_folders: bool) -> Self {
        Self {
            root: root.into(),
            post_folders,
        }
    }

    /// Read every post, ordered by path.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let mut files = Vec::new();
        self.collect_markdown_files(&self.root, &mut files)
            .with_context(|| format!("Failed to scan output directory {}", self.root.display()))?;
        files.sort();

        let posts = files
            .iter()
            .map(|file| self.read_post(file))
            .collect::<Result<Vec<_>>>()?;

        info!(count = posts.len(), root = %self.root.display(), "Loaded exported posts");
        Ok(posts)
    }

    fn collect_markdown_files(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if entry.file_type()?.is_dir() {
                if entry.file_name() != IMAGES_DIR {
                    self.collect_markdown_files(&path, files)?;
                }
                continue;
            }

            let is_post = if self.post_folders {
                entry.file_name() == POST_FOLDER_FILE
            } else {
                path.extension().is_some_and(|ext| ext == "md")
            };
            if is_post {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Read one exported markdown file.
    pub fn read_post(&self, path: &Path) -> Result<Post> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read post {}", path.display()))?;
        let (fields, body) = parse_frontmatter(&raw);

        let title = fields
            .get("title")
            .filter(|t| !t.is_empty())
            .cloned()
            .with_context(|| format!("Post {} has no title", path.display()))?;
        let cover_image = fields.get("coverImage").filter(|c| !c.is_empty()).cloned();

        let parent = path.parent().unwrap_or(Path::new(""));
        let id = if self.post_folders {
            parent.file_name()
        } else {
            path.file_stem()
        }
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

        debug!(post_id = %id, title = %title, "Read exported post");

        Ok(Post {
            meta: PostMeta { id },
            frontmatter: Frontmatter { title, cover_image },
            content: body.to_string(),
            source_path: path.to_path_buf(),
            asset_dir: parent.join(IMAGES_DIR),
        })
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
    } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].replace("''", "'")
    } else {
        value.to_string()
    }
}

/// Split a markdown document into top-level frontmatter fields and body.
///
/// Only scalar `key: value` lines are kept; list items and nested values
/// are ignored. A document without a leading `---` block is all body.
pub fn parse_frontmatter(markdown: &str) -> (HashMap<String, String>, &str) {
    let text = markdown.strip_prefix('\u{feff}').unwrap_or(markdown);
    let mut fields = HashMap::new();

    let mut lines = text.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == FRONTMATTER_DELIMITER => {}
        _ => return (fields, text),
    }

    let mut offset = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
    for line in lines {
        offset += line.len();
        let trimmed = line.trim_end();

        if trimmed == FRONTMATTER_DELIMITER {
            let body = text[offset..].trim_start_matches(['\r', '\n']);
            return (fields, body);
        }
        if trimmed.starts_with(char::is_whitespace) || trimmed.starts_with('-') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once(':') {
            fields.insert(key.trim().to_string(), unquote(value));
        }
    }

    // Unterminated block: treat the whole document as body.
    (HashMap::new(), text)
}
