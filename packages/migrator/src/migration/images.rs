use anyhow::{bail, Result};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info, warn};

use super::MigrationOrchestrator;
use crate::model::Post;
use crate::target::BaseTargetClient;

/// How an image filename is placed into the reference pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilenameMatching {
    /// The filename matches only itself
    #[default]
    Escaped,
    /// The filename is used as a pattern fragment; `.` matches any character
    /// and a filename that is not a valid pattern rewrites nothing
    Literal,
}

impl FromStr for FilenameMatching {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "escaped" => Ok(Self::Escaped),
            "literal" => Ok(Self::Literal),
            other => bail!("unknown filename matching mode: {}", other),
        }
    }
}

/// What happened to a post's images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMigration {
    /// No asset directory; content left as is
    NoAssetDir,
    Processed { uploaded: usize, failed: usize },
}

fn image_reference_pattern(file_name: &str, matching: FilenameMatching) -> Option<Regex> {
    let name: Cow<'_, str> = match matching {
        FilenameMatching::Escaped => Cow::Owned(regex::escape(file_name)),
        FilenameMatching::Literal => Cow::Borrowed(file_name),
    };

    // Named groups: a literal filename may carry groups of its own
    Regex::new(&format!(
        r"(?i)(?P<open>!\[.*?\]\()images/{}(?P<close>\))",
        name
    ))
    .ok()
}

/// Point every `![alt](images/<file_name>)` reference at `remote_path`.
///
/// Matching is case-insensitive and keeps the alt text.
pub fn rewrite_image_references<'a>(
    content: &'a str,
    file_name: &str,
    remote_path: &str,
    matching: FilenameMatching,
) -> Cow<'a, str> {
    let Some(pattern) = image_reference_pattern(file_name, matching) else {
        warn!(file = file_name, "Filename is not a valid pattern, references left unchanged");
        return Cow::Borrowed(content);
    };

    pattern.replace_all(content, |caps: &Captures<'_>| {
        format!("{}{}{}", &caps["open"], remote_path, &caps["close"])
    })
}

/// Regular files of `dir`, sorted by name. `None` when the directory is unreadable.
async fn list_asset_files(dir: &Path) -> Option<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;

    let mut files = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                    files.push(entry.path());
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to read asset directory entry");
                break;
            }
        }
    }

    files.sort();
    Some(files)
}

impl<T: BaseTargetClient> MigrationOrchestrator<T> {
    /// Upload the post's images one by one and rewrite references to them.
    ///
    /// A failed upload leaves that image's references untouched and moves on.
    pub async fn migrate_images(&self, post: &mut Post) -> ImageMigration {
        let Some(files) = list_asset_files(&post.asset_dir).await else {
            info!(
                post_id = %post.meta.id,
                dir = %post.asset_dir.display(),
                "[SKIP] image dir of this post does not exist"
            );
            return ImageMigration::NoAssetDir;
        };

        let mut uploaded = 0;
        let mut failed = 0;

        for file in files {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let remote_path = match self.target.upload_attachment(&file).await {
                Ok(path) => path,
                Err(e) => {
                    error!(
                        post_id = %post.meta.id,
                        file = %file_name,
                        error = %format!("{:#}", e),
                        "[ERROR] upload image failed"
                    );
                    failed += 1;
                    continue;
                }
            };

            if post.frontmatter.cover_image.as_deref() == Some(file_name.as_str()) {
                post.frontmatter.cover_image = Some(remote_path.clone());
            }

            let rewritten = rewrite_image_references(
                &post.content,
                &file_name,
                &remote_path,
                self.options.filename_matching,
            );
            if let Cow::Owned(content) = rewritten {
                post.content = content;
            }

            info!(
                post_id = %post.meta.id,
                file = %file_name,
                remote_path = %remote_path,
                "[OK] upload image succeeded"
            );
            uploaded += 1;
        }

        ImageMigration::Processed { uploaded, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REMOTE: &str = "/upload/2024/05/cover-abc.jpg";

    #[test]
    fn test_rewrites_every_occurrence_and_keeps_alt_text() {
        let content = "![First](images/cover.jpg)\n\ntext\n\n![Second one](images/cover.jpg)";
        let out = rewrite_image_references(content, "cover.jpg", REMOTE, FilenameMatching::Escaped);

        assert_eq!(
            out,
            format!("![First]({})\n\ntext\n\n![Second one]({})", REMOTE, REMOTE)
        );
    }

    #[test]
    fn test_other_filenames_untouched() {
        let content = "![a](images/cover.jpg) ![b](images/other.png) ![c](images/cover.jpg.bak)";
        let out = rewrite_image_references(content, "cover.jpg", REMOTE, FilenameMatching::Escaped);

        assert_eq!(
            out,
            format!("![a]({}) ![b](images/other.png) ![c](images/cover.jpg.bak)", REMOTE)
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let content = "![a](Images/COVER.JPG)";
        let out = rewrite_image_references(content, "cover.jpg", REMOTE, FilenameMatching::Escaped);

        assert_eq!(out, format!("![a]({})", REMOTE));
    }

    #[test]
    fn test_plain_links_are_not_images() {
        let content = "[download](images/cover.jpg)";
        let out = rewrite_image_references(content, "cover.jpg", REMOTE, FilenameMatching::Escaped);

        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_remote_path_with_dollar_is_inserted_verbatim() {
        let content = "![a](images/cover.jpg)";
        let out = rewrite_image_references(content, "cover.jpg", "/upload/$1.jpg", FilenameMatching::Escaped);

        assert_eq!(out, "![a](/upload/$1.jpg)");
    }

    #[test]
    fn test_escaped_dot_does_not_match_other_characters() {
        let content = "![a](images/coverXjpg)";
        let out = rewrite_image_references(content, "cover.jpg", REMOTE, FilenameMatching::Escaped);

        assert_eq!(out, content);
    }

    #[test]
    fn test_literal_dot_matches_any_character() {
        let content = "![a](images/coverXjpg)";
        let out = rewrite_image_references(content, "cover.jpg", REMOTE, FilenameMatching::Literal);

        assert_eq!(out, format!("![a]({})", REMOTE));
    }

    #[test]
    fn test_escaped_handles_pattern_metacharacters() {
        let content = "![a](images/photo(1).jpg)";
        let out = rewrite_image_references(content, "photo(1).jpg", REMOTE, FilenameMatching::Escaped);

        assert_eq!(out, format!("![a]({})", REMOTE));
    }

    #[test]
    fn test_literal_metacharacters_change_meaning() {
        // "(1)" is a group in literal mode, so it matches "photo1.jpg" and not itself
        let content = "![a](images/photo(1).jpg) ![b](images/photo1.jpg)";
        let out = rewrite_image_references(content, "photo(1).jpg", REMOTE, FilenameMatching::Literal);

        assert_eq!(out, format!("![a](images/photo(1).jpg) ![b]({})", REMOTE));
    }

    #[test]
    fn test_literal_invalid_pattern_leaves_content() {
        let content = "![a](images/photo(1.jpg)";
        let out = rewrite_image_references(content, "photo(1.jpg", REMOTE, FilenameMatching::Literal);

        assert_eq!(out, content);
    }

    #[test]
    fn test_filename_matching_from_str() {
        assert_eq!("escaped".parse::<FilenameMatching>().unwrap(), FilenameMatching::Escaped);
        assert_eq!("LITERAL".parse::<FilenameMatching>().unwrap(), FilenameMatching::Literal);
        assert!("fuzzy".parse::<FilenameMatching>().is_err());
    }
}
