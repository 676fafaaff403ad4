use anyhow::Result;
use std::collections::HashSet;
use tracing::info;

use super::MigrationOrchestrator;
use crate::target::BaseTargetClient;

/// Page size of the one-shot listing of existing posts.
///
/// Remote corpora larger than this are only partially deduplicated.
pub const EXISTING_POSTS_PAGE_SIZE: u32 = 1000;

/// Titles already present on the remote platform.
#[derive(Debug, Clone, Default)]
pub struct ExistingTitles(HashSet<String>);

impl ExistingTitles {
    pub fn is_duplicate(&self, title: &str) -> bool {
        self.0.contains(title)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExistingTitles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<T: BaseTargetClient> MigrationOrchestrator<T> {
    /// Fetch the remote post listing once for the whole run.
    pub async fn load_existing_titles(&self) -> Result<ExistingTitles> {
        let posts = self.target.list_posts(EXISTING_POSTS_PAGE_SIZE).await?;
        let titles: ExistingTitles = posts.into_iter().map(|p| p.title).collect();

        info!(count = titles.len(), "Loaded existing remote posts");
        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_match_is_exact() {
        let titles: ExistingTitles = ["Hello", "Rust 2024"].into_iter().collect();

        assert!(titles.is_duplicate("Hello"));
        assert!(!titles.is_duplicate("hello"));
        assert!(!titles.is_duplicate("Hello "));
        assert!(!titles.is_duplicate("World"));
    }
}
