use anyhow::Result;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, error, info};

use super::MigrationOrchestrator;
use crate::model::SourceCategory;
use crate::target::{BaseTargetClient, RemoteCategory};

/// Parent id of top-level categories.
const ROOT_PARENT_ID: i64 = 0;

/// Result of the category pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome {
    Updated { matched: usize, total: usize },
    BatchFailed { matched: usize, total: usize },
    /// Dry run: computed but not submitted
    NotSubmitted { matched: usize, total: usize },
}

fn decode_slug(slug: &str) -> Cow<'_, str> {
    urlencoding::decode(slug).unwrap_or(Cow::Borrowed(slug))
}

/// Align remote categories with the export taxonomy, in place.
///
/// A remote category with a matching source slug gets the source's first
/// name and its parent resolved by slug among the remote categories (root
/// when it does not resolve). Unmatched remote categories are untouched.
/// Returns the number of matched categories.
pub fn reconcile(remote: &mut [RemoteCategory], source: &[SourceCategory]) -> usize {
    // Ids and slugs are never modified below, so one lookup serves the pass.
    let mut id_by_slug: HashMap<String, i64> = HashMap::new();
    for category in remote.iter() {
        id_by_slug
            .entry(decode_slug(&category.slug).into_owned())
            .or_insert(category.id);
    }

    let mut matched = 0;
    for category in remote.iter_mut() {
        let slug = decode_slug(&category.slug).into_owned();
        let Some(source_category) = source
            .iter()
            .find(|s| decode_slug(&s.term_slug) == slug.as_str())
        else {
            continue;
        };

        let parent_slug = decode_slug(&source_category.term_parent);
        category.parent_id = if parent_slug.is_empty() {
            ROOT_PARENT_ID
        } else {
            id_by_slug
                .get(&*parent_slug)
                .copied()
                .unwrap_or(ROOT_PARENT_ID)
        };

        if let Some(name) = source_category.term_name.first() {
            category.name = name.clone();
        }

        debug!(
            slug = %category.slug,
            name = %category.name,
            parent_id = category.parent_id,
            "Reconciled category"
        );
        matched += 1;
    }

    matched
}

impl<T: BaseTargetClient> MigrationOrchestrator<T> {
    /// Fix up remote category names and hierarchy, then submit them in one batch.
    ///
    /// Failing to list remote categories aborts the run; a rejected batch is
    /// only logged.
    pub async fn reconcile_categories(&self, source: &[SourceCategory]) -> Result<CategoryOutcome> {
        let mut remote = self.target.list_categories().await?;
        let total = remote.len();
        let matched = reconcile(&mut remote, source);

        info!(matched, total, "Reconciled remote categories with export");

        if self.options.dry_run {
            info!("[DRY RUN] category batch not submitted");
            return Ok(CategoryOutcome::NotSubmitted { matched, total });
        }

        match self.target.update_categories(&remote).await {
            Ok(()) => {
                info!(total, "[OK] update categories succeeded");
                Ok(CategoryOutcome::Updated { matched, total })
            }
            Err(e) => {
                error!(
                    error = %format!("{:#}", e),
                    categories = ?remote,
                    "[ERROR] update categories failed"
                );
                Ok(CategoryOutcome::BatchFailed { matched, total })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn remote(id: i64, slug: &str, name: &str, parent_id: i64) -> RemoteCategory {
        RemoteCategory {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            parent_id,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_hierarchy_resolved_by_slug() {
        let source = vec![
            SourceCategory::new("a", "Alpha", ""),
            SourceCategory::new("b", "Beta", "a"),
        ];
        let mut categories = vec![remote(10, "a", "a", 99), remote(11, "b", "b", 42)];

        let matched = reconcile(&mut categories, &source);

        assert_eq!(matched, 2);
        assert_eq!(categories[0].parent_id, 0);
        assert_eq!(categories[0].name, "Alpha");
        assert_eq!(categories[1].parent_id, 10);
        assert_eq!(categories[1].name, "Beta");
    }

    #[test]
    fn test_unmatched_category_untouched() {
        let source = vec![SourceCategory::new("a", "Alpha", "")];
        let mut categories = vec![remote(10, "a", "a", 0), remote(12, "misc", "Misc", 10)];

        reconcile(&mut categories, &source);

        assert_eq!(categories[1], remote(12, "misc", "Misc", 10));
    }

    #[test]
    fn test_unresolved_parent_goes_to_root() {
        let source = vec![SourceCategory::new("b", "Beta", "gone")];
        let mut categories = vec![remote(11, "b", "b", 42)];

        reconcile(&mut categories, &source);

        assert_eq!(categories[0].parent_id, 0);
    }

    #[test]
    fn test_percent_encoded_slugs_are_decoded() {
        let source = vec![
            SourceCategory::new("%e6%8a%80%e6%9c%af", "技术", ""),
            SourceCategory::new("rust", "Rust", "%e6%8a%80%e6%9c%af"),
        ];
        let mut categories = vec![remote(1, "技术", "jishu", 5), remote(2, "rust", "rust", 0)];

        let matched = reconcile(&mut categories, &source);

        assert_eq!(matched, 2);
        assert_eq!(categories[0].name, "技术");
        assert_eq!(categories[0].parent_id, 0);
        assert_eq!(categories[1].parent_id, 1);
    }

    #[test]
    fn test_first_localized_name_wins() {
        let source = vec![SourceCategory {
            term_slug: "news".into(),
            term_name: vec!["News".into(), "Nachrichten".into()],
            term_parent: String::new(),
        }];
        let mut categories = vec![remote(3, "news", "news", 0)];

        reconcile(&mut categories, &source);

        assert_eq!(categories[0].name, "News");
    }

    #[test]
    fn test_empty_name_list_keeps_remote_name() {
        let source = vec![SourceCategory {
            term_slug: "news".into(),
            term_name: vec![],
            term_parent: String::new(),
        }];
        let mut categories = vec![remote(3, "news", "Remote News", 7)];

        reconcile(&mut categories, &source);

        assert_eq!(categories[0].name, "Remote News");
        assert_eq!(categories[0].parent_id, 0);
    }
}
