//! Migration orchestrator.
//!
//! Drives every call against the remote platform, strictly in sequence:
//! one post at a time in source order, each post's images before its import,
//! its import before its update, and the category batch last.
//!
//! Outcomes are returned by each step and folded into a [`MigrationReport`]
//! by [`MigrationOrchestrator::run`]; nothing is counted through shared state.

mod categories;
mod commit;
mod dedup;
mod images;

pub use categories::{reconcile, CategoryOutcome};
pub use dedup::{ExistingTitles, EXISTING_POSTS_PAGE_SIZE};
pub use images::{rewrite_image_references, FilenameMatching, ImageMigration};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{Post, SourceCategory};
use crate::target::BaseTargetClient;

/// Major version of the Halo admin API this tool speaks.
const SUPPORTED_MAJOR_VERSION: u64 = 1;

/// Terminal state of one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// A post with the same title already exists remotely
    Skipped,
    /// Dry run: the post would have been migrated
    WouldMigrate,
    /// Import succeeded; `updated` is false when the follow-up update failed
    Imported { updated: bool },
    /// Import failed, nothing else was attempted
    ImportFailed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationOptions {
    pub filename_matching: FilenameMatching,
    /// List and deduplicate only; no upload, import or update
    pub dry_run: bool,
}

/// Tally of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Posts whose import succeeded, whether or not the update did
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub would_migrate: usize,
    /// Imported posts left with their raw content because the update failed
    pub update_failures: usize,
    pub categories: Option<CategoryOutcome>,
}

impl MigrationReport {
    pub fn record(&mut self, outcome: PostOutcome) {
        match outcome {
            PostOutcome::Skipped => self.skipped += 1,
            PostOutcome::WouldMigrate => self.would_migrate += 1,
            PostOutcome::Imported { updated } => {
                self.succeeded += 1;
                if !updated {
                    self.update_failures += 1;
                }
            }
            PostOutcome::ImportFailed => self.failed += 1,
        }
    }

    /// Posts that went through the import pipeline.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

pub struct MigrationOrchestrator<T: BaseTargetClient> {
    target: T,
    options: MigrationOptions,
}

impl<T: BaseTargetClient> MigrationOrchestrator<T> {
    pub fn new(target: T, options: MigrationOptions) -> Self {
        Self { target, options }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Fail the run early if the remote platform is not a supported version.
    pub async fn check_remote_version(&self) -> Result<semver::Version> {
        let raw = self.target.version().await?;
        let version = semver::Version::parse(raw.trim_start_matches('v'))
            .with_context(|| format!("Unrecognised Halo version {:?}", raw))?;

        if version.major != SUPPORTED_MAJOR_VERSION {
            bail!(
                "Halo {} is not supported, this tool requires Halo {}.x",
                version,
                SUPPORTED_MAJOR_VERSION
            );
        }

        info!(%version, "Remote platform version accepted");
        Ok(version)
    }

    /// Run the whole migration: posts in order, then categories.
    ///
    /// Errors returned from here abort the run; per-post and per-call
    /// failures are logged and reflected in the report instead.
    pub async fn run<I>(&self, posts: I, categories: &[SourceCategory]) -> Result<MigrationReport>
    where
        I: IntoIterator<Item = Post>,
    {
        self.check_remote_version().await?;

        info!("Start to import posts and their attachments");
        let existing = self.load_existing_titles().await?;

        let mut report = MigrationReport::default();
        for post in posts {
            let outcome = self.migrate_post(post, &existing).await;
            report.record(outcome);
        }

        report.categories = Some(self.reconcile_categories(categories).await?);

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "Migration finished"
        );
        Ok(report)
    }

    /// Full pipeline for one post: dedup, images, import, update.
    pub async fn migrate_post(&self, mut post: Post, existing: &ExistingTitles) -> PostOutcome {
        info!(
            post_id = %post.meta.id,
            title = %post.frontmatter.title,
            "Processing post"
        );

        if existing.is_duplicate(&post.frontmatter.title) {
            info!(title = %post.frontmatter.title, "[SKIP] post of this title already exists");
            return PostOutcome::Skipped;
        }

        if self.options.dry_run {
            info!(title = %post.frontmatter.title, "[DRY RUN] would migrate post");
            return PostOutcome::WouldMigrate;
        }

        let images = self.migrate_images(&mut post).await;
        debug!(post_id = %post.meta.id, ?images, "Images migrated");
        self.commit_post(&post).await
    }
}
