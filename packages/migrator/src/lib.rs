//! WordPress to Halo migration.
//!
//! Takes posts already exported to markdown (one file per post, images next
//! to it) plus the category taxonomy of the WordPress export, and pushes them
//! into a Halo 1.x instance through its admin API.
//!
//! # Pipeline
//!
//! 1. Check the remote version and list existing posts once.
//! 2. For each post, in order: skip it if its title already exists, upload its
//!    images and rewrite references, import the raw file, then update the
//!    imported post with the rewritten content and cover image.
//! 3. Reconcile remote categories against the export and submit them in one
//!    batch.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wp2halo::{Config, HaloTarget, MigrationOrchestrator, MigrationOptions};
//! use wp2halo::sources::{load_categories, OutputDirectory};
//!
//! let config = Config::from_env()?;
//! let target = HaloTarget::new(&config.halo)?;
//! let posts = OutputDirectory::new(&config.output, config.post_folders).load_posts()?;
//! let categories = load_categories(&config.input)?;
//!
//! let orchestrator = MigrationOrchestrator::new(target, MigrationOptions::default());
//! let report = orchestrator.run(posts, &categories).await?;
//! ```
//!
//! # Modules
//!
//! - [`config`] - Environment-backed run configuration
//! - [`model`] - Source-side post and category records
//! - [`sources`] - Readers for the export output directory and WXR file
//! - [`target`] - The remote platform seam and its Halo implementation
//! - [`migration`] - Orchestrator, image rewriting, commit and reconciliation
//! - [`testing`] - Recording test double for the remote platform

pub mod config;
pub mod migration;
pub mod model;
pub mod sources;
pub mod target;
pub mod testing;

pub use config::{Config, HaloConfig};
pub use migration::{
    CategoryOutcome, FilenameMatching, ImageMigration, MigrationOptions, MigrationOrchestrator,
    MigrationReport, PostOutcome,
};
pub use model::{Frontmatter, Post, PostMeta, SourceCategory};
pub use target::{BaseTargetClient, HaloTarget};
