// The remote platform seam.
//
// Infrastructure only: the orchestrator decides what to call and in which
// order, implementations just talk to the platform.

use anyhow::{Context, Result};
use async_trait::async_trait;
use halo_client::HaloClient;
use std::path::Path;

pub use halo_client::{PostSummary, RemoteCategory, RemotePost};

use crate::config::HaloConfig;

#[async_trait]
pub trait BaseTargetClient: Send + Sync {
    /// List existing posts with a single page of `size` entries
    async fn list_posts(&self, size: u32) -> Result<Vec<PostSummary>>;

    /// Upload a local file as an attachment, returning its remote path
    async fn upload_attachment(&self, file: &Path) -> Result<String>;

    /// Import a raw markdown file as a new post
    async fn import_markdown(&self, file: &Path) -> Result<RemotePost>;

    /// Overwrite an existing post with `post`, addressed by `post.id`
    async fn update_post(&self, post: &RemotePost) -> Result<()>;

    async fn list_categories(&self) -> Result<Vec<RemoteCategory>>;

    /// Submit every category in one call
    async fn update_categories(&self, categories: &[RemoteCategory]) -> Result<()>;

    /// Version string of the remote platform
    async fn version(&self) -> Result<String>;
}

/// [`BaseTargetClient`] backed by the Halo admin API.
pub struct HaloTarget {
    client: HaloClient,
}

impl HaloTarget {
    pub fn new(config: &HaloConfig) -> Result<Self> {
        let client = HaloClient::new(config.base_url.as_str(), config.admin_token())
            .context("Failed to create Halo client")?;

        Ok(Self { client })
    }
}

async fn read_file(file: &Path) -> Result<(String, Vec<u8>)> {
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", file.display()))?;
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    Ok((file_name, bytes))
}

#[async_trait]
impl BaseTargetClient for HaloTarget {
    async fn list_posts(&self, size: u32) -> Result<Vec<PostSummary>> {
        self.client
            .list_posts(size)
            .await
            .context("Failed to list posts")
    }

    async fn upload_attachment(&self, file: &Path) -> Result<String> {
        let (file_name, bytes) = read_file(file).await?;
        let attachment = self
            .client
            .upload_attachment(&file_name, bytes)
            .await
            .with_context(|| format!("Failed to upload {}", file_name))?;

        Ok(attachment.path)
    }

    async fn import_markdown(&self, file: &Path) -> Result<RemotePost> {
        let (file_name, bytes) = read_file(file).await?;
        self.client
            .import_markdown(&file_name, bytes)
            .await
            .with_context(|| format!("Failed to import {}", file.display()))
    }

    async fn update_post(&self, post: &RemotePost) -> Result<()> {
        self.client
            .update_post(post.id, post)
            .await
            .with_context(|| format!("Failed to update post {}", post.id))?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<RemoteCategory>> {
        self.client
            .list_categories()
            .await
            .context("Failed to list categories")
    }

    async fn update_categories(&self, categories: &[RemoteCategory]) -> Result<()> {
        self.client
            .update_categories_in_batch(categories)
            .await
            .context("Failed to update categories")?;
        Ok(())
    }

    async fn version(&self) -> Result<String> {
        let environment = self
            .client
            .environment()
            .await
            .context("Failed to read Halo environment")?;
        Ok(environment.version)
    }
}
