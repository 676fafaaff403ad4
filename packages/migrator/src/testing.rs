//! Testing utilities.
//!
//! [`MockTargetClient`] stands in for the remote platform: it answers from
//! canned data, records every call in order, and can be told to fail
//! specific calls.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Map;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::sources::parse_frontmatter;
use crate::target::{BaseTargetClient, PostSummary, RemoteCategory, RemotePost};

/// Record of a call made to the mock target.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetCall {
    ListPosts { size: u32 },
    UploadAttachment { file: PathBuf },
    ImportMarkdown { file: PathBuf },
    UpdatePost { post: RemotePost },
    ListCategories,
    UpdateCategories { categories: Vec<RemoteCategory> },
    Version,
}

/// A mock remote platform.
#[derive(Clone, Default)]
pub struct MockTargetClient {
    existing_titles: Arc<RwLock<Vec<String>>>,
    categories: Arc<RwLock<Vec<RemoteCategory>>>,
    version: Arc<RwLock<Option<String>>>,

    /// Remote paths by uploaded file name
    upload_paths: Arc<RwLock<HashMap<String, String>>>,
    failing_uploads: Arc<RwLock<HashSet<String>>>,
    /// Titles whose import fails
    failing_imports: Arc<RwLock<HashSet<String>>>,
    fail_post_listing: Arc<RwLock<bool>>,
    fail_category_listing: Arc<RwLock<bool>>,
    fail_updates: Arc<RwLock<bool>>,
    fail_category_batch: Arc<RwLock<bool>>,

    calls: Arc<RwLock<Vec<TargetCall>>>,
}

impl MockTargetClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A post with this title already exists remotely.
    pub fn with_existing_post(self, title: &str) -> Self {
        self.existing_titles.write().unwrap().push(title.to_string());
        self
    }

    pub fn with_categories(self, categories: Vec<RemoteCategory>) -> Self {
        *self.categories.write().unwrap() = categories;
        self
    }

    pub fn with_version(self, version: &str) -> Self {
        *self.version.write().unwrap() = Some(version.to_string());
        self
    }

    /// Remote path returned for `file_name` (default: `/upload/<file_name>`).
    pub fn with_upload_path(self, file_name: &str, remote_path: &str) -> Self {
        self.upload_paths
            .write()
            .unwrap()
            .insert(file_name.to_string(), remote_path.to_string());
        self
    }

    pub fn with_failing_upload(self, file_name: &str) -> Self {
        self.failing_uploads
            .write()
            .unwrap()
            .insert(file_name.to_string());
        self
    }

    /// Importing the post titled `title` fails.
    pub fn with_failing_import(self, title: &str) -> Self {
        self.failing_imports.write().unwrap().insert(title.to_string());
        self
    }

    pub fn with_failing_post_listing(self) -> Self {
        *self.fail_post_listing.write().unwrap() = true;
        self
    }

    pub fn with_failing_category_listing(self) -> Self {
        *self.fail_category_listing.write().unwrap() = true;
        self
    }

    pub fn with_failing_updates(self) -> Self {
        *self.fail_updates.write().unwrap() = true;
        self
    }

    pub fn with_failing_category_batch(self) -> Self {
        *self.fail_category_batch.write().unwrap() = true;
        self
    }

    /// All calls, in the order they were made.
    pub fn calls(&self) -> Vec<TargetCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn upload_calls(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TargetCall::UploadAttachment { file } => Some(file),
                _ => None,
            })
            .collect()
    }

    pub fn import_calls(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TargetCall::ImportMarkdown { file } => Some(file),
                _ => None,
            })
            .collect()
    }

    /// Payloads sent to update, in order.
    pub fn updated_posts(&self) -> Vec<RemotePost> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TargetCall::UpdatePost { post } => Some(post),
                _ => None,
            })
            .collect()
    }

    /// Category lists submitted in batch, in order.
    pub fn category_batches(&self) -> Vec<Vec<RemoteCategory>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TargetCall::UpdateCategories { categories } => Some(categories),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TargetCall) {
        self.calls.write().unwrap().push(call);
    }

    fn file_name(file: &Path) -> String {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BaseTargetClient for MockTargetClient {
    async fn list_posts(&self, size: u32) -> Result<Vec<PostSummary>> {
        self.record(TargetCall::ListPosts { size });

        if *self.fail_post_listing.read().unwrap() {
            return Err(anyhow!("mock post listing failure"));
        }

        Ok(self
            .existing_titles
            .read()
            .unwrap()
            .iter()
            .take(size as usize)
            .map(|title| PostSummary {
                title: title.clone(),
                extra: Map::new(),
            })
            .collect())
    }

    async fn upload_attachment(&self, file: &Path) -> Result<String> {
        self.record(TargetCall::UploadAttachment {
            file: file.to_path_buf(),
        });

        let file_name = Self::file_name(file);
        if self.failing_uploads.read().unwrap().contains(&file_name) {
            return Err(anyhow!("mock upload failure for {}", file_name));
        }

        Ok(self
            .upload_paths
            .read()
            .unwrap()
            .get(&file_name)
            .cloned()
            .unwrap_or_else(|| format!("/upload/{}", file_name)))
    }

    async fn import_markdown(&self, file: &Path) -> Result<RemotePost> {
        self.record(TargetCall::ImportMarkdown {
            file: file.to_path_buf(),
        });

        let raw = tokio::fs::read_to_string(file).await?;
        let (fields, body) = parse_frontmatter(&raw);
        let title = fields
            .get("title")
            .cloned()
            .unwrap_or_else(|| Self::file_name(file));

        if self.failing_imports.read().unwrap().contains(&title) {
            return Err(anyhow!("mock import failure for {}", title));
        }

        let id = self.import_calls().len() as i64;
        let mut extra = Map::new();
        extra.insert("status".into(), "PUBLISHED".into());

        Ok(RemotePost {
            id,
            title,
            content: Some(body.to_string()),
            thumbnail: None,
            extra,
        })
    }

    async fn update_post(&self, post: &RemotePost) -> Result<()> {
        self.record(TargetCall::UpdatePost { post: post.clone() });

        if *self.fail_updates.read().unwrap() {
            return Err(anyhow!("mock update failure for post {}", post.id));
        }
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<RemoteCategory>> {
        self.record(TargetCall::ListCategories);

        if *self.fail_category_listing.read().unwrap() {
            return Err(anyhow!("mock category listing failure"));
        }
        Ok(self.categories.read().unwrap().clone())
    }

    async fn update_categories(&self, categories: &[RemoteCategory]) -> Result<()> {
        self.record(TargetCall::UpdateCategories {
            categories: categories.to_vec(),
        });

        if *self.fail_category_batch.read().unwrap() {
            return Err(anyhow!("mock category batch failure"));
        }
        Ok(())
    }

    async fn version(&self) -> Result<String> {
        self.record(TargetCall::Version);
        Ok(self
            .version
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| "1.5.4".to_string()))
    }
}
