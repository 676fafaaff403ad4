//! Pure Halo 1.x admin REST API client.
//!
//! A minimal client for the endpoints a content migration needs: post
//! listing, attachment upload, markdown import, post update and category
//! maintenance.
//!
//! # Example
//!
//! ```rust,ignore
//! use halo_client::HaloClient;
//!
//! let client = HaloClient::new("https://blog.example.com", "admin-token")?;
//!
//! let posts = client.list_posts(1000).await?;
//! for post in &posts {
//!     println!("{}", post.title);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{HaloError, Result};
pub use types::{Attachment, Environment, Page, PostSummary, RemoteCategory, RemotePost};

use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;
use types::{ApiResponse, ErrorBody};

/// Header carrying the administrative token.
const AUTH_HEADER: &str = "Admin-Authorization";

#[derive(Clone)]
pub struct HaloClient {
    http_client: reqwest::Client,
    base_url: String,
    admin_token: String,
}

impl HaloClient {
    /// Create a client for the Halo instance at `base_url`.
    pub fn new(base_url: impl Into<String>, admin_token: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let admin_token = admin_token.into();

        url::Url::parse(&base_url)
            .map_err(|e| HaloError::Config(format!("invalid base URL {}: {}", base_url, e)))?;
        if admin_token.trim().is_empty() {
            return Err(HaloError::Config("admin token is empty".into()));
        }

        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/admin{}", self.base_url, path)
    }

    /// Send a request and unwrap the `{status, message, data}` envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<ApiResponse<T>> {
        let resp = request.header(AUTH_HEADER, &self.admin_token).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HaloError::Api {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let bytes = resp.bytes().await?;
        let api_resp: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        debug!(status = api_resp.status, message = %api_resp.message, "Halo API response");
        Ok(api_resp)
    }

    fn file_part(file_name: &str, bytes: Vec<u8>) -> Result<Part> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.as_ref())
            .map_err(HaloError::Http)
    }

    /// List posts, newest first, in a single page of `size` entries.
    pub async fn list_posts(&self, size: u32) -> Result<Vec<PostSummary>> {
        let request = self
            .http_client
            .get(self.url("/posts"))
            .query(&[("size", size)]);

        let page: ApiResponse<Page<PostSummary>> = self.send(request).await?;
        Ok(page.data.content)
    }

    /// Upload one attachment and return its metadata, including the served path.
    pub async fn upload_attachment(&self, file_name: &str, bytes: Vec<u8>) -> Result<Attachment> {
        let form = Form::new().part("file", Self::file_part(file_name, bytes)?);
        let request = self
            .http_client
            .post(self.url("/attachments/upload"))
            .multipart(form);

        Ok(self.send(request).await?.data)
    }

    /// Import a raw markdown file (frontmatter included) as a new post.
    pub async fn import_markdown(&self, file_name: &str, bytes: Vec<u8>) -> Result<RemotePost> {
        let form = Form::new().part("file", Self::file_part(file_name, bytes)?);
        let request = self
            .http_client
            .post(self.url("/backups/markdown/import"))
            .multipart(form);

        Ok(self.send(request).await?.data)
    }

    /// Overwrite a post with the given payload.
    pub async fn update_post(&self, id: i64, post: &RemotePost) -> Result<RemotePost> {
        let request = self
            .http_client
            .put(self.url(&format!("/posts/{}", id)))
            .json(post);

        Ok(self.send(request).await?.data)
    }

    pub async fn list_categories(&self) -> Result<Vec<RemoteCategory>> {
        let request = self.http_client.get(self.url("/categories"));
        Ok(self.send(request).await?.data)
    }

    /// Update every given category in one call.
    pub async fn update_categories_in_batch(
        &self,
        categories: &[RemoteCategory],
    ) -> Result<Vec<RemoteCategory>> {
        let request = self
            .http_client
            .put(self.url("/categories/batch"))
            .json(categories);

        Ok(self.send(request).await?.data)
    }

    /// Server environment (version, database, mode).
    pub async fn environment(&self) -> Result<Environment> {
        let request = self.http_client.get(self.url("/environments"));
        Ok(self.send(request).await?.data)
    }
}

/// Message of an error response: the envelope's `message`, else the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body)
}
