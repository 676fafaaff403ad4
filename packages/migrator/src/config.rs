use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretBox};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::migration::FilenameMatching;

/// Connection settings for the Halo admin API.
pub struct HaloConfig {
    pub base_url: String,
    admin_token: SecretBox<str>,
}

impl HaloConfig {
    pub fn new(base_url: impl Into<String>, admin_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            admin_token: SecretBox::new(Box::from(admin_token.into().as_str())),
        }
    }

    /// Only call this when building the HTTP client.
    pub fn admin_token(&self) -> &str {
        self.admin_token.expose_secret()
    }
}

impl fmt::Debug for HaloConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HaloConfig")
            .field("base_url", &self.base_url)
            .field("admin_token", &"[REDACTED]")
            .finish()
    }
}

/// Run configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub halo: HaloConfig,
    /// WordPress export (WXR) the category taxonomy is read from
    pub input: PathBuf,
    /// Directory the exporter wrote markdown posts and images into
    pub output: PathBuf,
    /// Whether each post lives in its own folder (`<slug>/index.md`)
    pub post_folders: bool,
    pub filename_matching: FilenameMatching,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();

        let base_url = env::var("HALO_BASE_URL").context("HALO_BASE_URL must be set")?;
        let admin_token = env::var("ADMIN_TOKEN").context("ADMIN_TOKEN must be set")?;

        Ok(Self {
            halo: HaloConfig::new(base_url, admin_token),
            input: env::var("WP2HALO_INPUT")
                .unwrap_or_else(|_| "export.xml".to_string())
                .into(),
            output: env::var("WP2HALO_OUTPUT")
                .unwrap_or_else(|_| "output".to_string())
                .into(),
            post_folders: env::var("WP2HALO_POST_FOLDERS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("WP2HALO_POST_FOLDERS must be true or false")?,
            filename_matching: env::var("WP2HALO_FILENAME_MATCHING")
                .unwrap_or_else(|_| "escaped".to_string())
                .parse()
                .context("WP2HALO_FILENAME_MATCHING must be escaped or literal")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_token_not_in_debug() {
        let config = HaloConfig::new("https://blog.example.com", "super-secret-token");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("blog.example.com"));
        assert_eq!(config.admin_token(), "super-secret-token");
    }
}
