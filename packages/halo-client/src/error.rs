//! Error types for the Halo admin client.

use thiserror::Error;

/// Result type for Halo client operations.
pub type Result<T> = std::result::Result<T, HaloError>;

/// Halo client errors.
#[derive(Debug, Error)]
pub enum HaloError {
    /// Configuration error (missing token, malformed base URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure (connection refused, TLS, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the admin API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
