//! Error types for birdrank
//!
//! Only [`BirdrankError::Config`] is fatal. Fetch and parse failures are recovered by the
//! caller at the smallest meaningful granularity (one query variant, one species field).

use thiserror::Error;

/// Result type alias for birdrank operations
pub type Result<T> = std::result::Result<T, BirdrankError>;

/// Main error type for birdrank
#[derive(Error, Debug)]
pub enum BirdrankError {
    /// Required credential or setting is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// Remote service answered, but not with a usable response
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// HTTP request failed (connect, timeout, body read)
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON body could not be decoded
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BirdrankError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error for a non-success status or empty body
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Whether this error must abort the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_is_fatal() {
        assert!(BirdrankError::config("EBIRD_SESSION_ID is not set").is_fatal());
        assert!(!BirdrankError::fetch("https://ebird.org/targets", "HTTP 503").is_fatal());
        assert!(!BirdrankError::parse("missing checklist count").is_fatal());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!BirdrankError::from(json_err).is_fatal());
    }

    #[test]
    fn test_fetch_error_message() {
        let err = BirdrankError::fetch("https://api.ebird.org/v2/ref", "HTTP status 404");
        assert_eq!(
            err.to_string(),
            "Fetch failed for https://api.ebird.org/v2/ref: HTTP status 404"
        );
    }
}
