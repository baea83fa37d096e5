//! Error types for arxiv-clean.
//!
//! Every fallible library function returns `Result<T, ScraperError>`.
//! Malformed feed entries are not errors; the parser skips and reports them.

use thiserror::Error;

/// Main error type for scraper operations.
#[derive(Debug, Error)]
pub enum ScraperError {
    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success status, or an error entry reported inside the feed
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code (0 when arXiv reported the error in-band)
        code: u16,
        /// Error message
        message: String,
    },

    /// Feed payload is not well-formed XML
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `ScraperError`
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a config error message
    fn ok_or_config(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_config(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| ScraperError::Config(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ScraperError::Api {
            code: 503,
            message: "arXiv API error: 503 Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error: 503 - arXiv API error: 503 Service Unavailable"
        );
    }

    #[test]
    fn test_ok_or_config() {
        let missing: Option<u8> = None;
        let err = missing.ok_or_config("no host").expect_err("should fail");
        assert!(matches!(err, ScraperError::Config(ref m) if m == "no host"));
        assert_eq!(Some(3).ok_or_config("unused").expect("present"), 3);
    }
}
