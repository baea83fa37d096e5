//! Run configuration.

use crate::arxiv::{DEFAULT_API_URL, MAX_PAGE_SIZE};
use crate::error::{Result, ScraperError};
use crate::writer::DEFAULT_PREFIX;
use std::path::PathBuf;
use std::time::Duration;

/// Papers fetched when the user does not ask for a number
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Pause between consecutive API requests
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(3);

/// Settings for one scraper run
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// arXiv category, e.g. `cs.CL`
    pub category: String,
    /// Total number of papers wanted
    pub max_results: usize,
    /// Entries requested per API call, capped at `MAX_PAGE_SIZE`
    pub page_size: usize,
    pub page_delay: Duration,
    pub api_url: String,
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            category: "cs.CL".to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            page_size: MAX_PAGE_SIZE,
            page_delay: DEFAULT_PAGE_DELAY,
            api_url: DEFAULT_API_URL.to_string(),
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl ScraperConfig {
    /// Default settings for `category`
    pub fn for_category(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Check the settings before any request is made
    pub fn validate(&self) -> Result<()> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ScraperError::Validation("category must not be empty".to_string()));
        }
        if category.chars().any(char::is_whitespace) {
            return Err(ScraperError::Validation(format!(
                "category '{}' must not contain whitespace",
                category
            )));
        }
        if self.max_results == 0 {
            return Err(ScraperError::Validation(
                "number of papers must be greater than 0".to_string(),
            ));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ScraperError::Validation(format!(
                "page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.file_prefix.is_empty() || self.file_prefix.contains(&['/', '\\'][..]) {
            return Err(ScraperError::Validation(format!(
                "invalid file prefix '{}'",
                self.file_prefix
            )));
        }
        Ok(())
    }
}
