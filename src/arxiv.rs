//! arXiv API client.
//!
//! API notes:
//! - Query endpoint: GET /api/query, Atom feed response
//! - At most 200 entries per request (`MAX_PAGE_SIZE`)
//! - Callers are asked to wait 3 seconds between consecutive requests

use crate::error::{OptionExt, Result, ScraperError};
use crate::parser::{parse_feed, FeedPage};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// arXiv API query endpoint
pub const DEFAULT_API_URL: &str = "http://export.arxiv.org/api/query";

/// Maximum results per request
pub const MAX_PAGE_SIZE: usize = 200;

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub category: String,
    /// Zero-based offset into the result list
    pub start: usize,
    /// Entries wanted, at most `MAX_PAGE_SIZE`
    pub max_results: usize,
}

/// Anything that can serve pages of a category listing.
///
/// The HTTP client is the production source; tests drive the paginator with
/// in-memory sources.
pub trait PageSource {
    fn fetch_page(&self, request: &PageRequest) -> impl Future<Output = Result<FeedPage>>;
}

/// arXiv API client
#[derive(Debug, Clone)]
pub struct ArxivClient {
    client: Client,
    api_url: Url,
}

impl ArxivClient {
    /// Create a client for the given query endpoint
    pub fn new(api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| ScraperError::Config(format!("Invalid API URL '{}': {}", api_url, e)))?;
        api_url.host_str().ok_or_config("API URL has no host")?;

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScraperError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, api_url })
    }

    /// Build the query URL for one page
    pub fn build_query_url(&self, request: &PageRequest) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("search_query", &format!("cat:{}", request.category))
            .append_pair("start", &request.start.to_string())
            .append_pair("max_results", &request.max_results.min(MAX_PAGE_SIZE).to_string())
            .append_pair("sortBy", "submittedDate")
            .append_pair("sortOrder", "descending");
        url
    }

    async fn fetch_xml(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScraperError::Api {
                code: status.as_u16(),
                message: format!("arXiv API error: {} {}", status, body.trim()),
            });
        }

        response.text().await.map_err(ScraperError::Network)
    }
}

impl PageSource for ArxivClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage> {
        let url = self.build_query_url(request);
        debug!(url = %url, "Fetching arXiv page");
        let xml = self.fetch_xml(&url).await?;
        parse_feed(&xml)
    }
}
