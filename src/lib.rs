//! # arxiv-clean
//!
//! Fetch recent papers for an arXiv category, strip markup from their
//! abstracts and write them to a timestamped JSON file.
//!
//! ## Modules
//!
//! - [`arxiv`] - arXiv API client and the [`arxiv::PageSource`] seam
//! - [`parser`] - Atom feed parsing
//! - [`clean`] - HTML-to-text cleaning of abstracts
//! - [`writer`] - streaming JSON output
//! - [`pipeline`] - pagination and the end-to-end run
//! - [`prompt`] - interactive prompts
//! - [`config`] - run settings
//! - [`error`] - error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use arxiv_clean::{arxiv::ArxivClient, config::ScraperConfig, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScraperConfig::for_category("cs.CL").with_max_results(50);
//!     let client = ArxivClient::new(&config.api_url)?;
//!     let summary = pipeline::run(&client, &config).await?;
//!     println!("Wrote {} papers to {}", summary.written(), summary.output.path.display());
//!     Ok(())
//! }
//! ```

pub mod arxiv;
pub mod clean;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod record;
pub mod writer;

pub use error::{Result, ScraperError};
pub use record::PaperRecord;
