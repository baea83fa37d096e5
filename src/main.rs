//! arxiv-clean - arXiv category scraper
//!
//! Fetches papers for an arXiv category, strips markup from the abstracts
//! and writes them to `arxiv_clean_<YYYYMMDD_HHMMSS>.json`.
//!
//! ## Usage
//!
//! ### Interactive
//! ```bash
//! arxiv-clean
//! ```
//!
//! ### Non-interactive
//! ```bash
//! arxiv-clean cs.CL --count 500 --output-dir ./output
//! ```

use anyhow::{Context, Result};
use arxiv_clean::arxiv::{ArxivClient, DEFAULT_API_URL};
use arxiv_clean::config::{ScraperConfig, DEFAULT_MAX_RESULTS};
use arxiv_clean::pipeline::{self, RunSummary};
use arxiv_clean::prompt::Prompter;
use arxiv_clean::writer::DEFAULT_PREFIX;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Scrape arXiv papers for a category into a cleaned JSON file
#[derive(Parser)]
#[command(name = "arxiv-clean")]
#[command(version, about, long_about = None)]
struct Cli {
    /// arXiv category (e.g., cs.CL). Asked for interactively when omitted
    category: Option<String>,

    /// Number of papers to fetch (default: 200). When given without a
    /// category, only the category is asked for
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Directory for the output file
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Output file name prefix
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// arXiv API query endpoint
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Seconds to wait between API requests
    #[arg(long, default_value_t = 3)]
    delay_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .init();

    let interactive = cli.category.is_none();
    let Some((category, count)) = resolve_request(&cli)? else {
        println!("Exiting...");
        return Ok(());
    };

    let config = ScraperConfig {
        category,
        max_results: count,
        page_delay: Duration::from_secs(cli.delay_secs),
        api_url: cli.api_url,
        output_dir: cli.output_dir,
        file_prefix: cli.prefix,
        ..Default::default()
    };

    print_start_banner(&config);

    let client = ArxivClient::new(&config.api_url).context("Failed to create arXiv client")?;

    let summary = tokio::select! {
        result = pipeline::run(&client, &config) => {
            result.with_context(|| format!("Scrape of '{}' failed", config.category))?
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n\nInterrupted by user. Exiting...");
            return Ok(());
        }
    };

    print_summary(&summary);

    if interactive {
        offer_sample(&summary)?;
    }

    println!("Done!");
    Ok(())
}

/// Category and count from the arguments, or from prompts when no category
/// was given. `None` means the user chose to quit.
fn resolve_request(cli: &Cli) -> Result<Option<(String, usize)>> {
    if let Some(category) = &cli.category {
        let count = cli.count.unwrap_or(DEFAULT_MAX_RESULTS);
        return Ok(Some((category.trim().to_string(), count)));
    }

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let request = prompter.ask_request(cli.count)?;

    if let Some((category, count)) = &request {
        info!(category = %category, count = count, "Request from prompts");
    }
    Ok(request)
}

fn print_start_banner(config: &ScraperConfig) {
    let rule = "=".repeat(80);
    println!("\n{}", rule);
    println!("Starting arXiv scraper");
    println!("{}", rule);
    println!("Category: {}", config.category);
    println!("Max results: {}", config.max_results);
    println!("{}\n", rule);
}

fn print_summary(summary: &RunSummary) {
    let rule = "=".repeat(80);
    let size_mb = summary.output.bytes as f64 / (1024.0 * 1024.0);

    println!("\nTotal papers fetched: {}", summary.written());
    if summary.skipped > 0 {
        println!("Skipped malformed entries: {}", summary.skipped);
    }
    println!("\n{}", rule);
    println!("Results saved to: {}", summary.output.path.display());
    println!("File size: {:.2} MB", size_mb);
    println!("Number of papers: {}", summary.written());
    println!("{}\n", rule);
}

fn offer_sample(summary: &RunSummary) -> Result<()> {
    let Some(sample) = &summary.sample else {
        return Ok(());
    };

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    if prompter.confirm("\nWould you like to see a sample paper?")? {
        let rule = "=".repeat(80);
        let json = serde_json::to_string_pretty(sample).context("Failed to format sample")?;
        prompter.say(&format!("\n{}\nSample Paper:\n{}\n{}\n{}\n", rule, rule, json, rule))?;
    }
    Ok(())
}
