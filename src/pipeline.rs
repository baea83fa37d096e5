//! Fetch → parse → clean → write.
//!
//! Pages are requested one at a time with a fixed pause between them. Each
//! cleaned record goes straight to the output file; when a fatal error stops
//! the run, the file is still closed so the records gathered so far survive.

use crate::arxiv::{PageRequest, PageSource};
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::record::PaperRecord;
use crate::writer::{RecordWriter, WrittenFile};
use tracing::{debug, info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub category: String,
    pub requested: usize,
    /// Entries skipped for missing or invalid fields
    pub skipped: usize,
    /// API requests made
    pub pages: usize,
    pub output: WrittenFile,
    /// First record written, for display
    pub sample: Option<PaperRecord>,
}

impl RunSummary {
    /// Records written to the output file
    pub fn written(&self) -> usize {
        self.output.records
    }
}

#[derive(Debug, Default)]
struct PageStats {
    pages: usize,
    skipped: usize,
    sample: Option<PaperRecord>,
}

/// Run the whole pipeline against `source`.
///
/// # Errors
///
/// Validation errors before anything is fetched; network, API, parse and
/// I/O errors abort the run after the output file has been closed.
pub async fn run<S: PageSource>(source: &S, config: &ScraperConfig) -> Result<RunSummary> {
    config.validate()?;
    let category = config.category.trim();

    info!(
        category = category,
        max_results = config.max_results,
        "Starting arXiv scrape"
    );

    let mut writer = RecordWriter::create(&config.output_dir, &config.file_prefix)?;
    let outcome = paginate(source, config, category, &mut writer).await;
    let finished = writer.finish();

    let stats = match outcome {
        Ok(stats) => stats,
        Err(e) => {
            if let Ok(partial) = &finished {
                warn!(
                    path = %partial.path.display(),
                    records = partial.records,
                    "Run aborted, partial results kept"
                );
            }
            return Err(e);
        }
    };
    let output = finished?;

    info!(
        written = output.records,
        skipped = stats.skipped,
        pages = stats.pages,
        path = %output.path.display(),
        "arXiv scrape complete"
    );

    Ok(RunSummary {
        category: category.to_string(),
        requested: config.max_results,
        skipped: stats.skipped,
        pages: stats.pages,
        output,
        sample: stats.sample,
    })
}

async fn paginate<S: PageSource>(
    source: &S,
    config: &ScraperConfig,
    category: &str,
    writer: &mut RecordWriter,
) -> Result<PageStats> {
    let target = config.max_results;
    let mut stats = PageStats::default();
    let mut start = 0;
    let mut total_results: Option<usize> = None;

    while writer.records() < target {
        if total_results.is_some_and(|total| start >= total) {
            debug!(start = start, "Reached end of listing");
            break;
        }

        if stats.pages > 0 {
            info!(
                fetched = writer.records(),
                delay_secs = config.page_delay.as_secs_f64(),
                "Waiting before next page"
            );
            tokio::time::sleep(config.page_delay).await;
        }

        let request = PageRequest {
            category: category.to_string(),
            start,
            max_results: (target - writer.records()).min(config.page_size),
        };
        info!(
            category = category,
            start = request.start,
            max_results = request.max_results,
            "Fetching page"
        );

        let page = source.fetch_page(&request).await?;
        stats.pages += 1;
        total_results = page.total_results.or(total_results);
        let received = page.entries.len();

        for entry in page.entries {
            if writer.records() >= target {
                break;
            }
            let label = entry.label().to_string();
            match entry.into_record() {
                Ok(record) => {
                    writer.write(&record)?;
                    if stats.sample.is_none() {
                        stats.sample = Some(record);
                    }
                }
                Err(defect) => {
                    warn!(entry = %label, reason = %defect, "Skipping malformed entry");
                    stats.skipped += 1;
                }
            }
        }

        info!(page = stats.pages, received = received, "Parsed page");
        start += received;

        if received < request.max_results {
            debug!(received = received, asked = request.max_results, "Source exhausted");
            break;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScraperError;
    use crate::parser::{FeedPage, RawEntry};
    use std::cell::RefCell;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::Instant;

    /// Serves `available` well-formed entries, optionally failing a page.
    struct FakeSource {
        available: usize,
        fail_on_page: Option<usize>,
        malformed: Vec<usize>,
        calls: RefCell<Vec<(PageRequest, Instant)>>,
    }

    impl FakeSource {
        fn new(available: usize) -> Self {
            Self {
                available,
                fail_on_page: None,
                malformed: Vec::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn entry(n: usize) -> RawEntry {
            RawEntry {
                id: Some(format!("http://arxiv.org/abs/2301.{:05}v1", n)),
                link: None,
                title: Some(format!("Paper {}", n)),
                summary: Some(format!("<p>Abstract <b>{}</b></p>", n)),
                authors: vec!["Ada Lovelace".to_string()],
                published: Some("2023-01-15T00:00:00Z".to_string()),
            }
        }
    }

    impl PageSource for FakeSource {
        async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage> {
            let page_no = {
                let mut calls = self.calls.borrow_mut();
                calls.push((request.clone(), Instant::now()));
                calls.len()
            };
            if self.fail_on_page == Some(page_no) {
                return Err(ScraperError::Api {
                    code: 503,
                    message: "unavailable".to_string(),
                });
            }
            let end = (request.start + request.max_results).min(self.available);
            let entries = (request.start..end)
                .map(|n| {
                    if self.malformed.contains(&n) {
                        RawEntry {
                            title: None,
                            ..Self::entry(n)
                        }
                    } else {
                        Self::entry(n)
                    }
                })
                .collect();
            Ok(FeedPage {
                total_results: Some(self.available),
                entries,
            })
        }
    }

    fn config(dir: &TempDir, max_results: usize) -> ScraperConfig {
        ScraperConfig {
            output_dir: dir.path().to_path_buf(),
            ..ScraperConfig::for_category("cs.CL").with_max_results(max_results)
        }
    }

    fn read_records(summary: &RunSummary) -> Vec<PaperRecord> {
        let content = std::fs::read_to_string(&summary.output.path).expect("output file");
        serde_json::from_str(&content).expect("valid JSON array")
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_page_has_no_delay() -> Result<()> {
        let dir = TempDir::new()?;
        let source = FakeSource::new(1000);

        let summary = run(&source, &config(&dir, 50)).await?;

        assert_eq!(summary.written(), 50);
        assert_eq!(summary.pages, 1);
        let records = read_records(&summary);
        assert_eq!(records.len(), 50);
        assert!(records.iter().all(|r| !r.url.is_empty() && !r.title.is_empty()));
        assert_eq!(records[0].abstract_text, "Abstract 0");
        assert_eq!(summary.sample.as_ref(), records.first());
        assert_eq!(source.calls.borrow()[0].0.max_results, 50);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_page_waits_between_requests() -> Result<()> {
        let dir = TempDir::new()?;
        let source = FakeSource::new(1000);

        let summary = run(&source, &config(&dir, 450)).await?;

        assert_eq!(summary.written(), 450);
        let calls = source.calls.borrow();
        let requests: Vec<(usize, usize)> = calls
            .iter()
            .map(|(r, _)| (r.start, r.max_results))
            .collect();
        assert_eq!(requests, vec![(0, 200), (200, 200), (400, 50)]);
        for pair in calls.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= Duration::from_secs(3));
        }
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_source_exhausted() -> Result<()> {
        let dir = TempDir::new()?;
        let source = FakeSource::new(230);

        let summary = run(&source, &config(&dir, 1000)).await?;

        assert_eq!(summary.written(), 230);
        assert_eq!(summary.pages, 2);
        assert_eq!(read_records(&summary).len(), 230);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_category_writes_empty_array() -> Result<()> {
        let dir = TempDir::new()?;
        let source = FakeSource::new(0);

        let summary = run(&source, &config(&dir, 200)).await?;

        assert_eq!(summary.written(), 0);
        assert_eq!(std::fs::read_to_string(&summary.output.path)?, "[]");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_entries_are_skipped_and_replaced() -> Result<()> {
        let dir = TempDir::new()?;
        let mut source = FakeSource::new(100);
        source.malformed = vec![3, 7];

        let summary = run(&source, &config(&dir, 20)).await?;

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.written(), 20);
        let records = read_records(&summary);
        assert!(records.iter().all(|r| r.title != "Paper 3" && r.title != "Paper 7"));
        // The follow-up request starts after the skipped entries, not before.
        let calls = source.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!((calls[1].0.start, calls[1].0.max_results), (20, 2));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_earlier_pages() -> Result<()> {
        let dir = TempDir::new()?;
        let mut source = FakeSource::new(1000);
        source.fail_on_page = Some(2);

        let err = run(&source, &config(&dir, 400))
            .await
            .expect_err("second page fails");
        assert!(matches!(err, ScraperError::Api { code: 503, .. }));

        let file = std::fs::read_dir(dir.path())?
            .next()
            .expect("one output file")?
            .path();
        let content = std::fs::read_to_string(file)?;
        let records: Vec<PaperRecord> = serde_json::from_str(&content)?;
        assert_eq!(records.len(), 200);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_config_fetches_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let source = FakeSource::new(10);

        let err = run(&source, &config(&dir, 0)).await.expect_err("invalid");

        assert!(matches!(err, ScraperError::Validation(_)));
        assert!(source.calls.borrow().is_empty());
    }
}
