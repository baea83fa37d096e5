//! arXiv Atom feed parsing.
//!
//! One API page is read with a streaming `quick-xml` reader into
//! [`RawEntry`] values. Turning a raw entry into a [`PaperRecord`] is where
//! required fields are checked and the abstract is cleaned; an entry that
//! fails the check is reported to the caller instead of aborting the page.

use crate::clean::{clean_text, collapse_whitespace};
use crate::error::{Result, ScraperError};
use crate::record::{abs_url, PaperRecord};
use chrono::{DateTime, SecondsFormat};
use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::unescape;
use quick_xml::Reader;
use thiserror::Error;

/// Marker arXiv puts in the `<id>` of an in-band error entry
const ERROR_ID_MARKER: &str = "/api/errors";

/// One parsed API page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    /// `<opensearch:totalResults>`, when the feed carries it
    pub total_results: Option<usize>,
    pub entries: Vec<RawEntry>,
}

/// An `<entry>` as it appeared in the feed. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub id: Option<String>,
    /// `rel="alternate"` link
    pub link: Option<String>,
    pub title: Option<String>,
    /// Abstract markup, entity-decoded
    pub summary: Option<String>,
    pub authors: Vec<String>,
    pub published: Option<String>,
}

/// Why an entry could not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryDefect {
    #[error("entry has neither <id> nor an alternate link")]
    MissingId,
    #[error("entry has no title")]
    MissingTitle,
    #[error("entry has no publication date")]
    MissingPublished,
    #[error("publication date {0:?} is not ISO-8601")]
    InvalidPublished(String),
}

impl RawEntry {
    /// Whether this is arXiv's in-band error report rather than a paper.
    pub fn is_error(&self) -> bool {
        self.id
            .as_deref()
            .is_some_and(|id| id.contains(ERROR_ID_MARKER))
    }

    /// Short label for log lines.
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.link.as_deref())
            .or(self.title.as_deref())
            .unwrap_or("<unnamed entry>")
    }

    /// Validate required fields and clean the abstract.
    pub fn into_record(self) -> std::result::Result<PaperRecord, EntryDefect> {
        let url = self
            .id
            .as_deref()
            .or(self.link.as_deref())
            .filter(|s| !s.trim().is_empty())
            .map(abs_url)
            .ok_or(EntryDefect::MissingId)?;

        let title = self
            .title
            .as_deref()
            .map(collapse_whitespace)
            .filter(|t| !t.is_empty())
            .ok_or(EntryDefect::MissingTitle)?;

        let published = self
            .published
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(EntryDefect::MissingPublished)?;
        let date = DateTime::parse_from_rfc3339(published)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .map_err(|_| EntryDefect::InvalidPublished(published.to_string()))?;

        let abstract_text = self.summary.as_deref().map(clean_text).unwrap_or_default();

        Ok(PaperRecord {
            url,
            title,
            abstract_text,
            authors: self.authors,
            date,
        })
    }
}

/// Parse one Atom payload.
///
/// # Errors
///
/// `Parse` when the payload is not well-formed XML, `Api` when arXiv
/// answered with an error entry.
pub fn parse_feed(xml: &str) -> Result<FeedPage> {
    let mut reader = Reader::from_str(xml);
    let mut page = FeedPage::default();
    let mut entry: Option<RawEntry> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            ScraperError::Parse(format!("XML error at byte {}: {}", reader.error_position(), e))
        })?;

        match event {
            Event::Start(e) => {
                let name = local_name(&e);
                if name == "entry" {
                    entry = Some(RawEntry::default());
                    continue;
                }
                match (name.as_str(), entry.as_mut()) {
                    ("totalResults", None) => {
                        let text = read_element_text(&mut reader, &e)?;
                        page.total_results = text.trim().parse().ok();
                    }
                    ("id", Some(current)) => {
                        current.id = Some(read_element_text(&mut reader, &e)?.trim().to_string());
                    }
                    ("title", Some(current)) => {
                        current.title = Some(read_element_text(&mut reader, &e)?);
                    }
                    ("summary", Some(current)) => {
                        current.summary = Some(read_element_text(&mut reader, &e)?);
                    }
                    ("published", Some(current)) => {
                        current.published = Some(read_element_text(&mut reader, &e)?);
                    }
                    ("name", Some(current)) => {
                        let author = collapse_whitespace(&read_element_text(&mut reader, &e)?);
                        if !author.is_empty() {
                            current.authors.push(author);
                        }
                    }
                    ("link", Some(current)) => take_alternate_link(current, &e),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if let Some(current) = entry.as_mut() {
                    if local_name(&e) == "link" {
                        take_alternate_link(current, &e);
                    }
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"entry" {
                    if let Some(done) = entry.take() {
                        if done.is_error() {
                            return Err(ScraperError::Api {
                                code: 0,
                                message: done
                                    .summary
                                    .as_deref()
                                    .map(collapse_whitespace)
                                    .unwrap_or_else(|| "arXiv reported an error".to_string()),
                            });
                        }
                        page.entries.push(done);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(page)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Read everything up to the matching end tag and decode entities.
///
/// Nested elements are kept as markup so the cleaner can deal with them.
fn read_element_text(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String> {
    let raw = reader
        .read_text(start.name())
        .map_err(|e| ScraperError::Parse(format!("unterminated <{}>: {}", local_name(start), e)))?;
    let text = unescape(&raw)
        .map_err(|e| ScraperError::Parse(format!("bad entity in <{}>: {}", local_name(start), e)))?;
    Ok(text.into_owned())
}

fn take_alternate_link(entry: &mut RawEntry, e: &BytesStart<'_>) {
    let mut href = None;
    let mut rel = None;
    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value),
            b"rel" => rel = Some(value),
            _ => {}
        }
    }
    // Atom treats a link without rel as alternate.
    if entry.link.is_none() && rel.as_deref().unwrap_or("alternate") == "alternate" {
        entry.link = href;
    }
}
