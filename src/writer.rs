//! Streaming JSON output.
//!
//! The output file is opened before the first page is fetched and every
//! record is appended as soon as it is cleaned. `finish` closes the array;
//! dropping an unfinished writer closes it too, so a run that stops early
//! still leaves a valid JSON document behind.

use crate::error::Result;
use crate::record::PaperRecord;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default output file prefix
pub const DEFAULT_PREFIX: &str = "arxiv_clean";

/// Timestamp layout embedded in the file name
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Large enough that one record is copied into the buffer whole
const OUTPUT_BUFFER_SIZE: usize = 64 * 1024;

/// What `finish` reports about the written file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub records: usize,
    pub bytes: u64,
}

/// Writes records into `<prefix>_<YYYYMMDD_HHMMSS>.json` as a JSON array
#[derive(Debug)]
pub struct RecordWriter {
    path: PathBuf,
    out: BufWriter<File>,
    records: usize,
    closed: bool,
}

/// File name for a run started at `at`
pub fn output_file_name(prefix: &str, at: &DateTime<Local>) -> String {
    format!("{}_{}.json", prefix, at.format(TIMESTAMP_FORMAT))
}

impl RecordWriter {
    /// Create the output file in `dir`, stamped with the current local time
    pub fn create(dir: &Path, prefix: &str) -> Result<Self> {
        Self::create_at(dir, prefix, &Local::now())
    }

    /// Create the output file in `dir`, stamped with `at`
    pub fn create_at(dir: &Path, prefix: &str, at: &DateTime<Local>) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(output_file_name(prefix, at));
        let mut out = BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, File::create(&path)?);
        out.write_all(b"[")?;
        debug!(path = %path.display(), "Opened output file");

        Ok(Self {
            path,
            out,
            records: 0,
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended so far
    pub fn records(&self) -> usize {
        self.records
    }

    /// Append one record
    pub fn write(&mut self, record: &PaperRecord) -> Result<()> {
        append_entry(&mut self.out, record, self.records == 0)?;
        self.records += 1;
        Ok(())
    }

    /// Close the array and flush the file
    pub fn finish(mut self) -> Result<WrittenFile> {
        self.close()?;
        let bytes = std::fs::metadata(&self.path)?.len();

        Ok(WrittenFile {
            path: self.path.clone(),
            records: self.records,
            bytes,
        })
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let closing: &[u8] = if self.records == 0 { b"]" } else { b"\n]" };
        self.out.write_all(closing)?;
        self.out.flush()?;
        Ok(())
    }
}

/// One array element: separator plus the record indented by two spaces.
fn encode_entry(record: &PaperRecord, first: bool) -> Result<Vec<u8>> {
    let json = serde_json::to_string_pretty(record)?;
    let separator: &[u8] = if first { b"\n" } else { b",\n" };

    let mut entry = Vec::with_capacity(json.len() + json.len() / 8 + separator.len());
    entry.extend_from_slice(separator);
    for (i, line) in json.lines().enumerate() {
        if i > 0 {
            entry.push(b'\n');
        }
        entry.extend_from_slice(b"  ");
        entry.extend_from_slice(line.as_bytes());
    }
    Ok(entry)
}

/// Encode fully, then hand the element to `out` in one call.
fn append_entry<W: Write>(out: &mut W, record: &PaperRecord, first: bool) -> Result<()> {
    let entry = encode_entry(record, first)?;
    out.write_all(&entry)?;
    Ok(())
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "Failed to close output file");
        }
    }
}
