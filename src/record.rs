//! Paper records as written to the output file.

use serde::{Deserialize, Serialize};

/// Canonical arXiv abstract page prefix
pub const ABS_URL_PREFIX: &str = "https://arxiv.org/abs/";

/// One cleaned paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Canonical abstract page URL
    pub url: String,
    pub title: String,
    /// Abstract with markup removed
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: Vec<String>,
    /// Publication timestamp as reported by arXiv (ISO-8601)
    pub date: String,
}

/// Build the abstract page URL from an Atom `<id>` value.
///
/// `http://arxiv.org/abs/2301.12345v1` becomes
/// `https://arxiv.org/abs/2301.12345v1`. Legacy identifiers keep their
/// archive (`hep-th/9901001v1`).
pub fn abs_url(entry_id: &str) -> String {
    let entry_id = entry_id.trim().trim_end_matches('/');
    let id = match entry_id.split_once("/abs/") {
        Some((_, id)) => id,
        None => entry_id.rsplit('/').next().unwrap_or_default(),
    };
    format!("{}{}", ABS_URL_PREFIX, id)
}
