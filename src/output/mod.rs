//! Output sink for run results.
//!
//! Reports are written as a JSON array (see [`json`]). When no output path
//! is configured, the file name embeds the run date.

pub mod json;

use std::path::PathBuf;

use chrono::NaiveDate;

pub use json::{JsonDocumentReport, JsonOutput, JsonOutputError};

/// Default output file name for a run on `date`: `reports_YYYY-MM-DD.json`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use iocharvest::output::default_output_path;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(default_output_path(date).to_str(), Some("reports_2024-03-09.json"));
/// ```
#[must_use]
pub fn default_output_path(date: NaiveDate) -> PathBuf {
    PathBuf::from(format!("reports_{}.json", date.format("%Y-%m-%d")))
}
