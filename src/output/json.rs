//! JSON output for document reports.
//!
//! The output file is a single JSON array, one object per successfully
//! processed document, sorted by path. Each object is produced by an
//! explicit field mapping ([`JsonDocumentReport`]), so the schema below is a
//! stable contract tracked by [`SCHEMA_VERSION`].
//!
//! # Output Schema
//!
//! ```json
//! [
//!   {
//!     "path": "2013/APT1/report.pdf",
//!     "year": 2013,
//!     "sha256_hashes": ["E3B0C442..."],
//!     "sha1_hashes": ["2FD4E1C6..."],
//!     "md5_hashes": ["9E107D9D..."]
//!   }
//! ]
//! ```
//!
//! `year` is `null` when no year was found in the path.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::report::DocumentReport;

/// Version of the record layout written by [`JsonOutput`].
pub const SCHEMA_VERSION: u32 = 1;

/// One document report in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonDocumentReport {
    /// Path relative to the corpus root
    pub path: String,
    /// Year inferred from the path
    pub year: Option<i32>,
    /// SHA-256 tokens, uppercase, ascending
    pub sha256_hashes: Vec<String>,
    /// Disambiguated SHA-1 tokens, uppercase, ascending
    pub sha1_hashes: Vec<String>,
    /// Disambiguated MD5 tokens, uppercase, ascending
    pub md5_hashes: Vec<String>,
}

impl From<&DocumentReport> for JsonDocumentReport {
    fn from(report: &DocumentReport) -> Self {
        Self {
            path: report.path().to_string(),
            year: report.year(),
            sha256_hashes: report.sha256_hashes().iter().cloned().collect(),
            sha1_hashes: report.sha1_hashes().iter().cloned().collect(),
            md5_hashes: report.md5_hashes().iter().cloned().collect(),
        }
    }
}

/// Complete JSON output: the report array.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct JsonOutput {
    /// Reports, sorted by path
    pub reports: Vec<JsonDocumentReport>,
}

impl JsonOutput {
    /// Create the output from a set of reports, in path order.
    ///
    /// # Example
    ///
    /// ```
    /// use iocharvest::indicators::scan_text;
    /// use iocharvest::output::json::JsonOutput;
    /// use iocharvest::report::{DocumentReport, YearRange};
    ///
    /// let years = YearRange::new(2006, 2024);
    /// let reports = vec![
    ///     DocumentReport::new("b/2014.txt", &years, scan_text("")),
    ///     DocumentReport::new("a/2010.txt", &years, scan_text("")),
    /// ];
    ///
    /// let output = JsonOutput::new(&reports);
    /// assert_eq!(output.reports[0].path, "a/2010.txt");
    /// assert_eq!(output.reports[1].year, Some(2014));
    /// ```
    #[must_use]
    pub fn new(reports: &[DocumentReport]) -> Self {
        let mut reports: Vec<JsonDocumentReport> =
            reports.iter().map(JsonDocumentReport::from).collect();
        reports.sort_by(|a, b| a.path.cmp(&b.path));
        Self { reports }
    }

    /// Write pretty-printed JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Write pretty-printed JSON to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`JsonOutputError::File`] if the file cannot be created, or
    /// any error from [`JsonOutput::write_to`].
    pub fn write_file(&self, path: &Path) -> Result<(), JsonOutputError> {
        let file = File::create(path).map_err(|source| JsonOutputError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        log::debug!(
            "Wrote {} report(s) to {} (schema v{})",
            self.reports.len(),
            path.display(),
            SCHEMA_VERSION
        );
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),

    /// The output file could not be created.
    #[error("Failed to create output file {path}: {source}")]
    File {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
