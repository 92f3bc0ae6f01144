//! Per-document indicator reports.
//!
//! A [`DocumentReport`] is built once from a document's relative path and its
//! raw hash tokens, and is immutable afterwards. The SHA-1 and MD5 lists it
//! holds are already disambiguated; see [`crate::indicators::disambiguate`].

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::indicators::{disambiguate, HashSet, RawHashes};

/// Earliest year considered a plausible origin for a report.
pub const EARLIEST_YEAR: i32 = 2006;

/// Inclusive range of years that may be inferred from a report path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearRange {
    /// First plausible year
    pub min: i32,
    /// Last plausible year
    pub max: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: EARLIEST_YEAR,
            max: chrono::Local::now().year(),
        }
    }
}

impl YearRange {
    /// Create a range; `min` and `max` are both inclusive.
    #[must_use]
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Whether the range contains at least one year.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Find the first year of the range that appears in `path` as a literal
    /// 4-digit fragment.
    ///
    /// Years are tried in ascending order, so the lowest matching year wins
    /// regardless of where it sits in the path.
    ///
    /// # Example
    ///
    /// ```
    /// use iocharvest::report::YearRange;
    ///
    /// let range = YearRange::new(2006, 2024);
    /// assert_eq!(range.find_in("2013/APT1/report.pdf"), Some(2013));
    /// assert_eq!(range.find_in("misc/report.pdf"), None);
    /// ```
    #[must_use]
    pub fn find_in(&self, path: &str) -> Option<i32> {
        // Only 4-digit years can be matched as a 4-digit fragment
        (self.min.max(1000)..=self.max.min(9999)).find(|year| path.contains(&year.to_string()))
    }
}

/// Indicators found in one successfully processed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    path: String,
    year: Option<i32>,
    sha256_hashes: HashSet,
    sha1_hashes: HashSet,
    md5_hashes: HashSet,
}

impl DocumentReport {
    /// Build a report, disambiguating `raw` and inferring the year from
    /// `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Document path relative to the corpus root
    /// * `years` - Range of years to look for in `path`
    /// * `raw` - Tokens extracted from the document text
    #[must_use]
    pub fn new(path: impl Into<String>, years: &YearRange, raw: RawHashes) -> Self {
        let path = path.into();
        let year = years.find_in(&path);
        let valid = disambiguate(&raw);

        Self {
            path,
            year,
            sha256_hashes: raw.sha256,
            sha1_hashes: valid.sha1,
            md5_hashes: valid.md5,
        }
    }

    /// Path relative to the corpus root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Year inferred from the path, if any.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// All SHA-256 tokens of the document.
    #[must_use]
    pub fn sha256_hashes(&self) -> &HashSet {
        &self.sha256_hashes
    }

    /// SHA-1 tokens that survived disambiguation.
    #[must_use]
    pub fn sha1_hashes(&self) -> &HashSet {
        &self.sha1_hashes
    }

    /// MD5 tokens that survived disambiguation.
    #[must_use]
    pub fn md5_hashes(&self) -> &HashSet {
        &self.md5_hashes
    }

    /// Number of distinct indicators in the report.
    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.sha256_hashes.len() + self.sha1_hashes.len() + self.md5_hashes.len()
    }
}

impl std::fmt::Display for DocumentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (sha256={}, sha1={}, md5={})",
            self.path,
            self.sha256_hashes.len(),
            self.sha1_hashes.len(),
            self.md5_hashes.len()
        )
    }
}
