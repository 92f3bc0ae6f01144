//! Hash indicator extraction and disambiguation.
//!
//! This module provides the two text-level stages of the pipeline:
//! - [`scan`]: length-keyed extraction of hexadecimal tokens
//! - [`disambiguate`]: removal of short tokens that are only fragments
//!   of longer tokens found in the same document
//!
//! # Example
//!
//! ```
//! use iocharvest::indicators::{disambiguate, scan_text};
//!
//! let sha256 = "A".repeat(64);
//! let text = format!("SHA256: {sha256}\nSHA1: {}", &sha256[..40]);
//!
//! let raw = scan_text(&text);
//! assert_eq!(raw.sha256.len(), 1);
//! assert_eq!(raw.sha1.len(), 1);
//!
//! // The SHA-1 token is just the head of the SHA-256 token
//! let valid = disambiguate(&raw);
//! assert!(valid.sha1.is_empty());
//! ```

pub mod disambiguate;
pub mod scan;

use std::collections::BTreeSet;

pub use disambiguate::{disambiguate, ValidHashes};
pub use scan::scan_text;

/// A set of uppercase hexadecimal tokens of one fixed length.
///
/// `BTreeSet` keeps serialized output sorted and runs reproducible.
pub type HashSet = BTreeSet<String>;

/// The hash algorithms recognized by their hexadecimal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKind {
    /// 128-bit digest, 32 hex characters
    Md5,
    /// 160-bit digest, 40 hex characters
    Sha1,
    /// 256-bit digest, 64 hex characters
    Sha256,
}

impl HashKind {
    /// Number of hexadecimal characters in a token of this kind.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
        }
    }

    /// Map a hex-run length back to a kind.
    #[must_use]
    pub fn from_hex_len(len: usize) -> Option<Self> {
        [Self::Md5, Self::Sha1, Self::Sha256]
            .into_iter()
            .find(|kind| kind.hex_len() == len)
    }
}

/// Raw tokens found in one document, keyed by length.
///
/// Overlap between the three sets is expected here: a short token may be a
/// literal fragment of a long one. Use [`disambiguate`] to resolve it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHashes {
    /// 64-character tokens
    pub sha256: HashSet,
    /// 40-character tokens
    pub sha1: HashSet,
    /// 32-character tokens
    pub md5: HashSet,
}

impl RawHashes {
    /// Mutable access to the set for `kind`.
    pub fn set_mut(&mut self, kind: HashKind) -> &mut HashSet {
        match kind {
            HashKind::Md5 => &mut self.md5,
            HashKind::Sha1 => &mut self.sha1,
            HashKind::Sha256 => &mut self.sha256,
        }
    }

    /// Total number of tokens across all three sets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sha256.len() + self.sha1.len() + self.md5.len()
    }

    /// Whether no token of any length was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
