//! Resolution of overlapping hash tokens within one document.
//!
//! # Rules
//!
//! 1. A SHA-1 token is dropped when any SHA-256 token of the same document
//!    starts with it.
//! 2. An MD5 token is dropped when it is a prefix of any SHA-1 token kept by
//!    rule 1, or occurs anywhere inside any SHA-256 token.
//! 3. SHA-256 tokens are never filtered.
//!
//! Only a shorter token is ever dropped in favor of a longer one, and only on
//! a strict prefix or containment relation. Partial overlaps do not count.
//!
//! The longer token is always trusted, even though it could in principle be
//! the coincidental superset. Each token is compared against every longer
//! token of the document.

use super::{HashSet, RawHashes};

/// The disambiguated SHA-1 and MD5 subsets of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidHashes {
    /// SHA-1 tokens that are not the head of a SHA-256 token
    pub sha1: HashSet,
    /// MD5 tokens not explained by a valid SHA-1 or any SHA-256 token
    pub md5: HashSet,
}

/// Compute the valid SHA-1 and MD5 subsets of `raw`.
///
/// The result is a pure function of its input: running it again on the same
/// sets yields the same subsets.
///
/// # Example
///
/// ```
/// use iocharvest::indicators::{disambiguate, RawHashes};
///
/// let sha256 = "0123456789ABCDEF".repeat(4);
/// let mut raw = RawHashes::default();
/// raw.sha256.insert(sha256.clone());
/// raw.md5.insert(sha256[16..48].to_string()); // buried in the middle
/// raw.md5.insert("F".repeat(32));             // independent
///
/// let valid = disambiguate(&raw);
/// assert_eq!(valid.md5.len(), 1);
/// assert!(valid.md5.contains(&"F".repeat(32)));
/// ```
#[must_use]
pub fn disambiguate(raw: &RawHashes) -> ValidHashes {
    let sha1: HashSet = raw
        .sha1
        .iter()
        .filter(|s1| !is_sha1_fragment(s1, &raw.sha256))
        .cloned()
        .collect();

    let md5: HashSet = raw
        .md5
        .iter()
        .filter(|m| !is_md5_fragment(m, &sha1, &raw.sha256))
        .cloned()
        .collect();

    ValidHashes { sha1, md5 }
}

/// Whether `sha1` is the leading substring of some SHA-256 token.
fn is_sha1_fragment(sha1: &str, sha256: &HashSet) -> bool {
    sha256.iter().any(|long| long.starts_with(sha1))
}

/// Whether `md5` prefixes a valid SHA-1 token or sits inside a SHA-256 token.
fn is_md5_fragment(md5: &str, valid_sha1: &HashSet, sha256: &HashSet) -> bool {
    valid_sha1.iter().any(|s1| s1.starts_with(md5)) || sha256.iter().any(|long| long.contains(md5))
}
