//! Length-keyed hexadecimal token extraction.
//!
//! A token is a *maximal* run of hexadecimal characters: it is never flanked
//! by further hex characters. Only runs of exactly 32, 40 or 64 characters
//! are kept. A 72-character run (say an MD5 glued to a SHA-1) yields nothing.
//!
//! The scanner ignores cross-length overlap; see
//! [`super::disambiguate`].

use std::sync::LazyLock;

use regex::Regex;

use super::{HashKind, RawHashes};

/// Matches one maximal run of hex characters (either case).
static HEX_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9A-Fa-f]+").expect("hex run pattern is valid"));

/// Extract the three raw token sets from `text`.
///
/// Values are uppercased and deduplicated within each set.
///
/// # Example
///
/// ```
/// use iocharvest::indicators::scan_text;
///
/// let text = format!("md5={} sha1={}", "d41d8cd98f00b204e9800998ecf8427e", "b".repeat(40));
/// let raw = scan_text(&text);
///
/// assert!(raw.md5.contains("D41D8CD98F00B204E9800998ECF8427E"));
/// assert_eq!(raw.sha1.len(), 1);
/// assert!(raw.sha256.is_empty());
/// ```
#[must_use]
pub fn scan_text(text: &str) -> RawHashes {
    let mut raw = RawHashes::default();
    for m in HEX_RUN.find_iter(text) {
        if let Some(kind) = HashKind::from_hex_len(m.len()) {
            raw.set_mut(kind).insert(m.as_str().to_ascii_uppercase());
        }
    }
    raw
}
