//! Corpus-relative report paths.
//!
//! Reports identify documents by their path relative to the corpus root.
//! That string is also what year inference searches, so it is rendered the
//! same way on every platform:
//!
//! - the corpus-root prefix is stripped, with no leading separator
//! - components are joined with `/`
//! - the text is Unicode NFC, so a macOS NFD name (`cafe\u{0301}`) and its
//!   composed form (`café`) produce the same report path
//!
//! # Example
//!
//! ```
//! use iocharvest::scanner::path_utils::report_path;
//! use std::path::Path;
//!
//! let root = Path::new("/corpus");
//! let doc = Path::new("/corpus/2013/cafe\u{0301}/report.pdf");
//! assert_eq!(report_path(root, doc), "2013/café/report.pdf");
//! ```

use std::borrow::Cow;
use std::path::{Component, Path};
use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Normalize to NFC, borrowing when the input is already NFC.
#[must_use]
pub fn normalize_path_str_cow(s: &str) -> Cow<'_, str> {
    if unicode_normalization::is_nfc(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(normalize_path_str(s))
    }
}

/// Render `path` relative to `root` for use in a report.
///
/// If `path` is not under `root`, the full path is rendered instead (still
/// `/`-joined and NFC). Non-UTF-8 components are converted lossily.
#[must_use]
pub fn report_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some(Cow::Borrowed("..")),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    normalize_path_str_cow(&joined).into_owned()
}
