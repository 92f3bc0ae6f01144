//! Content-type classification by magic bytes.
//!
//! Files in a threat-intel corpus are frequently misnamed or carry no
//! extension at all, so routing is decided from the leading bytes of each
//! file. Only as much of the label is used as is needed to send a file to the
//! expand phase ([`ContentFamily::Archive`]) or the scan phase
//! ([`ContentFamily::Document`]).
//!
//! # Detection order
//!
//! 1. `%PDF-` header: PDF document
//! 2. ZIP magic: DOCX when the header region names `[Content_Types].xml` and
//!    `word/` (or the file is called `*.docx`), otherwise a Zip archive
//! 3. 7-Zip and RAR signatures
//! 4. Valid UTF-8 with no NUL byte: plain text
//! 5. Anything else: other

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::ScanError;

/// Number of leading bytes inspected per file.
pub const SNIFF_LEN: usize = 8 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGICS: [&[u8]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];
const SEVEN_ZIP_MAGIC: &[u8] = b"7z\xBC\xAF\x27\x1C";
const RAR_MAGIC: &[u8] = b"Rar!\x1A\x07";

/// Detected content type of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// PDF document
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// UTF-8 (or ASCII) text
    PlainText,
    /// ZIP archive
    Zip,
    /// 7-Zip archive
    SevenZip,
    /// RAR archive
    Rar,
    /// Anything else (executables, images, binary blobs)
    Other,
}

/// Routing family of a [`ContentType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFamily {
    /// Candidate for the expand phase
    Archive,
    /// Candidate for the scan phase
    Document,
    /// Ignored
    Other,
}

impl ContentType {
    /// Human-readable content label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF document",
            Self::Docx => "Microsoft Word 2007+ document",
            Self::PlainText => "text",
            Self::Zip => "Zip archive data",
            Self::SevenZip => "7-zip archive data",
            Self::Rar => "RAR archive data",
            Self::Other => "data",
        }
    }

    /// Family used to route the file through the pipeline.
    #[must_use]
    pub fn family(self) -> ContentFamily {
        match self {
            Self::Pdf | Self::Docx | Self::PlainText => ContentFamily::Document,
            Self::Zip | Self::SevenZip | Self::Rar => ContentFamily::Archive,
            Self::Other => ContentFamily::Other,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify the file at `path` from its leading bytes.
///
/// # Errors
///
/// Returns a [`ScanError`] if the file cannot be opened or read.
pub fn classify(path: &Path) -> Result<ContentType, ScanError> {
    let mut file = File::open(path).map_err(|e| ScanError::from_io(path, e))?;

    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.by_ref()
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)
        .map_err(|e| ScanError::from_io(path, e))?;

    let kind = classify_bytes(&header, path);
    log::trace!("Classified {} as {}", path.display(), kind);
    Ok(kind)
}

/// Classify a header buffer. `path` is only consulted to tell DOCX from a
/// plain ZIP when the header is inconclusive.
#[must_use]
pub fn classify_bytes(header: &[u8], path: &Path) -> ContentType {
    if header.starts_with(PDF_MAGIC) {
        return ContentType::Pdf;
    }
    if ZIP_MAGICS.iter().any(|m| header.starts_with(m)) {
        return if looks_like_docx(header, path) {
            ContentType::Docx
        } else {
            ContentType::Zip
        };
    }
    if header.starts_with(SEVEN_ZIP_MAGIC) {
        return ContentType::SevenZip;
    }
    if header.starts_with(RAR_MAGIC) {
        return ContentType::Rar;
    }
    if is_text(header) {
        return ContentType::PlainText;
    }
    ContentType::Other
}

fn looks_like_docx(header: &[u8], path: &Path) -> bool {
    let has_docx_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"));

    has_docx_extension
        || (contains(header, b"[Content_Types].xml") && contains(header, b"word/"))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Text heuristic: no NUL bytes and valid UTF-8, tolerating a multi-byte
/// sequence cut off by the end of the sniffed window.
fn is_text(header: &[u8]) -> bool {
    if header.is_empty() || header.contains(&0) {
        return false;
    }
    match std::str::from_utf8(header) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && header.len() - e.valid_up_to() < 4,
    }
}
