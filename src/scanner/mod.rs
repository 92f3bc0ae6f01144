//! Scanner module for corpus traversal, content classification, and text
//! extraction.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Content-type sniffing by magic bytes
//! - Plain-text recovery from PDF, DOCX and text documents
//! - Unicode normalization of report paths
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`classify`]: Content classification (archive / document / other)
//! - [`document`]: Text extraction from documents
//! - [`path_utils`]: Corpus-relative path rendering
//!
//! # Example
//!
//! ```no_run
//! use iocharvest::scanner::{classify, ContentFamily, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("./corpus"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => {
//!             if let Ok(kind) = classify(&file.path) {
//!                 if kind.family() == ContentFamily::Archive {
//!                     println!("archive: {}", file.path.display());
//!                 }
//!             }
//!         }
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod classify;
pub mod document;
pub mod path_utils;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use classify::{classify, classify_bytes, ContentFamily, ContentType};
pub use document::{DocumentError, DocumentExtractor};
pub use walker::Walker;

/// A regular file discovered under the corpus root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute (or root-joined) path to the file
    pub path: PathBuf,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl WalkerConfig {
    /// Create a new walker configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
        }
    }
}

/// Errors that can occur while walking or classifying the corpus.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Map an I/O error on `path` to the matching variant.
    pub(crate) fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
