//! In-place expansion of (possibly password-protected) archives.
//!
//! # Overview
//!
//! [`ArchiveExpander`] extracts an archive into its own parent directory,
//! trying a fixed sequence of passwords: first no password, then each
//! configured candidate in order. It stops at the first attempt the backend
//! reports as a clean success.
//!
//! - A wrong-password failure moves on to the next candidate.
//! - Any other failure (corrupt archive, unsupported method) ends the
//!   expansion of that archive immediately. It is never retried.
//!
//! The actual decompression is delegated to an [`ArchiveBackend`]; the
//! production backend is [`SevenZip`], which drives the external `7z` tool.
//!
//! # Example
//!
//! ```no_run
//! use iocharvest::archive::{ArchiveExpander, SevenZip};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let expander = ArchiveExpander::new(
//!     Arc::new(SevenZip::new("7z")),
//!     vec!["infected".to_string(), "malware".to_string()],
//! );
//! match expander.expand(Path::new("samples/dropper.zip")) {
//!     Ok(password) => println!("extracted (password: {:?})", password),
//!     Err(e) => eprintln!("skipped: {}", e),
//! }
//! ```

pub mod sevenzip;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use sevenzip::SevenZip;

/// Result of a single extraction attempt with one password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The backend reported an unambiguous success.
    Extracted,
    /// The archive is encrypted and the password did not open it.
    WrongPassword,
    /// Any other failure; carries the backend's diagnostic output.
    Failed(String),
}

/// A decompression engine able to extract one archive with one password.
///
/// Implementations must be usable from several worker threads at once.
pub trait ArchiveBackend: Send + Sync {
    /// Extract `archive` into `dest`.
    ///
    /// `password` is `None` for the no-password attempt.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only when the backend itself cannot be run
    /// (e.g. the tool is not installed). Extraction failures are reported
    /// through [`AttemptOutcome`].
    fn attempt(
        &self,
        archive: &Path,
        dest: &Path,
        password: Option<&str>,
    ) -> std::io::Result<AttemptOutcome>;

    /// Whether the backend can run at all on this host.
    fn is_available(&self) -> bool {
        true
    }

    /// Short name used in log messages.
    fn name(&self) -> &str;
}

/// Errors that end the expansion of one archive.
#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    /// Every candidate password was rejected.
    #[error("No candidate password opened {path} ({attempts} attempts)")]
    PasswordsExhausted {
        /// Archive path
        path: PathBuf,
        /// Number of attempts made, including the no-password attempt
        attempts: usize,
    },

    /// The backend reported a failure unrelated to the password.
    #[error("Failed to extract {path}: {message}")]
    ExtractionFailed {
        /// Archive path
        path: PathBuf,
        /// Diagnostic output from the backend
        message: String,
    },

    /// The backend could not be run.
    #[error("Failed to run {backend} for {path}: {source}")]
    Backend {
        /// Archive path
        path: PathBuf,
        /// Backend name
        backend: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The archive path has no parent directory to extract into.
    #[error("Archive has no parent directory: {0}")]
    NoParent(PathBuf),
}

/// Expands archives in place using an ordered password dictionary.
#[derive(Clone)]
pub struct ArchiveExpander {
    backend: Arc<dyn ArchiveBackend>,
    passwords: Vec<String>,
}

impl std::fmt::Debug for ArchiveExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveExpander")
            .field("backend", &self.backend.name())
            .field("passwords", &self.passwords.len())
            .finish()
    }
}

impl ArchiveExpander {
    /// Create an expander.
    ///
    /// # Arguments
    ///
    /// * `backend` - Decompression engine
    /// * `passwords` - Candidates tried, in order, after the no-password attempt
    #[must_use]
    pub fn new(backend: Arc<dyn ArchiveBackend>, passwords: Vec<String>) -> Self {
        Self { backend, passwords }
    }

    /// The full attempt sequence: no password first, then each candidate.
    pub fn attempts(&self) -> impl Iterator<Item = Option<&str>> {
        std::iter::once(None).chain(self.passwords.iter().map(|p| Some(p.as_str())))
    }

    /// Extract `archive` into its parent directory.
    ///
    /// Returns the password that opened the archive (`None` if it needed
    /// none).
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] if every password is rejected, if the
    /// backend reports any other failure, or if the backend cannot run.
    pub fn expand(&self, archive: &Path) -> Result<Option<String>, ArchiveError> {
        let dest = archive
            .parent()
            .ok_or_else(|| ArchiveError::NoParent(archive.to_path_buf()))?;

        let mut attempts = 0;
        for password in self.attempts() {
            attempts += 1;
            log::debug!(
                "Expanding {} (attempt {}, password: {})",
                archive.display(),
                attempts,
                if password.is_some() { "candidate" } else { "none" }
            );

            let outcome = self
                .backend
                .attempt(archive, dest, password)
                .map_err(|source| ArchiveError::Backend {
                    path: archive.to_path_buf(),
                    backend: self.backend.name().to_string(),
                    source,
                })?;

            match outcome {
                AttemptOutcome::Extracted => {
                    log::debug!("Expanded {} after {} attempt(s)", archive.display(), attempts);
                    return Ok(password.map(str::to_string));
                }
                AttemptOutcome::WrongPassword => continue,
                AttemptOutcome::Failed(message) => {
                    return Err(ArchiveError::ExtractionFailed {
                        path: archive.to_path_buf(),
                        message,
                    });
                }
            }
        }

        Err(ArchiveError::PasswordsExhausted {
            path: archive.to_path_buf(),
            attempts,
        })
    }
}
