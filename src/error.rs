//! Structured error handling and exit codes.

use serde::Serialize;

use crate::config::ConfigError;
use crate::pipeline::PipelineError;

/// Exit codes for the iocharvest application.
///
/// Per-archive and per-document failures never change the exit code; only
/// a run that could not start or finish does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed and the output was written.
    Success = 0,
    /// General error: an unexpected failure (configuration, output file).
    GeneralError = 1,
    /// Invalid input: the corpus root is missing or not a directory.
    InvalidInput = 2,
    /// Interrupted: the run was aborted by Ctrl+C; nothing was written.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "IH000",
            Self::GeneralError => "IH001",
            Self::InvalidInput => "IH002",
            Self::Interrupted => "IH130",
        }
    }

    /// Exit code for an error returned by `run_app`.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<PipelineError>() {
            return match e {
                PipelineError::Interrupted => Self::Interrupted,
                e if e.is_precondition() => Self::InvalidInput,
                _ => Self::GeneralError,
            };
        }
        if let Some(ConfigError::MissingCorpusRoot) = err.downcast_ref::<ConfigError>() {
            return Self::InvalidInput;
        }
        Self::GeneralError
    }
}

/// Structured error information, printed on failure.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "IH001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the run was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] Error: {}", self.code, self.message)
    }
}
