//! Command-line interface definitions for iocharvest.
//!
//! The run takes two parameters, the corpus root and an optional output
//! file. Everything else is either an ambient option (verbosity, config
//! file, progress display) or comes from the configuration layers.
//!
//! # Example
//!
//! ```bash
//! # Process a corpus, writing reports_<today>.json
//! iocharvest /data/APT_Collections
//!
//! # Explicit output file, debug logging
//! iocharvest -v /data/APT_Collections iocs.json
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Harvest MD5/SHA-1/SHA-256 indicators from threat-intel documents.
///
/// Expands password-protected archives in place, extracts text from PDF,
/// DOCX and plain-text documents, and writes one JSON report per document.
#[derive(Debug, Parser)]
#[command(name = "iocharvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory of the document corpus
    #[arg(value_name = "CORPUS_ROOT")]
    pub corpus_root: PathBuf,

    /// Output file (default: reports_<YYYY-MM-DD>.json)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: platform config dir)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Whether progress bars should be drawn.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !(self.quiet || self.no_progress)
    }
}
