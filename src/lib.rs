//! iocharvest - indicator harvesting for threat-intel document corpora
//!
//! Walks a directory tree of reports and samples, expands
//! password-protected archives in place, extracts text from the documents,
//! and collects the MD5/SHA-1/SHA-256 tokens each one mentions. Short tokens
//! that are only fragments of longer tokens in the same document are
//! dropped. The result is one JSON record per document.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod signal;

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::JsonOutput;
use crate::pipeline::Pipeline;
use crate::progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, if the run cannot
/// start (bad corpus root) or is interrupted, or if the output file cannot
/// be written. [`ExitCode::from_error`] maps it to an exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let handler = signal::install_handler()?;

    let mut config = match cli.config {
        Some(ref path) => {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            Config::try_load_from_path(path)?
        }
        None => Config::load(),
    };
    config.merge_cli(&cli);
    config.validate()?;

    let output_path = config.resolved_output_path();

    let mut pipeline = Pipeline::new(config).with_shutdown_flag(handler.get_flag());
    if cli.show_progress() {
        pipeline = pipeline.with_progress_callback(Arc::new(Progress::new()));
    }

    let summary = pipeline.run()?;

    JsonOutput::new(&summary.reports)
        .write_file(&output_path)
        .with_context(|| format!("Cannot write reports to {}", output_path.display()))?;

    log::info!(
        "Scanned {} document(s): {} report(s) with {} indicator(s), {} failed; \
         archives: {} expanded, {} failed, {} skipped; output: {} ({:.1}s)",
        summary.documents_found,
        summary.documents_reported(),
        summary.indicator_count(),
        summary.documents_failed,
        summary.archives_expanded,
        summary.archives_failed,
        summary.archives_skipped,
        output_path.display(),
        summary.total_duration.as_secs_f64()
    );

    Ok(ExitCode::Success)
}
