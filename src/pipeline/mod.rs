//! Two-phase corpus processing.
//!
//! # Overview
//!
//! [`Pipeline::run`] processes a corpus in two phases separated by a strict
//! barrier:
//!
//! 1. **Expand** - walk and classify the tree, then expand every archive in
//!    place, in parallel. Each expansion is independent; a failure is logged
//!    and the archive is skipped.
//! 2. **Scan** - walk and classify the (now expanded) tree again, then for
//!    every document extract its text, scan it for hash tokens, disambiguate
//!    them and build a [`DocumentReport`], in parallel. A document whose text
//!    cannot be extracted produces no report.
//!
//! Workers return one `Result` per item; the reports are gathered by a
//! single collection step once each phase finishes.
//!
//! # Example
//!
//! ```no_run
//! use iocharvest::config::Config;
//! use iocharvest::pipeline::Pipeline;
//! use std::path::PathBuf;
//!
//! let config = Config {
//!     corpus_root: Some(PathBuf::from("/data/corpus")),
//!     ..Config::default()
//! };
//! let summary = Pipeline::new(config).run().unwrap();
//! println!("{} report(s)", summary.reports.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;

use crate::archive::{ArchiveBackend, ArchiveExpander, SevenZip};
use crate::config::Config;
use crate::indicators::scan_text;
use crate::progress::{ProgressCallback, PHASE_EXPAND, PHASE_SCAN, PHASE_WALKING};
use crate::report::DocumentReport;
use crate::scanner::path_utils::report_path;
use crate::scanner::{
    classify, ContentFamily, ContentType, DocumentError, DocumentExtractor, FileEntry, Walker,
};

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The run was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Run interrupted by user")]
    Interrupted,

    /// No corpus root was configured.
    #[error("No corpus root configured")]
    MissingCorpusRoot,

    /// The corpus root does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The corpus root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// Whether this error is a violated run precondition (bad corpus root).
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingCorpusRoot | Self::PathNotFound(_) | Self::NotADirectory(_)
        )
    }
}

/// Outcome and statistics of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Reports for every successfully processed document, sorted by path
    pub reports: Vec<DocumentReport>,
    /// Files seen by the scan-phase walk
    pub files_walked: usize,
    /// Entries the walker or classifier could not read, over both walks
    pub unreadable_files: usize,
    /// Archives found by the expand-phase walk
    pub archives_found: usize,
    /// Archives extracted successfully
    pub archives_expanded: usize,
    /// Archives whose extraction failed
    pub archives_failed: usize,
    /// Archives not attempted because the archive tool is unavailable
    pub archives_skipped: usize,
    /// Documents found by the scan-phase walk
    pub documents_found: usize,
    /// Documents whose text could not be extracted
    pub documents_failed: usize,
    /// Duration of the expand phase, including its walk
    pub expand_duration: Duration,
    /// Duration of the scan phase, including its walk
    pub scan_duration: Duration,
    /// Duration of the entire run
    pub total_duration: Duration,
}

impl RunSummary {
    /// Number of reports produced.
    #[must_use]
    pub fn documents_reported(&self) -> usize {
        self.reports.len()
    }

    /// Total indicators across all reports.
    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.reports.iter().map(DocumentReport::indicator_count).sum()
    }
}

/// Orchestrates the expand and scan phases over one corpus.
pub struct Pipeline {
    config: Config,
    backend: Arc<dyn ArchiveBackend>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Pipeline {
    /// Create a pipeline using the configured archive tool.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let backend = Arc::new(SevenZip::new(config.archive_tool.clone()));
        Self {
            config,
            backend,
            progress_callback: None,
            shutdown_flag: None,
        }
    }

    /// Replace the archive backend.
    #[must_use]
    pub fn with_archive_backend(mut self, backend: Arc<dyn ArchiveBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the shutdown flag for aborting the run.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn check_shutdown(&self) -> Result<(), PipelineError> {
        if self.is_shutdown_requested() {
            Err(PipelineError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Run both phases over the configured corpus root.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if the corpus root is missing or not a
    /// directory, if the worker pool cannot be built, or if the run is
    /// interrupted. Per-archive and per-document failures are not errors;
    /// they are logged and counted in the [`RunSummary`].
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let start_time = Instant::now();

        let root = self
            .config
            .corpus_root
            .as_deref()
            .ok_or(PipelineError::MissingCorpusRoot)?;
        if !root.exists() {
            return Err(PipelineError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(PipelineError::NotADirectory(root.to_path_buf()));
        }

        self.check_shutdown()?;

        let threads = self.config.effective_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("iocharvest-worker-{}", i))
            .build()?;

        log::info!(
            "Processing corpus {} with {} worker thread(s)",
            root.display(),
            threads
        );

        let mut summary = RunSummary::default();

        let phase_start = Instant::now();
        self.expand_phase(root, &pool, &mut summary)?;
        summary.expand_duration = phase_start.elapsed();

        let phase_start = Instant::now();
        self.scan_phase(root, &pool, &mut summary)?;
        summary.scan_duration = phase_start.elapsed();

        summary.total_duration = start_time.elapsed();
        Ok(summary)
    }

    /// Phase 1: expand every archive in place.
    fn expand_phase(
        &self,
        root: &Path,
        pool: &rayon::ThreadPool,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let inventory = self.inventory(root, pool, summary)?;
        let archives: Vec<FileEntry> = inventory
            .into_iter()
            .filter(|(_, kind)| kind.family() == ContentFamily::Archive)
            .map(|(file, _)| file)
            .collect();

        summary.archives_found = archives.len();
        log::info!("Phase 1: Found {} archive(s)", archives.len());

        if archives.is_empty() {
            return Ok(());
        }

        if !self.backend.is_available() {
            log::error!(
                "Archive tool '{}' could not be started; skipping {} archive(s)",
                self.config.archive_tool.display(),
                archives.len()
            );
            summary.archives_skipped = archives.len();
            return Ok(());
        }

        let expander = ArchiveExpander::new(
            Arc::clone(&self.backend),
            self.config.candidate_passwords.clone(),
        );

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_EXPAND, archives.len());
        }

        let done = AtomicUsize::new(0);
        let outcomes: Vec<Option<bool>> = pool.install(|| {
            archives
                .par_iter()
                .map(|archive| {
                    if self.is_shutdown_requested() {
                        return None;
                    }

                    let result = expander.expand(&archive.path);
                    let expanded = match result {
                        Ok(password) => {
                            log::debug!(
                                "Expanded {}{}",
                                archive.path.display(),
                                if password.is_some() { " (password protected)" } else { "" }
                            );
                            true
                        }
                        Err(e) => {
                            log::warn!("Skipping archive: {}", e);
                            false
                        }
                    };

                    if let Some(ref callback) = self.progress_callback {
                        let done = done.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(done, archive.path.to_string_lossy().as_ref());
                    }
                    Some(expanded)
                })
                .collect()
        });

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_EXPAND);
        }

        self.check_shutdown()?;

        summary.archives_expanded = outcomes.iter().filter(|o| **o == Some(true)).count();
        summary.archives_failed = outcomes.iter().filter(|o| **o == Some(false)).count();
        log::info!(
            "Phase 1: Expanded {} archive(s), {} failed",
            summary.archives_expanded,
            summary.archives_failed
        );
        Ok(())
    }

    /// Phase 2: build a report for every document.
    fn scan_phase(
        &self,
        root: &Path,
        pool: &rayon::ThreadPool,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let inventory = self.inventory(root, pool, summary)?;
        summary.files_walked = inventory.len();

        let documents: Vec<(FileEntry, ContentType)> = inventory
            .into_iter()
            .filter(|(_, kind)| self.is_document(*kind))
            .collect();

        summary.documents_found = documents.len();
        log::info!("Phase 2: Scanning {} document(s)", documents.len());

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_SCAN, documents.len());
        }

        let done = AtomicUsize::new(0);
        let results: Vec<Option<Result<DocumentReport, DocumentError>>> = pool.install(|| {
            documents
                .par_iter()
                .map(|(file, kind)| {
                    if self.is_shutdown_requested() {
                        return None;
                    }

                    let result = self.scan_document(root, &file.path, *kind);

                    if let Some(ref callback) = self.progress_callback {
                        let done = done.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(done, file.path.to_string_lossy().as_ref());
                    }
                    Some(result)
                })
                .collect()
        });

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_SCAN);
        }

        self.check_shutdown()?;

        for result in results.into_iter().flatten() {
            match result {
                Ok(report) => {
                    log::debug!("Report: {}", report);
                    summary.reports.push(report);
                }
                Err(e) => {
                    log::warn!("Skipping document: {}", e);
                    summary.documents_failed += 1;
                }
            }
        }
        summary.reports.sort_by(|a, b| a.path().cmp(b.path()));

        log::info!(
            "Phase 2: {} report(s), {} document(s) failed",
            summary.reports.len(),
            summary.documents_failed
        );
        Ok(())
    }

    /// Extract, scan and disambiguate one document.
    fn scan_document(
        &self,
        root: &Path,
        path: &Path,
        kind: ContentType,
    ) -> Result<DocumentReport, DocumentError> {
        let text = DocumentExtractor::extract_text(path, kind)?;
        let raw = scan_text(&text);
        Ok(DocumentReport::new(
            report_path(root, path),
            &self.config.year_range,
            raw,
        ))
    }

    fn is_document(&self, kind: ContentType) -> bool {
        match kind {
            ContentType::PlainText => self.config.include_plain_text,
            other => other.family() == ContentFamily::Document,
        }
    }

    /// Walk the corpus and classify every file.
    ///
    /// Unreadable entries are logged, counted and left out.
    fn inventory(
        &self,
        root: &Path,
        pool: &rayon::ThreadPool,
        summary: &mut RunSummary,
    ) -> Result<Vec<(FileEntry, ContentType)>, PipelineError> {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut walker = Walker::new(root, self.config.walker_config());
        if let Some(ref flag) = self.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }

        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    }
                    files.push(file);
                }
                Err(e) => {
                    log::warn!("Cannot read corpus entry: {}", e);
                    summary.unreadable_files += 1;
                }
            }
        }

        self.check_shutdown()?;

        let classified: Vec<Option<(FileEntry, ContentType)>> = pool.install(|| {
            files
                .into_par_iter()
                .map(|file| match classify(&file.path) {
                    Ok(kind) => Some((file, kind)),
                    Err(e) => {
                        log::warn!("Cannot classify {}: {}", file.path.display(), e);
                        None
                    }
                })
                .collect()
        });

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        let total = classified.len();
        let inventory: Vec<_> = classified.into_iter().flatten().collect();
        summary.unreadable_files += total - inventory.len();
        log::debug!("Classified {} of {} file(s)", inventory.len(), total);

        Ok(inventory)
    }
}
