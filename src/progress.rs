//! Progress reporting utilities using indicatif.
//!
//! The pipeline reports its three phases through [`ProgressCallback`]:
//!
//! - `walking`: corpus traversal and classification (spinner, open-ended)
//! - `expand`: archive expansion (bar over the archives found)
//! - `scan`: text extraction and indicator scanning (bar over the documents)
//!
//! [`Progress`] renders them in the terminal.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name for corpus traversal.
pub const PHASE_WALKING: &str = "walking";
/// Phase name for archive expansion.
pub const PHASE_EXPAND: &str = "expand";
/// Phase name for document scanning.
pub const PHASE_SCAN: &str = "scan";

/// Progress callback for the pipeline phases.
///
/// Implementations are shared across worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (`walking`, `expand` or `scan`)
    /// * `total` - Total number of items to process (0 when unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `done` - Number of items finished so far in the current phase
    /// * `path` - Path being processed
    fn on_progress(&self, done: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    expand: Mutex<Option<ProgressBar>>,
    scan: Mutex<Option<ProgressBar>>,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Examples
    ///
    /// ```
    /// use iocharvest::progress::Progress;
    ///
    /// let progress = Progress::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            expand: Mutex::new(None),
            scan: Mutex::new(None),
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<MutexGuard<'_, Option<ProgressBar>>> {
        let slot = match phase {
            PHASE_WALKING => &self.walking,
            PHASE_EXPAND => &self.expand,
            PHASE_SCAN => &self.scan,
            _ => return None,
        };
        Some(slot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// The bar of the most recently started phase that is still running.
    fn active(&self) -> Option<ProgressBar> {
        [PHASE_SCAN, PHASE_EXPAND, PHASE_WALKING]
            .into_iter()
            .find_map(|phase| self.slot(phase).and_then(|guard| guard.clone()))
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        let pb = match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking corpus");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            PHASE_EXPAND => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_message("Expanding archives");
                pb
            }
            PHASE_SCAN => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style());
                pb.set_message("Scanning documents");
                pb
            }
            _ => return,
        };

        if let Some(mut slot) = self.slot(phase) {
            *slot = Some(pb);
        }
    }

    fn on_progress(&self, done: usize, path: &str) {
        if let Some(pb) = self.active() {
            pb.set_position(done as u64);
            pb.set_message(truncate_path(path, 30));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        let message = match phase {
            PHASE_WALKING => "Walking complete",
            PHASE_EXPAND => "Expansion complete",
            PHASE_SCAN => "Scan complete",
            _ => return,
        };

        if let Some(pb) = self.slot(phase).and_then(|mut slot| slot.take()) {
            pb.finish_with_message(message);
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
