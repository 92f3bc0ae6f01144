//! Archive backend driving the external `7z` command-line tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{ArchiveBackend, AttemptOutcome};

/// Marker printed by 7-Zip when extraction completed without errors.
const SUCCESS_MARKER: &str = "Everything is Ok";

/// Marker (case-insensitive) printed by 7-Zip for a rejected password.
const WRONG_PASSWORD_MARKER: &str = "wrong password";

/// Backend invoking `7z x` as a child process.
#[derive(Debug, Clone)]
pub struct SevenZip {
    program: PathBuf,
}

impl SevenZip {
    /// Create a backend for the given executable name or path.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for one extraction attempt.
    ///
    /// An empty `-p` switch is passed for the no-password attempt so 7-Zip
    /// never stops to prompt.
    #[must_use]
    pub fn args(archive: &Path, dest: &Path, password: Option<&str>) -> Vec<OsString> {
        let mut out_switch = OsString::from("-o");
        out_switch.push(dest.as_os_str());

        vec![
            OsString::from("x"),
            OsString::from("-y"),
            OsString::from("-aoa"),
            OsString::from(format!("-p{}", password.unwrap_or(""))),
            out_switch,
            archive.as_os_str().to_os_string(),
        ]
    }

    /// Map a finished 7-Zip run to an attempt outcome.
    #[must_use]
    pub fn interpret(success: bool, output: &str) -> AttemptOutcome {
        if success && output.contains(SUCCESS_MARKER) {
            AttemptOutcome::Extracted
        } else if output.to_lowercase().contains(WRONG_PASSWORD_MARKER) {
            AttemptOutcome::WrongPassword
        } else {
            AttemptOutcome::Failed(last_meaningful_line(output))
        }
    }
}

impl Default for SevenZip {
    fn default() -> Self {
        Self::new("7z")
    }
}

impl ArchiveBackend for SevenZip {
    fn attempt(
        &self,
        archive: &Path,
        dest: &Path,
        password: Option<&str>,
    ) -> std::io::Result<AttemptOutcome> {
        let output = Command::new(&self.program)
            .args(Self::args(archive, dest, password))
            .stdin(Stdio::null())
            .output()?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(Self::interpret(output.status.success(), &text))
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn name(&self) -> &str {
        "7z"
    }
}

fn last_meaningful_line(output: &str) -> String {
    output
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or("no output")
        .to_string()
}
