//! Run configuration.
//!
//! Settings are layered with figment, later layers overriding earlier ones:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. a TOML file (`--config`, else `<config dir>/iocharvest/config.toml`)
//! 3. `IOCHARVEST_*` environment variables, nested keys split on `__`
//!    (e.g. `IOCHARVEST_YEAR_RANGE__MIN=2010`)
//! 4. command-line arguments ([`Config::merge_cli`])
//!
//! # Example file
//!
//! ```toml
//! candidate_passwords = ["infected", "malware", "virus", "apt"]
//! archive_tool = "/usr/bin/7za"
//! threads = 8
//!
//! [year_range]
//! min = 2008
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::report::YearRange;
use crate::scanner::WalkerConfig;

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "IOCHARVEST_";

/// Passwords conventionally used to pack malware samples.
pub const DEFAULT_PASSWORDS: [&str; 3] = ["infected", "malware", "virus"];

/// Top-level keys accepted in the configuration file.
const KNOWN_KEYS: [&str; 9] = [
    "corpus_root",
    "output_path",
    "candidate_passwords",
    "year_range",
    "archive_tool",
    "threads",
    "follow_symlinks",
    "skip_hidden",
    "include_plain_text",
];

const KNOWN_YEAR_RANGE_KEYS: [&str; 2] = ["min", "max"];

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration sources could not be merged or deserialized.
    #[error("Invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// `year_range.min` is greater than `year_range.max`.
    #[error("Invalid year range: min ({min}) is greater than max ({max})")]
    InvalidYearRange {
        /// Configured minimum
        min: i32,
        /// Configured maximum
        max: i32,
    },

    /// No candidate passwords were configured.
    #[error("candidate_passwords must contain at least one password")]
    NoPasswords,

    /// No corpus root was given.
    #[error("No corpus root given")]
    MissingCorpusRoot,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory tree to process.
    pub corpus_root: Option<PathBuf>,
    /// Output file; a dated name in the working directory when unset.
    pub output_path: Option<PathBuf>,
    /// Passwords tried, in order, after the no-password attempt.
    pub candidate_passwords: Vec<String>,
    /// Years that may be inferred from report paths.
    pub year_range: YearRange,
    /// Archive extraction executable.
    pub archive_tool: PathBuf,
    /// Worker threads; 0 uses the host's available parallelism.
    pub threads: usize,
    /// Follow symbolic links while walking the corpus.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Treat UTF-8 plain-text files as documents.
    pub include_plain_text: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_root: None,
            output_path: None,
            candidate_passwords: DEFAULT_PASSWORDS.iter().map(|p| (*p).to_string()).collect(),
            year_range: YearRange::default(),
            archive_tool: PathBuf::from("7z"),
            threads: 0,
            follow_symlinks: false,
            skip_hidden: false,
            include_plain_text: true,
        }
    }
}

impl Config {
    /// Load from the default config file location, falling back to the
    /// defaults (with a warning) if the sources cannot be read.
    #[must_use]
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No platform config directory, using defaults");
                Self::load_from_path(PathBuf::new())
            }
        }
    }

    /// Load from `path`, falling back to the defaults (with a warning) on
    /// any error. A missing file is not an error.
    #[must_use]
    pub fn load_from_path(path: PathBuf) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load from `path`, failing on unreadable or malformed sources.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but cannot be read, or if
    /// the merged sources do not deserialize.
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if path.is_file() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            for warning in unknown_key_warnings(&content) {
                log::warn!("{}: {}", path.display(), warning);
            }
            figment = figment.merge(Toml::string(&content));
            log::debug!("Loaded config file {}", path.display());
        } else if !path.as_os_str().is_empty() {
            log::debug!("Config file {} not found", path.display());
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    /// The platform config file path (`<config dir>/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "iocharvest", "iocharvest")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply the command-line run parameters.
    pub fn merge_cli(&mut self, cli: &Cli) {
        self.corpus_root = Some(cli.corpus_root.clone());
        if let Some(ref output) = cli.output {
            self.output_path = Some(output.clone());
        }
    }

    /// Check the configuration for values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.corpus_root.is_none() {
            return Err(ConfigError::MissingCorpusRoot);
        }
        if !self.year_range.is_valid() {
            return Err(ConfigError::InvalidYearRange {
                min: self.year_range.min,
                max: self.year_range.max,
            });
        }
        if self.candidate_passwords.is_empty() {
            return Err(ConfigError::NoPasswords);
        }
        Ok(())
    }

    /// Worker pool size, resolving 0 to the host's available parallelism.
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        }
    }

    /// Traversal settings for the corpus walker.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.follow_symlinks, self.skip_hidden)
    }

    /// The output file, defaulting to `reports_<today>.json`.
    #[must_use]
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path.clone().unwrap_or_else(|| {
            crate::output::default_output_path(chrono::Local::now().date_naive())
        })
    }
}

/// Describe unrecognized keys in a TOML document, with a suggestion when a
/// known key is close.
///
/// Content that does not parse yields no warnings; the parse error is
/// reported by the loader instead.
#[must_use]
pub fn unknown_key_warnings(content: &str) -> Vec<String> {
    let Ok(table) = content.parse::<toml::Table>() else {
        return Vec::new();
    };

    let mut warnings = Vec::new();
    for (key, value) in &table {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warnings.push(describe_unknown(key, &KNOWN_KEYS));
            continue;
        }
        if key == "year_range" {
            if let Some(inner) = value.as_table() {
                for sub in inner.keys() {
                    if !KNOWN_YEAR_RANGE_KEYS.contains(&sub.as_str()) {
                        warnings.push(describe_unknown(
                            &format!("year_range.{}", sub),
                            &["year_range.min", "year_range.max"],
                        ));
                    }
                }
            }
        }
    }
    warnings
}

/// Closest known key by Jaro-Winkler similarity, if close enough.
#[must_use]
pub fn suggest_key<'a>(key: &str, known: &[&'a str]) -> Option<&'a str> {
    known
        .iter()
        .map(|candidate| (*candidate, strsim::jaro_winkler(key, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

fn describe_unknown(key: &str, known: &[&str]) -> String {
    match suggest_key(key, known) {
        Some(suggestion) => format!("unknown key '{}' (did you mean '{}'?)", key, suggestion),
        None => format!("unknown key '{}'", key),
    }
}
