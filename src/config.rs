//! Run configuration and the optional TOML settings file.
//!
//! A run is described by two values:
//! - [`RunConfig`]: directories, transfer mode and behaviour flags from the
//!   command line. Built once and read-only afterwards.
//! - [`OrganizerConfig`]: device aliases and filename timestamp patterns,
//!   loaded from TOML.
//!
//! # Configuration File Format
//!
//! ```toml
//! [aliases]
//! "2304FPN6DC" = "Xiaomi13Ultra"
//! "22021211RC" = "RedmiK40S"
//!
//! # Tried in order; the first pattern producing a valid date wins.
//! # When present, these replace the built-in patterns.
//! [[timestamp_patterns]]
//! regex = '\d{8}_\d{6}'
//! format = "%Y%m%d_%H%M%S"
//! ```

use crate::alias::AliasResolver;
use crate::conflict::ConflictPolicy;
use crate::file_transfer::TransferMode;
use crate::filename_matcher::{PatternError, TimestampNameMatcher, TimestampPattern};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".mediasort.toml";

/// Errors that can occur while building the run configuration.
///
/// All of these are fatal and are raised before any file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid regex in a timestamp pattern.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    /// Invalid chrono format in a timestamp pattern.
    #[error("Invalid time format '{0}'")]
    InvalidTimeFormat(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
    /// The source directory does not exist or is not a directory.
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}

impl From<PatternError> for ConfigError {
    fn from(err: PatternError) -> Self {
        match err {
            PatternError::InvalidRegex { pattern, reason } => {
                ConfigError::InvalidRegexPattern { pattern, reason }
            }
            PatternError::InvalidFormat(format) => ConfigError::InvalidTimeFormat(format),
        }
    }
}

/// Settings for one organize run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory scanned for media files.
    pub source: PathBuf,
    /// Root of the organized tree.
    pub destination: PathBuf,
    pub mode: TransferMode,
    /// Resolve and report only; nothing is created, copied or moved.
    pub dry_run: bool,
    /// Rename instead of skipping when a destination is occupied.
    pub no_skip: bool,
    /// Replace existing destination files.
    pub overwrite: bool,
    /// Answer yes to every confirmation.
    pub yes: bool,
    /// Build the whole plan first and confirm it once.
    pub together: bool,
}

impl RunConfig {
    /// Creates a configuration with all flags off.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, mode: TransferMode) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode,
            dry_run: false,
            no_skip: false,
            overwrite: false,
            yes: false,
            together: false,
        }
    }

    /// Checks that the source directory exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source.is_dir() {
            return Err(ConfigError::SourceNotFound(self.source.clone()));
        }
        Ok(())
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        ConflictPolicy {
            overwrite: self.overwrite,
            no_skip: self.no_skip,
        }
    }
}

/// Contents of the TOML settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Raw device identifier to folder alias.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    /// Ordered filename timestamp patterns; empty means built-in defaults.
    #[serde(default)]
    pub timestamp_patterns: Vec<TimestampPatternConfig>,
}

/// One `{regex, format}` pair from the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampPatternConfig {
    pub regex: String,
    /// chrono `strftime` layout of the matched text.
    pub format: String,
}

/// Settings compiled into the lookup structures used during resolution.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub aliases: AliasResolver,
    pub timestamps: TimestampNameMatcher,
}

impl OrganizerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.mediasort.toml` in the current directory
    /// 3. Look for `~/.config/mediasort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("mediasort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile configuration into the structures used for resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or time format is invalid.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        let timestamps = if self.timestamp_patterns.is_empty() {
            TimestampNameMatcher::default()
        } else {
            let patterns = self
                .timestamp_patterns
                .iter()
                .map(|p| TimestampPattern::new(&p.regex, &p.format))
                .collect::<Result<Vec<_>, _>>()?;
            TimestampNameMatcher::new(patterns)
        };

        Ok(CompiledConfig {
            aliases: self.aliases.into_iter().collect(),
            timestamps,
        })
    }
}
