//! Core types for nodelog

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::*;

fn default_frequency_secs() -> u64 {
    DEFAULT_FREQUENCY_SECS
}

/// On-disk format of the logs under a root directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text, `.log` files
    #[default]
    Text,
    /// Structured records, `.json` files
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }

    /// File extension, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Text => "log",
            LogFormat::Json => "json",
        }
    }

    /// Name of the "current log" symlink: `node.log` or `node.json`
    pub fn symlink_name(&self) -> String {
        format!("{}.{}", SYMLINK_STEM, self.extension())
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A configured root directory and the format of the logs beneath it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootSpec {
    pub path: PathBuf,
    pub format: LogFormat,
}

impl RootSpec {
    pub fn new(path: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

/// Rotation thresholds, constant for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RotationParams {
    /// Rotate once the current log reaches this many bytes
    pub max_size_bytes: u64,
    /// Logs older than this are candidates for deletion
    pub max_age_hours: u64,
    /// Minimum number of logs retained per subdirectory
    pub keep_files: usize,
    /// Seconds between rotation passes
    #[serde(default = "default_frequency_secs")]
    pub frequency_secs: u64,
}

impl RotationParams {
    pub fn new(max_size_bytes: u64, max_age_hours: u64, keep_files: usize) -> Self {
        Self {
            max_size_bytes,
            max_age_hours,
            keep_files,
            frequency_secs: DEFAULT_FREQUENCY_SECS,
        }
    }

    /// Interval between rotation passes
    pub fn frequency(&self) -> Duration {
        Duration::from_secs(self.frequency_secs)
    }
}
