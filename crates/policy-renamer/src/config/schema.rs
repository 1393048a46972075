use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ARCHIVE_NAME: &str = "renamed_policies.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Pause between two records, in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    #[serde(default)]
    pub compression: Compression,
    /// Capacity of the record event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_throttle_ms() -> u64 {
    500
}

fn default_archive_name() -> String {
    DEFAULT_ARCHIVE_NAME.to_string()
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_event_capacity() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            throttle_ms: default_throttle_ms(),
            archive_name: default_archive_name(),
            output_directory: default_output_directory(),
            compression: Compression::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    pub fn method(self) -> zip::CompressionMethod {
        match self {
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Stored => zip::CompressionMethod::Stored,
        }
    }
}

/// Runtime settings for a [`crate::RenameSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub throttle: Duration,
    pub archive_name: String,
    pub output_directory: PathBuf,
    pub compression: Compression,
    pub event_capacity: usize,
}

impl SessionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            throttle: Duration::from_millis(config.throttle_ms),
            archive_name: config.archive_name.clone(),
            output_directory: PathBuf::from(&config.output_directory),
            compression: config.compression,
            event_capacity: config.event_capacity,
        }
    }

    /// Same as the defaults but without the pause between records.
    pub fn unthrottled() -> Self {
        Self {
            throttle: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
