//! Configuration module for limbofs.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, and defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration for limbofs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub handles: HandleConfig,
    pub logging: LoggingConfig,
}

/// File store capacity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of live file records.
    pub max_files: usize,
    /// Maximum size of a single file's content, in bytes.
    pub max_file_size: u64,
}

/// Per-context open-handle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleConfig {
    /// Maximum number of simultaneously open handles per context.
    pub max_open_per_context: usize,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_files: 65_536,
            max_file_size: 16 * 1024 * 1024,
        }
    }
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            max_open_per_context: 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"store.max_files"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.store.max_files == 0 {
            errors.push(ValidationError {
                field: "store.max_files".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.store.max_file_size == 0 {
            errors.push(ValidationError {
                field: "store.max_file_size".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.handles.max_open_per_context == 0 {
            errors.push(ValidationError {
                field: "handles.max_open_per_context".into(),
                message: "must be greater than 0".into(),
            });
        }
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!("must be one of {}", VALID_LOG_LEVELS.join(", ")),
            });
        }

        errors
    }
}
