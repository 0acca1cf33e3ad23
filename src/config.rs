//! Analyzer Configuration
//!
//! Features:
//! - Input locations for the mode selector, graph and resource-state files
//! - Analysis options (Banker scan order)
//! - Logging level and format
//! - JSON config files and environment variable overrides (`DEADLOCK_*`)
//! - Validation

use crate::detection::ScanOrder;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete analyzer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Where the inputs live
    pub input: InputConfig,

    /// Algorithm options
    pub analysis: AnalysisConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory the file names below are resolved against
    pub base_dir: PathBuf,

    /// File holding the mode token (`banker` or `rag`)
    pub mode_file: PathBuf,

    /// Edge count followed by `from to` pairs
    pub graph_file: PathBuf,

    /// `n m`, allocation, maximum, available
    pub banker_file: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            mode_file: PathBuf::from("mode.txt"),
            graph_file: PathBuf::from("graph.txt"),
            banker_file: PathBuf::from("banker_input.txt"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How the safety check walks the process list
    pub scan_order: ScanOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 2] = ["pretty", "json"];

impl AnalyzerConfig {
    /// Defaults with `DEADLOCK_*` environment overrides applied, validated.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file, then applies environment overrides.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Input
        if let Some(dir) = lookup("DEADLOCK_BASE_DIR") {
            self.input.base_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("DEADLOCK_MODE_FILE") {
            self.input.mode_file = PathBuf::from(file);
        }
        if let Some(file) = lookup("DEADLOCK_GRAPH_FILE") {
            self.input.graph_file = PathBuf::from(file);
        }
        if let Some(file) = lookup("DEADLOCK_BANKER_FILE") {
            self.input.banker_file = PathBuf::from(file);
        }

        // Analysis
        if let Some(order) = lookup("DEADLOCK_SCAN_ORDER") {
            self.analysis.scan_order = order.parse()?;
        }

        // Logging
        if let Some(level) = lookup("DEADLOCK_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(format) = lookup("DEADLOCK_LOG_FORMAT") {
            self.logging.format = format.to_lowercase();
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::ConfigError(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            )));
        }

        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(Error::ConfigError(format!(
                "Invalid log format: {}. Must be one of: {}",
                self.logging.format,
                VALID_FORMATS.join(", ")
            )));
        }

        for (name, file) in [
            ("mode_file", &self.input.mode_file),
            ("graph_file", &self.input.graph_file),
            ("banker_file", &self.input.banker_file),
        ] {
            if file.as_os_str().is_empty() {
                return Err(Error::ConfigError(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }

    pub fn mode_path(&self) -> PathBuf {
        self.input.base_dir.join(&self.input.mode_file)
    }

    pub fn graph_path(&self) -> PathBuf {
        self.input.base_dir.join(&self.input.graph_file)
    }

    pub fn banker_path(&self) -> PathBuf {
        self.input.base_dir.join(&self.input.banker_file)
    }
}

/// Configuration builder for programmatic setup
#[derive(Default)]
pub struct ConfigBuilder {
    config: AnalyzerConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn with_base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input.base_dir = path.into();
        self
    }

    pub fn with_mode_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input.mode_file = path.into();
        self
    }

    pub fn with_graph_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input.graph_file = path.into();
        self
    }

    pub fn with_banker_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input.banker_file = path.into();
        self
    }

    pub fn with_scan_order(mut self, order: ScanOrder) -> Self {
        self.config.analysis.scan_order = order;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_log_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    pub fn build(self) -> Result<AnalyzerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
