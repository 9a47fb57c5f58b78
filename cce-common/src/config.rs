//! Configuration management for the Covered Call Engine client.
//!
//! Configuration lives in a single JSON file at `~/.ccengine/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (`CCE_*` prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `CCE_API_BASE_URL` → api.base_url
//! - `CCE_API_TIMEOUT_SECS` → api.timeout_secs
//! - `CCE_LOG_LEVEL` → observability.log_level
//! - `CCE_LOG_FORMAT` → observability.log_format
//! - `CCE_REPORT_DIR` → report.report_dir

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".ccengine"),
        |dirs| dirs.home_dir().join(".ccengine"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// API Configuration
// ============================================================================

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the screener backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    /// Timeouts are delegated to the HTTP client; there is no retry layer.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8742".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" for structured JSON, "pretty" for human-readable
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// ============================================================================
// Report Configuration
// ============================================================================

/// Output configuration for exported scan results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory for exported CSV files. A leading `~` is expanded.
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
        }
    }
}

fn default_report_dir() -> String {
    "~/.ccengine/reports".to_string()
}

impl ReportConfig {
    /// Resolve the report directory with `~` expanded.
    pub fn resolved_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.report_dir).into_owned())
    }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Unified configuration for the screening client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from the default path with env overrides.
    ///
    /// A missing config file is not an error; defaults are used.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply `CCE_*` environment variable overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CCE_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Ok(secs) = std::env::var("CCE_API_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.api.timeout_secs = secs;
            }
        }
        if let Ok(level) = std::env::var("CCE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("CCE_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Ok(dir) = std::env::var("CCE_REPORT_DIR") {
            self.report.report_dir = dir;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
