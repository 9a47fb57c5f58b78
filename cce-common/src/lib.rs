//! CCE Common - Shared configuration, errors, and logging for the Covered
//! Call Engine client.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Error types shared across the pipeline
//! - Logging setup with noise suppression

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ApiConfig, Config, ObservabilityConfig, ReportConfig};
pub use error::{Error, Result};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::logging::init_logging;
}
