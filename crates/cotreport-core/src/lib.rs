//! # cotreport Core
//!
//! Error handling and configuration shared by the cotreport crates.
//!
//! - **Errors**: `thiserror` types for connection and configuration failures.
//! - **Configuration**: YAML files with environment variable overrides and
//!   validation; every key has a default so an empty file is a valid config.
//!
//! ## Example
//!
//! ```
//! use cotreport_core::config::ReporterConfig;
//!
//! let config = ReporterConfig::default();
//! assert_eq!(config.server_address(), "127.0.0.1:8087");
//! ```

pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use config::ReporterConfig;
pub use error::{ConfigError, ConnectionError, ReporterError, Result};
