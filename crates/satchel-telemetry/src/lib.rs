//! Logging setup for Satchel.
//!
//! The pipeline crates emit `tracing` events (a debug event per request with
//! `request_id`, `status` and `elapsed`, warnings when a body cannot be
//! enveloped). This crate installs the subscriber that formats them:
//!
//! - **JSON** output for production
//! - **Pretty** output with file/line for development
//! - Filtering via `EnvFilter` directives
//!
//! # Example
//!
//! ```rust,no_run
//! use satchel_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production()).expect("logging already initialized");
//! ```

#![doc(html_root_url = "https://docs.rs/satchel-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
