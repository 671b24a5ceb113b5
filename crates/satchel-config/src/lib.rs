//! Typed configuration system for Satchel.
//!
//! This crate provides a strongly-typed configuration for the envelope and
//! request-normalization pipeline with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides (and `.env` files)
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration is built around [`SatchelConfig`]:
//!
//! - [`ResponseConfig`] - envelope shape, omission rules and the statuses and
//!   response kinds that get wrapped
//! - [`RequestConfig`] - inbound key renaming
//! - [`LoggingConfig`] - log level and format
//!
//! # Example
//!
//! ```no_run
//! use satchel_config::{ConfigLoader, SatchelConfig};
//!
//! # fn main() -> Result<(), satchel_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("satchel.toml")?
//!     .with_env_prefix("SATCHEL")
//!     .load()?;
//!
//! println!("Omitting empty arrays: {}", config.response.omit_empty_array);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [response]
//! include_pagination_links = false
//! omit_empty_object = false
//! omit_empty_array = true
//! omit_data_on_error = false
//! key_case = "camel"
//! fatal_statuses = [500]
//! handle = ["standard", "json"]
//!
//! [response.fields]
//! meta = "meta"
//! data = "data"
//! pagination = "pagination"
//!
//! [request]
//! enabled = true
//! key_case = "snake"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `SATCHEL__RESPONSE__OMIT_EMPTY_ARRAY=false`
//! - `SATCHEL__RESPONSE__FIELDS__DATA=payload`
//! - `SATCHEL__REQUEST__KEY_CASE=snake`
//! - `SATCHEL__LOGGING__LEVEL=debug`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
