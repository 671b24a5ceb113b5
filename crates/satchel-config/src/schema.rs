//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use satchel_core::{EnvelopeOptions, FieldNames, KeyCase, ResponseKind};
use serde::{Deserialize, Serialize};

/// Response envelope section.
///
/// # Example
///
/// ```
/// use satchel_config::ResponseConfig;
///
/// let config = ResponseConfig::default();
/// assert!(config.omit_empty_array);
/// assert_eq!(config.fatal_statuses, vec![500]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResponseConfig {
    /// Emit `pagination.links` for paginated payloads.
    #[serde(default)]
    pub include_pagination_links: bool,

    /// Omit `data` when it is an empty object.
    #[serde(default)]
    pub omit_empty_object: bool,

    /// Omit `data` when it is an empty array.
    #[serde(default = "default_true")]
    pub omit_empty_array: bool,

    /// Omit `data` when the final code is outside 200-299.
    #[serde(default)]
    pub omit_data_on_error: bool,

    /// Case applied to outbound `data` keys; unset keeps keys as they are.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_case: Option<KeyCase>,

    /// Statuses passed through without an envelope.
    #[serde(default = "default_fatal_statuses")]
    pub fatal_statuses: Vec<u16>,

    /// Response kinds that get enveloped.
    #[serde(default = "default_handle")]
    pub handle: Vec<ResponseKind>,

    /// Envelope tag names.
    #[serde(default)]
    pub fields: FieldNames,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            include_pagination_links: false,
            omit_empty_object: false,
            omit_empty_array: true,
            omit_data_on_error: false,
            key_case: None,
            fatal_statuses: default_fatal_statuses(),
            handle: default_handle(),
            fields: FieldNames::default(),
        }
    }
}

impl ResponseConfig {
    /// Returns the envelope builder options of this section.
    #[must_use]
    pub fn envelope_options(&self) -> EnvelopeOptions {
        EnvelopeOptions {
            include_pagination_links: self.include_pagination_links,
            omit_empty_object: self.omit_empty_object,
            omit_empty_array: self.omit_empty_array,
            omit_data_on_error: self.omit_data_on_error,
            fields: self.fields.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fatal_statuses() -> Vec<u16> {
    vec![500]
}

fn default_handle() -> Vec<ResponseKind> {
    vec![ResponseKind::Standard, ResponseKind::Json]
}

/// Request normalization section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RequestConfig {
    /// Rename inbound keys.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Case applied to inbound keys; unset keeps keys as they are.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_case: Option<KeyCase>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_case: None,
        }
    }
}

impl RequestConfig {
    /// Returns the case to apply, or `None` when normalization is off.
    #[must_use]
    pub fn effective_case(&self) -> Option<KeyCase> {
        self.key_case.filter(|_| self.enabled)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable logs (development).
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level filter (e.g. `info`, `satchel=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in log records.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
