//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use satchel_core::{KeyCase, ResponseKind};

use crate::{ConfigError, LogFormat, SatchelConfig};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (or a preset)
/// 2. Configuration file (TOML or JSON); fields the file omits take their
///    default values
/// 3. Environment variables (`PREFIX__SECTION__KEY`)
///
/// # Example
///
/// ```no_run
/// use satchel_config::ConfigLoader;
///
/// # fn main() -> Result<(), satchel_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("satchel.toml")?
///     .with_env_prefix("SATCHEL")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: SatchelConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SatchelConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = SatchelConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use satchel_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = SatchelConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = SatchelConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        self.config = parse(&content, &extension)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use satchel_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [response]
    ///     include_pagination_links = true
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.response.include_pagination_links);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// With prefix `SATCHEL`:
    /// - `SATCHEL__RESPONSE__OMIT_EMPTY_ARRAY=false`
    /// - `SATCHEL__RESPONSE__FATAL_STATUSES=500,503`
    /// - `SATCHEL__REQUEST__KEY_CASE=snake`
    /// - `SATCHEL__LOGGING__FORMAT=pretty`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the working directory, if there is one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment overrides (if a prefix was set) and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// validation fails.
    pub fn load(mut self) -> Result<SatchelConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_vars(env::vars(), &prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SatchelConfig {
        self.config
    }

    fn apply_env_vars(
        &mut self,
        vars: impl IntoIterator<Item = (String, String)>,
        prefix: &str,
    ) -> Result<(), ConfigError> {
        let scoped = format!("{prefix}__");
        for (key, value) in vars {
            if key.starts_with(&scoped) {
                self.apply_env_var(&key, &value, prefix)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let bool_value = || parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"));
        let response = &mut self.config.response;

        match parts.as_slice() {
            // Response section
            ["RESPONSE", "INCLUDE_PAGINATION_LINKS"] => response.include_pagination_links = bool_value()?,
            ["RESPONSE", "OMIT_EMPTY_OBJECT"] => response.omit_empty_object = bool_value()?,
            ["RESPONSE", "OMIT_EMPTY_ARRAY"] => response.omit_empty_array = bool_value()?,
            ["RESPONSE", "OMIT_DATA_ON_ERROR"] => response.omit_data_on_error = bool_value()?,
            ["RESPONSE", "KEY_CASE"] => response.key_case = parse_case(key, value)?,
            ["RESPONSE", "FATAL_STATUSES"] => {
                response.fatal_statuses = parse_list(value)
                    .map(|s| s.parse::<u16>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected comma-separated status codes"))?;
            }
            ["RESPONSE", "HANDLE"] => {
                response.handle = parse_list(value)
                    .map(|s| {
                        ResponseKind::parse(s).ok_or_else(|| {
                            ConfigError::env_parse_error(
                                key,
                                format!("unknown response kind '{s}'"),
                            )
                        })
                    })
                    .collect::<Result<_, _>>()?;
            }
            ["RESPONSE", "FIELDS", "META"] => response.fields.meta = value.to_string(),
            ["RESPONSE", "FIELDS", "DATA"] => response.fields.data = value.to_string(),
            ["RESPONSE", "FIELDS", "PAGINATION"] => response.fields.pagination = value.to_string(),

            // Request section
            ["REQUEST", "ENABLED"] => self.config.request.enabled = bool_value()?,
            ["REQUEST", "KEY_CASE"] => self.config.request.key_case = parse_case(key, value)?,

            // Logging section
            ["LOGGING", "ENABLED"] => self.config.logging.enabled = bool_value()?,
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => self.config.logging.include_location = bool_value()?,

            _ => tracing::debug!(key, "ignoring unknown configuration variable"),
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<SatchelConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse an optional key case; an empty value or `none` clears it.
fn parse_case(key: &str, value: &str) -> Result<Option<KeyCase>, ConfigError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    KeyCase::parse(value)
        .map(Some)
        .ok_or_else(|| ConfigError::env_parse_error(key, format!("unknown key case '{value}'")))
}

fn parse_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
