//! Main configuration types.
//!
//! This module provides the top-level [`SatchelConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, RequestConfig, ResponseConfig};

/// Complete Satchel configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use satchel_config::SatchelConfig;
///
/// let config = SatchelConfig::default();
/// assert!(config.response.omit_empty_array);
/// assert!(config.request.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SatchelConfig {
    /// Response envelope configuration.
    #[serde(default)]
    pub response: ResponseConfig,

    /// Request normalization configuration.
    #[serde(default)]
    pub request: RequestConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SatchelConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use satchel_config::{ResponseConfig, SatchelConfig};
    ///
    /// let config = SatchelConfig::builder()
    ///     .response(ResponseConfig {
    ///         include_pagination_links: true,
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert!(config.response.include_pagination_links);
    /// ```
    #[must_use]
    pub fn builder() -> SatchelConfigBuilder {
        SatchelConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A fatal status is outside 100-599
    /// - No response kind is handled
    /// - An envelope tag is empty, or `meta` and `data` share a tag
    /// - The log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(status) = self
            .response
            .fatal_statuses
            .iter()
            .find(|status| !(100..=599).contains(*status))
        {
            return Err(ConfigError::invalid_value(
                "response.fatal_statuses",
                format!("{status} is not an HTTP status code"),
            ));
        }

        if self.response.handle.is_empty() {
            return Err(ConfigError::invalid_value(
                "response.handle",
                "at least one response kind must be handled",
            ));
        }

        let fields = &self.response.fields;
        for (name, value) in [
            ("meta", &fields.meta),
            ("data", &fields.data),
            ("pagination", &fields.pagination),
        ] {
            if value.is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("response.fields.{name}"),
                    "must not be empty",
                ));
            }
        }
        if fields.meta == fields.data {
            return Err(ConfigError::invalid_value(
                "response.fields",
                format!("meta and data cannot share the tag {:?}", fields.meta),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty, debug-level logs with file and line
    /// - Pagination links included
    ///
    /// # Example
    ///
    /// ```
    /// use satchel_config::SatchelConfig;
    ///
    /// let config = SatchelConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config.response.include_pagination_links = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON, info-level logs
    /// - `data` omitted from error envelopes
    ///
    /// # Example
    ///
    /// ```
    /// use satchel_config::{LogFormat, SatchelConfig};
    ///
    /// let config = SatchelConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;

        config.response.omit_data_on_error = true;

        config
    }
}

/// Builder for [`SatchelConfig`].
#[derive(Debug, Default)]
pub struct SatchelConfigBuilder {
    response: Option<ResponseConfig>,
    request: Option<RequestConfig>,
    logging: Option<LoggingConfig>,
}

impl SatchelConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response configuration.
    #[must_use]
    pub fn response(mut self, response: ResponseConfig) -> Self {
        self.response = Some(response);
        self
    }

    /// Set the request configuration.
    #[must_use]
    pub fn request(mut self, request: RequestConfig) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> SatchelConfig {
        SatchelConfig {
            response: self.response.unwrap_or_default(),
            request: self.request.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<SatchelConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::{KeyCase, ResponseKind};

    #[test]
    fn test_default_config_is_valid() {
        let config = SatchelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.response.fatal_statuses, vec![500]);
    }

    #[test]
    fn test_builder_all_sections() {
        let config = SatchelConfig::builder()
            .response(ResponseConfig {
                key_case: Some(KeyCase::Camel),
                ..Default::default()
            })
            .request(RequestConfig {
                key_case: Some(KeyCase::Snake),
                ..Default::default()
            })
            .logging(LoggingConfig {
                level: "warn".to_string(),
                ..Default::default()
            })
            .build();

        assert_eq!(config.response.key_case, Some(KeyCase::Camel));
        assert_eq!(config.request.key_case, Some(KeyCase::Snake));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_validate_invalid_fatal_status() {
        let mut config = SatchelConfig::default();
        config.response.fatal_statuses = vec![500, 42];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("response.fatal_statuses"));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_validate_empty_handle() {
        let mut config = SatchelConfig::default();
        config.response.handle.clear();
        assert!(config.validate().is_err());

        config.response.handle = vec![ResponseKind::Json];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_field_names() {
        let mut config = SatchelConfig::default();
        config.response.fields.data = String::new();
        assert!(config.validate().unwrap_err().to_string().contains("response.fields.data"));

        config.response.fields.data = "meta".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_log_level() {
        let mut config = SatchelConfig::default();
        config.logging.level = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_development_preset() {
        let config = SatchelConfig::development();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.include_location);
        assert!(config.response.include_pagination_links);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_preset() {
        let config = SatchelConfig::production();
        assert_eq!(config.logging.level, "info");
        assert!(config.response.omit_data_on_error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_validated_failure() {
        let result = SatchelConfig::builder()
            .response(ResponseConfig {
                fatal_statuses: vec![1000],
                ..Default::default()
            })
            .build_validated();
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SatchelConfig::development();
        let toml = toml::to_string(&config).unwrap();
        let parsed: SatchelConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
            [response]
            omit_empty_array = true

            [server]
            port = 8080
        "#;
        let result: Result<SatchelConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
