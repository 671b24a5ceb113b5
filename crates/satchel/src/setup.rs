//! Building the pipeline and logging from a loaded [`SatchelConfig`].

use satchel_config::{LogFormat, LoggingConfig, SatchelConfig};
use satchel_core::{EnvelopeBuilder, KeyMutator};
use satchel_middleware::stages::{RequestNormalizerMiddleware, ResponseEnvelopeMiddleware};
use satchel_middleware::Pipeline;
use satchel_telemetry::{init_logging, LogConfig, TelemetryResult};

/// Builds the envelope stage described by `config.response`.
#[must_use]
pub fn envelope_from_config(config: &SatchelConfig) -> ResponseEnvelopeMiddleware {
    let response = &config.response;
    let builder = EnvelopeBuilder::new(response.envelope_options())
        .with_mutator(KeyMutator::from_case(response.key_case));

    ResponseEnvelopeMiddleware::new(builder)
        .handle_kinds(response.handle.iter().copied())
        .fatal_statuses(response.fatal_statuses.iter().copied())
}

/// Builds the normalizer stage described by `config.request`.
#[must_use]
pub fn normalizer_from_config(config: &SatchelConfig) -> RequestNormalizerMiddleware {
    RequestNormalizerMiddleware::new(KeyMutator::from_case(config.request.effective_case()))
}

/// Builds the standard two-stage pipeline from configuration.
///
/// Hooks are not part of the configuration; install them on the stages and
/// use [`Pipeline::standard`] directly when they are needed.
///
/// # Example
///
/// ```
/// use satchel::config::SatchelConfig;
///
/// let pipeline = satchel::pipeline_from_config(&SatchelConfig::default());
/// assert_eq!(pipeline.stage_names(), ["response_envelope", "request_normalizer"]);
/// ```
#[must_use]
pub fn pipeline_from_config(config: &SatchelConfig) -> Pipeline {
    Pipeline::standard(envelope_from_config(config), normalizer_from_config(config))
}

/// Maps the logging section onto the subscriber settings.
#[must_use]
pub fn log_config(logging: &LoggingConfig) -> LogConfig {
    let base = match logging.format {
        LogFormat::Json => LogConfig::production(),
        LogFormat::Pretty => LogConfig::development(),
    };

    LogConfig {
        enabled: logging.enabled,
        level: logging.level.clone(),
        file_line_info: logging.include_location,
        ..base
    }
}

/// Installs the global log subscriber described by `config.logging`.
///
/// # Errors
///
/// Returns `TelemetryError` if the level directive is invalid or a global
/// subscriber is already installed.
pub fn init_from_config(config: &SatchelConfig) -> TelemetryResult<()> {
    init_logging(&log_config(&config.logging))
}
