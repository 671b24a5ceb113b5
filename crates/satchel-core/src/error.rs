//! Error types for Satchel.

use thiserror::Error;

/// Result type alias using [`SatchelError`].
pub type SatchelResult<T> = Result<T, SatchelError>;

/// Errors raised while classifying payloads or building envelopes.
///
/// None of these reach the client: a stage that hits one passes the original
/// response through unchanged.
#[derive(Error, Debug)]
pub enum SatchelError {
    /// The response body is not a JSON document.
    #[error("payload is not valid JSON: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    /// An envelope or a payload item could not be serialized.
    #[error("failed to serialize envelope: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A status code outside the range `http` accepts.
    #[error("invalid HTTP status code: {0}")]
    InvalidStatus(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_payload_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SatchelError::InvalidPayload(source);
        assert!(err.to_string().starts_with("payload is not valid JSON"));
    }

    #[test]
    fn test_invalid_status_display() {
        let err = SatchelError::InvalidStatus(1000);
        assert_eq!(err.to_string(), "invalid HTTP status code: 1000");
    }
}
