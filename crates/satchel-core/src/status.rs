//! Status code registry.
//!
//! Maps numeric HTTP status codes to their reason phrase and derives the
//! `success`/`error` classification carried in every envelope.
//!
//! The table covers the IANA registry plus the WebDAV and vendor extension
//! codes commonly seen behind proxies (Nginx 444/494-499, Microsoft 449-450,
//! Apache 509, the 598/599 network timeouts).

use crate::error::{SatchelError, SatchelResult};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason phrase returned for codes the registry does not know.
pub const UNKNOWN_REASON: &str = "Unknown";

/// Returns the canonical reason phrase for a status code.
///
/// Unrecognised codes yield [`UNKNOWN_REASON`].
///
/// # Example
///
/// ```
/// use satchel_core::status::reason_phrase;
///
/// assert_eq!(reason_phrase(200), "OK");
/// assert_eq!(reason_phrase(422), "Unprocessable Entity");
/// assert_eq!(reason_phrase(299), "Unknown");
/// ```
#[must_use]
pub const fn reason_phrase(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        306 => "Switch Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        419 => "Authentication Timeout",
        420 => "Method Failure",
        421 => "Misdirected Request",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Unordered Collection",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        444 => "No Response",
        449 => "Retry With",
        450 => "Blocked by Windows Parental Controls",
        451 => "Unavailable For Legal Reasons",
        494 => "Request Header Too Large",
        495 => "Cert Error",
        496 => "No Cert",
        497 => "HTTP to HTTPS",
        498 => "Token Expired",
        499 => "Client Closed Request",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        509 => "Bandwidth Limit Exceeded",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        598 => "Network read timeout error",
        599 => "Network connect timeout error",
        _ => UNKNOWN_REASON,
    }
}

/// Returns true for codes in the 200-299 range.
#[must_use]
pub const fn is_success_range(code: u16) -> bool {
    code >= 200 && code <= 299
}

/// Converts a numeric code into an HTTP status.
///
/// # Errors
///
/// Returns [`SatchelError::InvalidStatus`] outside 100-999.
pub fn status_code(code: u16) -> SatchelResult<StatusCode> {
    StatusCode::from_u16(code).map_err(|_| SatchelError::InvalidStatus(code))
}

/// Outcome classification carried in `meta.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// Any code outside the 4xx and 5xx classes.
    Success,
    /// A 4xx or 5xx code.
    Error,
}

impl ResponseStatus {
    /// Derives the status from a numeric code.
    ///
    /// # Example
    ///
    /// ```
    /// use satchel_core::status::ResponseStatus;
    ///
    /// assert_eq!(ResponseStatus::from_code(201), ResponseStatus::Success);
    /// assert_eq!(ResponseStatus::from_code(302), ResponseStatus::Success);
    /// assert_eq!(ResponseStatus::from_code(404), ResponseStatus::Error);
    /// ```
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code / 100 {
            4 | 5 => Self::Error,
            _ => Self::Success,
        }
    }

    /// Returns the wire form of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Returns true for [`ResponseStatus::Error`].
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_common_phrases() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(201), "Created");
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(422), "Unprocessable Entity");
        assert_eq!(reason_phrase(500), "Internal Server Error");
    }

    #[test]
    fn test_vendor_extension_phrases() {
        for code in [419, 444, 449, 450, 451, 494, 495, 496, 497, 498, 499, 509] {
            assert_ne!(reason_phrase(code), UNKNOWN_REASON, "expected {code} to be registered");
        }
        assert_eq!(reason_phrase(451), "Unavailable For Legal Reasons");
        assert_eq!(reason_phrase(424), "Failed Dependency");
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(reason_phrase(0), UNKNOWN_REASON);
        assert_eq!(reason_phrase(299), UNKNOWN_REASON);
        assert_eq!(reason_phrase(600), UNKNOWN_REASON);
        assert_eq!(reason_phrase(427), UNKNOWN_REASON);
    }

    #[test]
    fn test_success_range() {
        assert!(is_success_range(200));
        assert!(is_success_range(299));
        assert!(!is_success_range(199));
        assert!(!is_success_range(300));
    }

    #[test]
    fn test_status_code_conversion() {
        assert_eq!(status_code(422).unwrap(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(status_code(42), Err(SatchelError::InvalidStatus(42))));
        assert!(status_code(1000).is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ResponseStatus::Success.to_string(), "success");
        assert_eq!(ResponseStatus::Error.to_string(), "error");
        assert_eq!(
            serde_json::to_value(ResponseStatus::Error).unwrap(),
            serde_json::json!("error")
        );
    }

    proptest! {
        #[test]
        fn prop_status_is_error_iff_4xx_or_5xx(code in 0u16..1000) {
            let class = code / 100;
            prop_assert_eq!(
                ResponseStatus::from_code(code).is_error(),
                class == 4 || class == 5
            );
        }

        #[test]
        fn prop_known_codes_have_non_empty_phrase(code in 100u16..600) {
            let phrase = reason_phrase(code);
            prop_assert!(!phrase.is_empty());
        }
    }
}
