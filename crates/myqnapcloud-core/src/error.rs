//! Error types for myQNAPcloud API calls.
//!
//! Every call surfaces exactly one of four failure kinds: the payload could not
//! be encoded, the transport could not complete the exchange, the API answered
//! with a structured error, or a body could not be decoded. Configuration
//! problems are reported separately when a client is constructed.

use crate::response::ErrorResult;
use thiserror::Error;

/// Main error type for myQNAPcloud operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The request payload could not be serialized to JSON; nothing was sent
    #[error("Failed to encode request payload: {0}")]
    Encoding(String),

    /// The transport adapter failed to complete the exchange
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The API answered with a non-2xx status and a structured error body
    #[error(transparent)]
    Api(ErrorResult),

    /// A response body was not valid JSON or did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for myQNAPcloud operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by an [`HttpTransport`](crate::transport::HttpTransport).
///
/// The core never looks inside these beyond forwarding them; the variants only
/// exist so callers can tell a refused connection from a slow one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// The exchange did not complete in time
    #[error("timed out: {0}")]
    Timeout(String),

    /// The response body stream failed part way through
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure (TLS, DNS, protocol)
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Api(_) => "API_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns the structured API error when this is an [`Error::Api`].
    #[must_use]
    pub const fn api_error(&self) -> Option<&ErrorResult> {
        match self {
            Self::Api(result) => Some(result),
            _ => None,
        }
    }

    /// Returns true if the failure happened before any network I/O.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Encoding(_) | Self::ConfigError(_) | Self::InvalidEndpoint(_)
        )
    }
}

impl From<ErrorResult> for Error {
    fn from(result: ErrorResult) -> Self {
        Self::Api(result)
    }
}

// Conversions from external error types
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.into())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(format!("Invalid configuration: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseMeta;
    use crate::transport::Method;

    fn api_error() -> ErrorResult {
        let meta = ResponseMeta::new(
            Method::Get,
            "https://api.example.com/v1.1/me".to_string(),
            404,
            reqwest::header::HeaderMap::new(),
        );
        ErrorResult::new(&meta, "not found", 404)
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::Encoding("test".to_string()).error_code(),
            "ENCODING_ERROR"
        );
        assert_eq!(
            Error::Transport(TransportError::Other("test".to_string())).error_code(),
            "TRANSPORT_ERROR"
        );
        assert_eq!(Error::Api(api_error()).error_code(), "API_ERROR");
        assert_eq!(
            Error::Decode("test".to_string()).error_code(),
            "DECODE_ERROR"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::Transport(TransportError::Connect("refused".to_string()));
        assert_eq!(err.to_string(), "Transport failed: connection failed: refused");

        let err = Error::Api(api_error());
        assert_eq!(
            err.to_string(),
            "GET https://api.example.com/v1.1/me: 404 not found"
        );
    }

    #[test]
    fn test_api_error_accessor() {
        let err = Error::from(api_error());
        let result = err.api_error().unwrap();
        assert_eq!(result.message, "not found");
        assert_eq!(result.code, 404);

        assert!(Error::Decode("bad".to_string()).api_error().is_none());
    }

    #[test]
    fn test_is_local() {
        assert!(Error::Encoding("test".to_string()).is_local());
        assert!(Error::InvalidEndpoint("test".to_string()).is_local());
        assert!(!Error::Decode("test".to_string()).is_local());
        assert!(!Error::Api(api_error()).is_local());
        assert!(!Error::Transport(TransportError::Timeout("slow".to_string())).is_local());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let qnap_err: Error = err.into();
        assert!(matches!(qnap_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_validation_errors() {
        let err = crate::ServiceConfig::new("not-a-url", "v1.1").unwrap_err();
        let Error::ConfigError(message) = err else {
            panic!("expected a configuration error, got {err:?}");
        };
        assert!(message.starts_with("Invalid configuration:"));
        assert!(message.contains("base_path"));
    }

    #[test]
    fn test_from_transport_error() {
        let err: Error = TransportError::Timeout("deadline".to_string()).into();
        assert!(matches!(err, Error::Transport(TransportError::Timeout(_))));
    }

    #[test]
    fn test_error_clone() {
        let err = Error::Decode("test".to_string());
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
