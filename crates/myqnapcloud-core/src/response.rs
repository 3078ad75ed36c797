//! Response classification.
//!
//! A response is a success exactly when its status is in `200..=299`. Anything
//! else must carry a JSON error body of the form `{"message": .., "code": ..}`,
//! which becomes an [`ErrorResult`]. An error body that is not JSON is a decode
//! failure, not an API error.

use crate::error::{Error, Result};
use crate::transport::{Body, Method};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Metadata of a completed exchange, returned to callers for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMeta {
    /// Method of the originating request
    pub method: Method,
    /// URL of the originating request
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
}

impl ResponseMeta {
    /// Create response metadata.
    #[must_use]
    pub const fn new(method: Method, url: String, status: u16, headers: HeaderMap) -> Self {
        Self {
            method,
            url,
            status,
            headers,
        }
    }

    /// Returns true if the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        is_success(self.status)
    }
}

/// A structured API failure.
///
/// Only ever built for responses whose status falls outside `200..=299`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{method} {url}: {status} {message}")]
pub struct ErrorResult {
    /// Human-readable message
    pub message: String,
    /// Application error code
    pub code: i64,
    /// Method of the originating request
    pub method: Method,
    /// URL of the originating request
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Endpoint-specific fields the core does not interpret
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: i64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ErrorResult {
    /// Create an error result for the given response.
    pub fn new(meta: &ResponseMeta, message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
            method: meta.method,
            url: meta.url.clone(),
            status: meta.status,
            extra: Map::new(),
        }
    }

    /// Decode an error body for the given response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body is not a JSON error object.
    pub fn from_body(meta: &ResponseMeta, body: &[u8]) -> Result<Self> {
        let decoded: ErrorBody = serde_json::from_slice(body).map_err(|err| {
            Error::Decode(format!(
                "Failed to decode error body of {} {} ({}): {err}",
                meta.method, meta.url, meta.status
            ))
        })?;

        Ok(Self {
            extra: decoded.extra,
            ..Self::new(meta, decoded.message, decoded.code)
        })
    }
}

/// Returns true if `status` is in `200..=299`.
#[must_use]
pub const fn is_success(status: u16) -> bool {
    200 <= status && status <= 299
}

/// Check a response for an API error.
///
/// On success the body is handed back untouched. On failure the body is read
/// and decoded into an [`ErrorResult`].
///
/// # Errors
///
/// Returns [`Error::Api`] for a well-formed API error, [`Error::Decode`] if the
/// error body is not valid JSON, or [`Error::Transport`] if the error body
/// cannot be read.
pub async fn check_response(meta: &ResponseMeta, body: Body) -> Result<Body> {
    if meta.is_success() {
        return Ok(body);
    }

    let bytes = body.collect().await?;
    let result = ErrorResult::from_body(meta, &bytes)?;
    debug!(
        status = result.status,
        code = result.code,
        url = %result.url,
        "API returned an error"
    );
    Err(Error::Api(result))
}
