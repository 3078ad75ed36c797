//! Request construction.

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, Method};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

const APPLICATION_JSON: &str = "application/json";

/// Prefix a relative path with the `/{version}/` segment.
///
/// Leading and trailing slashes of `path` are ignored, so `"/me/"` and `"me"`
/// produce the same versioned path.
#[must_use]
pub fn versioned(version: &str, path: &str) -> String {
    format!("/{version}/{}", path.trim_matches('/'))
}

// URL parsing resolves these, including their percent-encoded spellings.
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | "%2e%2e" | ".%2e" | "%2e."
    )
}

/// Builds [`HttpRequest`]s against a configured base path and API version.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_path: String,
    api_version: String,
}

impl RequestBuilder {
    /// Create a builder from the service configuration.
    #[must_use]
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            base_path: config.base_path.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        }
    }

    /// Compose the absolute URL for a relative path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the path contains a `.` or `..`
    /// segment or the composed URL does not parse.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let route = path.split(['?', '#']).next().unwrap_or_default();
        if route.split('/').any(is_dot_segment) {
            return Err(Error::InvalidEndpoint(format!(
                "Invalid path `{path}`: dot segments are not allowed"
            )));
        }

        let raw = format!("{}{}", self.base_path, versioned(&self.api_version, path));
        Url::parse(&raw).map_err(|err| Error::InvalidEndpoint(format!("Invalid path `{path}`: {err}")))
    }

    /// Build a request, encoding `payload` as the JSON body when present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the payload cannot be serialized, or
    /// [`Error::InvalidEndpoint`] if the URL cannot be composed. No I/O has
    /// happened in either case.
    pub fn build<P>(&self, method: Method, path: &str, payload: Option<&P>) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let body = payload
            .map(|payload| serde_json::to_vec(payload).map(Bytes::from))
            .transpose()
            .map_err(|err| Error::Encoding(err.to_string()))?;

        let url = self.url_for(path)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    fn builder(base_path: &str) -> RequestBuilder {
        RequestBuilder::new(&ServiceConfig::new(base_path, "v1.1").unwrap())
    }

    #[test]
    fn test_versioned_trims_slashes() {
        assert_eq!(versioned("v1.1", "/me/"), "/v1.1/me");
        assert_eq!(versioned("v1.1", "me"), "/v1.1/me");
        assert_eq!(versioned("v1.1", "//me/activity//"), "/v1.1/me/activity");
        assert_eq!(versioned("v2", ""), "/v2/");
    }

    #[test]
    fn test_url_for_composes_absolute_url() {
        let builder = builder("https://api.example.com");
        assert_eq!(
            builder.url_for("/me/").unwrap().as_str(),
            "https://api.example.com/v1.1/me"
        );
        assert_eq!(
            builder.url_for("me").unwrap().as_str(),
            "https://api.example.com/v1.1/me"
        );
    }

    #[test]
    fn test_url_for_keeps_base_prefix() {
        let builder = builder("https://api.example.com/account/");
        assert_eq!(
            builder.url_for("me").unwrap().as_str(),
            "https://api.example.com/account/v1.1/me"
        );
    }

    #[test]
    fn test_url_for_rejects_dot_segments() {
        let builder = builder("https://api.example.com");
        for path in ["../admin", "users/../../x", "./me", "me/..", "%2e%2e/admin", "me/.%2E"] {
            let err = builder.url_for(path).unwrap_err();
            assert!(matches!(err, Error::InvalidEndpoint(_)), "{path}");
        }
    }

    #[test]
    fn test_url_for_keeps_version_prefix() {
        let builder = builder("https://api.example.com");
        for path in ["me", "users/..hidden", "me/...", "me?x=1", "me?next=../admin"] {
            let url = builder.url_for(path).unwrap();
            assert!(url.path().starts_with("/v1.1/"), "{path} -> {url}");
        }
        assert_eq!(
            builder.url_for("me?x=1").unwrap().as_str(),
            "https://api.example.com/v1.1/me?x=1"
        );
    }

    #[test]
    fn test_build_rejects_dot_segments_before_io() {
        let err = builder("https://api.example.com")
            .build::<()>(Method::Get, "../admin", None)
            .unwrap_err();
        assert!(err.is_local());
    }

    #[test]
    fn test_build_sets_json_headers_without_payload() {
        let request = builder("https://api.example.com")
            .build::<()>(Method::Get, "me", None)
            .unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "https://api.example.com/v1.1/me");
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers[ACCEPT], "application/json");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_build_encodes_payload() {
        let payload = json!({ "display_name": "Ada", "subscribed": true });
        let request = builder("https://api.example.com")
            .build(Method::Patch, "me", Some(&payload))
            .unwrap();

        let body: serde_json::Value = serde_json::from_slice(&request.body.unwrap()).unwrap();
        assert_eq!(body, payload);
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_build_rejects_unserializable_payload() {
        let mut payload = HashMap::new();
        payload.insert(vec![1_u8, 2], "value");

        let err = builder("https://api.example.com")
            .build(Method::Post, "me", Some(&payload))
            .unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Nested {
        enabled: bool,
        count: i64,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        name: String,
        subscribed: bool,
        gender: i32,
        nested: Nested,
    }

    #[test]
    fn test_payload_survives_encoding() {
        let payloads = [
            Payload {
                name: "Grace".to_string(),
                subscribed: false,
                gender: 2,
                nested: Nested {
                    enabled: true,
                    count: -7,
                },
            },
            Payload {
                name: "名前 \"quoted\"".to_string(),
                subscribed: true,
                gender: 0,
                nested: Nested {
                    enabled: false,
                    count: i64::MAX,
                },
            },
        ];

        let builder = builder("https://api.example.com");
        for payload in payloads {
            let request = builder.build(Method::Put, "me", Some(&payload)).unwrap();
            let decoded: Payload = serde_json::from_slice(&request.body.unwrap()).unwrap();
            assert_eq!(decoded, payload);
        }
    }
}
