//! Service configuration.
//!
//! A [`ServiceConfig`] names the API origin and version every request is
//! resolved against. It is created once per client and, apart from the debug
//! flag that the dispatcher mirrors, never changes afterwards.

use crate::Error;
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

/// Default myQNAPcloud account API origin.
pub const DEFAULT_BASE_PATH: &str = "https://core.api.myqnapcloud.com";

/// API version spoken by this client.
pub const API_VERSION: &str = "v1.1";

/// Configuration for a myQNAPcloud API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ServiceConfig {
    /// API origin plus optional prefix (e.g. `https://core.api.myqnapcloud.com`)
    #[validate(url)]
    pub base_path: String,

    /// API version tag used to build the `/{version}/` path prefix
    #[validate(length(min = 1))]
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Optional additional User-Agent fragment.
    ///
    /// Stored for callers that want to report it; outgoing requests do not
    /// carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Log request and response descriptions during API calls
    #[serde(default)]
    pub debug: bool,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

impl ServiceConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `base_path` - API origin and prefix (e.g., `https://core.api.myqnapcloud.com`)
    /// * `api_version` - version tag (e.g., "v1.1")
    ///
    /// # Errors
    ///
    /// Returns an error if the base path is not a URL or the version is empty.
    pub fn new(base_path: impl Into<String>, api_version: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_path: base_path.into(),
            api_version: api_version.into(),
            user_agent: None,
            debug: false,
        };

        config.validate()?;

        Ok(config)
    }

    /// Set the User-Agent fragment.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Enable or disable debug logging of API calls.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Parse and validate the base path.
    ///
    /// # Errors
    ///
    /// Returns an error if the base path cannot be parsed.
    pub fn parse_base_path(&self) -> Result<Url, Error> {
        Url::parse(&self.base_path)
            .map_err(|e| Error::ConfigError(format!("Invalid base path: {e}")))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            api_version: default_api_version(),
            user_agent: None,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_new() {
        let config = ServiceConfig::new("https://api.example.com", "v1.1").unwrap();
        assert_eq!(config.base_path, "https://api.example.com");
        assert_eq!(config.api_version, "v1.1");
        assert!(config.user_agent.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn test_service_config_invalid_base_path() {
        let result = ServiceConfig::new("not-a-url", "v1.1");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_service_config_empty_version() {
        let result = ServiceConfig::new("https://api.example.com", "");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_service_config_builder() {
        let config = ServiceConfig::new("https://api.example.com", "v2")
            .unwrap()
            .with_user_agent("my-app/1.0")
            .with_debug(true);

        assert_eq!(config.user_agent.as_deref(), Some("my-app/1.0"));
        assert!(config.debug);
    }

    #[test]
    fn test_service_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_path, DEFAULT_BASE_PATH);
        assert_eq!(config.api_version, API_VERSION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_base_path() {
        let config = ServiceConfig::new("http://localhost:8080/api", "v1.1").unwrap();
        let url = config.parse_base_path().unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8080));
        assert_eq!(url.path(), "/api");
    }

    #[test]
    fn test_config_serialization() {
        let config = ServiceConfig::new("https://api.example.com", "v1.1")
            .unwrap()
            .with_user_agent("agent");

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ServiceConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"base_path":"https://api.example.com"}"#).unwrap();

        assert_eq!(config.api_version, API_VERSION);
        assert!(config.user_agent.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn test_config_user_agent_omitted_when_unset() {
        let json = serde_json::to_string(&ServiceConfig::default()).unwrap();
        assert!(!json.contains("user_agent"));
    }
}
