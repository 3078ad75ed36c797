//! Account API client and resource façades.

use crate::models::GetUserResponse;
use crate::Result;
use myqnapcloud_core::client::ClientConfig;
use myqnapcloud_core::config::{ServiceConfig, API_VERSION, DEFAULT_BASE_PATH};
use myqnapcloud_core::destination::Destination;
use myqnapcloud_core::response::ResponseMeta;
use myqnapcloud_core::transport::{HttpTransport, Method, ReqwestTransport};
use myqnapcloud_core::ServiceClient;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

const ME_ROOT: &str = "me";
const ACTIVITY_ROOT: &str = "me/activity";
const PASSWORD_ROOT: &str = "me/password";
const AVATAR_ROOT: &str = "me/avatar";
const FRIEND_ROOT: &str = "friends";
const USER_ROOT: &str = "users";

/// Builder for [`AccountClient`].
#[derive(Debug, Clone)]
pub struct AccountClientBuilder {
    base_path: String,
    api_version: String,
    user_agent: Option<String>,
    debug: bool,
    http_config: ClientConfig,
    bearer_token: Option<SecretString>,
}

impl AccountClientBuilder {
    /// Create a builder targeting the public myQNAPcloud account API.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            api_version: API_VERSION.to_string(),
            user_agent: None,
            debug: false,
            http_config: ClientConfig::new(),
            bearer_token: None,
        }
    }

    /// Override the API origin.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Override the API version (defaults to `v1.1`).
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Record a User-Agent fragment in the service configuration.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Log request and response descriptions.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Override the HTTP client configuration of the default transport.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Attach a static access token to every request of the default transport.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(SecretString::from(token.into()));
        self
    }

    fn service_config(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::new(self.base_path.clone(), self.api_version.clone())?
            .with_debug(self.debug);
        config.user_agent.clone_from(&self.user_agent);
        Ok(config)
    }

    /// Build the client over the default reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn build(self) -> Result<AccountClient> {
        let mut transport = ReqwestTransport::new(&self.http_config)?;
        if let Some(token) = self.bearer_token.clone() {
            transport = transport.with_bearer_token(token);
        }
        self.build_with_transport(Arc::new(transport))
    }

    /// Build the client over a caller-supplied transport.
    ///
    /// The HTTP configuration and bearer token of this builder are ignored;
    /// the transport is expected to handle both.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build_with_transport(self, transport: Arc<dyn HttpTransport>) -> Result<AccountClient> {
        let config = self.service_config()?;
        Ok(AccountClient::from_config(config, transport))
    }
}

impl Default for AccountClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the myQNAPcloud account API.
///
/// Cheap to clone; clones share one [`ServiceClient`]. Independently built
/// clients share nothing.
#[derive(Debug, Clone)]
pub struct AccountClient {
    inner: Arc<ServiceClient>,
}

impl AccountClient {
    /// Create a client with the default configuration over `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::from_config(ServiceConfig::default(), transport)
    }

    /// Create a client from an explicit configuration.
    #[must_use]
    pub fn from_config(config: ServiceConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            inner: Arc::new(ServiceClient::new(config, transport)),
        }
    }

    /// Start a builder.
    #[must_use]
    pub fn builder() -> AccountClientBuilder {
        AccountClientBuilder::new()
    }

    /// The dispatcher behind this client.
    #[must_use]
    pub fn service(&self) -> &ServiceClient {
        &self.inner
    }

    /// Toggle debug logging for subsequent calls.
    pub fn set_debug(&self, enabled: bool) {
        self.inner.set_debug(enabled);
    }

    /// The signed-in user.
    #[must_use]
    pub fn me(&self) -> MeService {
        MeService {
            resource: self.resource(ME_ROOT),
        }
    }

    /// Friends of the signed-in user.
    #[must_use]
    pub fn friend(&self) -> Resource {
        self.resource(FRIEND_ROOT)
    }

    /// User directory.
    #[must_use]
    pub fn user(&self) -> Resource {
        self.resource(USER_ROOT)
    }

    fn resource(&self, root: &'static str) -> Resource {
        Resource {
            client: Arc::clone(&self.inner),
            root,
        }
    }
}

/// A resource rooted at a fixed path.
///
/// Every façade call is one of these: pick a method and a path below the
/// root, optionally send a payload, and decode the typed result.
#[derive(Debug, Clone)]
pub struct Resource {
    client: Arc<ServiceClient>,
    root: &'static str,
}

impl Resource {
    /// Path of this resource relative to the versioned API root.
    #[must_use]
    pub const fn root(&self) -> &'static str {
        self.root
    }

    /// Path of `sub_path` below this resource.
    #[must_use]
    pub fn path(&self, sub_path: &str) -> String {
        let sub_path = sub_path.trim_matches('/');
        if sub_path.is_empty() {
            self.root.to_string()
        } else {
            format!("{}/{sub_path}", self.root)
        }
    }

    /// Call `method` on `sub_path` and decode the result as `R`.
    ///
    /// # Errors
    ///
    /// Returns any of the dispatcher's errors.
    pub async fn call<P, R>(&self, method: Method, sub_path: &str, payload: Option<&P>) -> Result<R>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let path = self.path(sub_path);
        debug!(resource = self.root, %method, path = %path, "Calling account resource");
        self.client.call(method, &path, payload).await
    }

    /// Call `method` on `sub_path`, delivering the body to `destination`.
    ///
    /// # Errors
    ///
    /// Returns any of the dispatcher's errors.
    pub async fn execute<P>(
        &self,
        method: Method,
        sub_path: &str,
        payload: Option<&P>,
        destination: Option<Destination<'_>>,
    ) -> Result<ResponseMeta>
    where
        P: Serialize + Sync + ?Sized,
    {
        let path = self.path(sub_path);
        debug!(resource = self.root, %method, path = %path, "Executing account resource call");
        self.client.execute(method, &path, payload, destination).await
    }
}

/// Calls on the signed-in user.
#[derive(Debug, Clone)]
pub struct MeService {
    resource: Resource,
}

impl MeService {
    /// Fetch the profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns any of the dispatcher's errors.
    pub async fn get(&self) -> Result<GetUserResponse> {
        self.resource.call::<(), _>(Method::Get, "", None).await
    }

    /// The underlying `me` resource.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Activity of the signed-in user.
    #[must_use]
    pub fn activity(&self) -> Resource {
        self.child(ACTIVITY_ROOT)
    }

    /// Password of the signed-in user.
    #[must_use]
    pub fn password(&self) -> Resource {
        self.child(PASSWORD_ROOT)
    }

    /// Avatar of the signed-in user.
    #[must_use]
    pub fn avatar(&self) -> AvatarService {
        AvatarService {
            resource: self.child(AVATAR_ROOT),
        }
    }

    fn child(&self, root: &'static str) -> Resource {
        Resource {
            client: Arc::clone(&self.resource.client),
            root,
        }
    }
}

/// Avatar image of the signed-in user.
#[derive(Debug, Clone)]
pub struct AvatarService {
    resource: Resource,
}

impl AvatarService {
    /// Copy the avatar image bytes into `sink` without parsing them.
    ///
    /// # Errors
    ///
    /// Returns any of the dispatcher's errors; `sink` is untouched on failure.
    pub async fn download<W>(&self, sink: &mut W) -> Result<ResponseMeta>
    where
        W: Write + Send,
    {
        self.resource
            .execute::<()>(Method::Get, "", None, Some(Destination::raw(sink)))
            .await
    }

    /// The underlying avatar resource.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }
}
