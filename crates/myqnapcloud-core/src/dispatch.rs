//! Request dispatch.
//!
//! [`ServiceClient`] is the single path every resource call takes: build the
//! request, hand it to the transport, classify the response, then decode or
//! copy the body into the caller's destination. It keeps no per-call state, so
//! one client can serve any number of concurrent calls.

use crate::client::ClientConfig;
use crate::config::ServiceConfig;
use crate::destination::Destination;
use crate::error::{Error, Result};
use crate::request::RequestBuilder;
use crate::response::{check_response, ResponseMeta};
use crate::transport::{Body, HttpTransport, Method, ReqwestTransport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Dispatches API calls through a transport.
pub struct ServiceClient {
    transport: Arc<dyn HttpTransport>,
    config: ServiceConfig,
    requests: RequestBuilder,
    debug: AtomicBool,
}

impl ServiceClient {
    /// Create a client over a caller-supplied transport.
    #[must_use]
    pub fn new(config: ServiceConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            requests: RequestBuilder::new(&config),
            debug: AtomicBool::new(config.debug),
            config,
        }
    }

    /// Create a client over the default reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn with_default_transport(config: ServiceConfig, http_config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(http_config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// The configuration this client was built with.
    ///
    /// The `debug` field reflects construction time; see [`Self::debug`].
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The request builder bound to this client's base path and version.
    #[must_use]
    pub const fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    /// Whether request and response descriptions are logged.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Toggle debug logging; takes effect for calls started afterwards.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// GET `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub async fn get(&self, path: &str, destination: Option<Destination<'_>>) -> Result<ResponseMeta> {
        self.execute::<()>(Method::Get, path, None, destination).await
    }

    /// POST `payload` to `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub async fn post<P>(
        &self,
        path: &str,
        payload: Option<&P>,
        destination: Option<Destination<'_>>,
    ) -> Result<ResponseMeta>
    where
        P: Serialize + Sync + ?Sized,
    {
        self.execute(Method::Post, path, payload, destination).await
    }

    /// PUT `payload` to `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub async fn put<P>(
        &self,
        path: &str,
        payload: Option<&P>,
        destination: Option<Destination<'_>>,
    ) -> Result<ResponseMeta>
    where
        P: Serialize + Sync + ?Sized,
    {
        self.execute(Method::Put, path, payload, destination).await
    }

    /// PATCH `path` with `payload`.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub async fn patch<P>(
        &self,
        path: &str,
        payload: Option<&P>,
        destination: Option<Destination<'_>>,
    ) -> Result<ResponseMeta>
    where
        P: Serialize + Sync + ?Sized,
    {
        self.execute(Method::Patch, path, payload, destination).await
    }

    /// DELETE `path`, optionally with a payload.
    ///
    /// # Errors
    ///
    /// See [`Self::execute`].
    pub async fn delete<P>(
        &self,
        path: &str,
        payload: Option<&P>,
        destination: Option<Destination<'_>>,
    ) -> Result<ResponseMeta>
    where
        P: Serialize + Sync + ?Sized,
    {
        self.execute(Method::Delete, path, payload, destination).await
    }

    /// Send one request and deliver a successful body to `destination`.
    ///
    /// Without a destination the body of a successful response is discarded.
    ///
    /// # Errors
    ///
    /// - [`Error::Encoding`] if the payload cannot be serialized (nothing is sent)
    /// - [`Error::Transport`] if the transport fails
    /// - [`Error::Api`] if the status is outside `200..=299`
    /// - [`Error::Decode`] if a body cannot be decoded
    ///
    /// The destination is left untouched on every error.
    pub async fn execute<P>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&P>,
        destination: Option<Destination<'_>>,
    ) -> Result<ResponseMeta>
    where
        P: Serialize + Sync + ?Sized,
    {
        let (meta, body) = self.send(method, path, payload).await?;

        if let Some(destination) = destination {
            let bytes = body.collect().await?;
            destination.deliver(&bytes)?;
        }

        Ok(meta)
    }

    /// Send one request and decode a successful body as `R`.
    ///
    /// This is the helper resource façades are built on.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute`].
    pub async fn call<P, R>(&self, method: Method, path: &str, payload: Option<&P>) -> Result<R>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let (meta, body) = self.send(method, path, payload).await?;
        let bytes = body.collect().await?;

        serde_json::from_slice(&bytes).map_err(|err| {
            Error::Decode(format!(
                "Failed to decode response of {} {}: {err}",
                meta.method, meta.url
            ))
        })
    }

    async fn send<P>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&P>,
    ) -> Result<(ResponseMeta, Body)>
    where
        P: Serialize + Sync + ?Sized,
    {
        let request = self.requests.build(method, path, payload)?;
        let url = request.url.clone();

        if self.debug() {
            debug!(
                method = %request.method,
                url = %request.url,
                headers = ?request.headers,
                body_len = request.body.as_ref().map_or(0, bytes::Bytes::len),
                "Executing request"
            );
        }

        let response = self.transport.execute(request).await.map_err(|err| {
            warn!(%method, %url, error = %err, "Transport failed");
            Error::Transport(err)
        })?;

        let meta = ResponseMeta::new(method, url, response.status, response.headers);

        if self.debug() {
            debug!(
                status = meta.status,
                url = %meta.url,
                headers = ?meta.headers,
                "Response received"
            );
        }

        let body = check_response(&meta, response.body).await?;
        Ok((meta, body))
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("config", &self.config)
            .field("debug", &self.debug())
            .finish_non_exhaustive()
    }
}
