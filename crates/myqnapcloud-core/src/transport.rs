//! Transport adapter abstraction and the default reqwest-backed adapter.
//!
//! The dispatcher never talks to the network directly. It hands a fully built
//! [`HttpRequest`] to an [`HttpTransport`] and receives an [`HttpResponse`]
//! whose body may still be streaming. Credentials, TLS, proxies and timeouts
//! are the adapter's business.

use crate::client::ClientConfig;
use crate::error::{Error, Result, TransportError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::pin::Pin;
use tracing::debug;

const USER_AGENT: &str = concat!("myqnapcloud-rust/", env!("CARGO_PKG_VERSION"));

/// HTTP methods supported by the myQNAPcloud API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Return the method name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A fully formed request ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute request URL
    pub url: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Encoded JSON payload, if any
    pub body: Option<Bytes>,
}

/// Stream of body chunks produced by a transport.
pub type BodyStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, TransportError>> + Send>>;

/// Response body, either already buffered or still streaming.
///
/// Dropping a `Body` releases the underlying connection, whether or not it was
/// read to the end.
pub struct Body {
    inner: BodyInner,
}

enum BodyInner {
    Full(Bytes),
    Stream(BodyStream),
}

impl Body {
    /// An empty body.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            inner: BodyInner::Full(Bytes::new()),
        }
    }

    /// Wrap a stream of chunks.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            inner: BodyInner::Stream(Box::pin(stream)),
        }
    }

    /// Read the body to the end.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if a chunk cannot be read.
    pub async fn collect(self) -> std::result::Result<Bytes, TransportError> {
        match self.inner {
            BodyInner::Full(bytes) => Ok(bytes),
            BodyInner::Stream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            BodyInner::Full(bytes) => f.debug_tuple("Body").field(&bytes.len()).finish(),
            BodyInner::Stream(_) => f.write_str("Body(<stream>)"),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            inner: BodyInner::Full(bytes),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

/// Response returned by a transport.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Body,
}

impl HttpResponse {
    /// Create a response with no headers.
    pub fn new(status: u16, body: impl Into<Body>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Executes HTTP exchanges on behalf of the dispatcher.
///
/// Implementations may attach credentials, configure TLS, or apply their own
/// timeouts. Cancellation is expressed by dropping the returned future.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return the response head with its body.
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Default transport backed by a pooled [`reqwest::Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    bearer_token: Option<SecretString>,
}

impl ReqwestTransport {
    /// Build a transport from the HTTP client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the underlying client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .gzip(config.enable_compression)
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self::from_client(http))
    }

    /// Wrap an existing reqwest client.
    #[must_use]
    pub const fn from_client(http: reqwest::Client) -> Self {
        Self {
            http,
            bearer_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: SecretString) -> Self {
        self.bearer_token = Some(token);
        self
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method.into(), &request.url)
            .headers(request.headers);

        if let Some(token) = &self.bearer_token {
            builder = builder.header(
                AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            );
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        debug!(status, "reqwest transport received response head");

        let stream = response.bytes_stream().map_err(TransportError::from);

        Ok(HttpResponse {
            status,
            headers,
            body: Body::from_stream(stream),
        })
    }
}
