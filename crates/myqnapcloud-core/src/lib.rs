//! # myqnapcloud-core
//!
//! Request dispatch and error classification shared by myQNAPcloud API clients.
//!
//! Every resource call goes through the same sequence: build a versioned JSON
//! request, execute it through an injected transport, classify the response by
//! status code, then decode (or copy) the body into the caller's destination.
//!
//! ## Modules
//!
//! - [`config`] - Base path, API version and debug settings
//! - [`client`] - HTTP settings for the default transport
//! - [`error`] - Error taxonomy
//! - [`transport`] - Transport adapter trait and the reqwest implementation
//! - [`request`] - Request builder and path versioning
//! - [`response`] - Response classifier and structured API errors
//! - [`destination`] - Destinations for successful bodies
//! - [`dispatch`] - The dispatcher every resource call goes through

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod destination;
pub mod dispatch;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

// Re-export commonly used types
pub use config::ServiceConfig;
pub use destination::Destination;
pub use dispatch::ServiceClient;
pub use error::{Error, Result, TransportError};
pub use response::{ErrorResult, ResponseMeta};
pub use transport::{HttpTransport, Method};
