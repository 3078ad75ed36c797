//! Destinations for successful response bodies.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::io::Write;

/// A value that can be replaced by the JSON decoding of a response body.
///
/// Implemented for every [`DeserializeOwned`] type; the target is only
/// overwritten once the whole body has parsed.
pub trait DecodeJson {
    /// Decode `body` and store the result in `self`.
    ///
    /// # Errors
    ///
    /// Returns the parse error and leaves `self` unchanged.
    fn decode_json(&mut self, body: &[u8]) -> serde_json::Result<()>;
}

impl<T: DeserializeOwned> DecodeJson for T {
    fn decode_json(&mut self, body: &[u8]) -> serde_json::Result<()> {
        *self = serde_json::from_slice(body)?;
        Ok(())
    }
}

/// Where the body of a successful response goes.
pub enum Destination<'a> {
    /// Decode the body as JSON into the target
    Json(&'a mut (dyn DecodeJson + Send)),
    /// Copy the body bytes verbatim, without parsing
    Raw(&'a mut (dyn Write + Send)),
}

impl<'a> Destination<'a> {
    /// Decode the body into `target`.
    pub fn json<T>(target: &'a mut T) -> Self
    where
        T: DeserializeOwned + Send,
    {
        Self::Json(target)
    }

    /// Copy the raw body into `sink`.
    pub fn raw<W>(sink: &'a mut W) -> Self
    where
        W: Write + Send,
    {
        Self::Raw(sink)
    }

    /// Deliver a successful body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body does not decode, or the sink
    /// refuses the bytes.
    pub fn deliver(self, body: &[u8]) -> Result<()> {
        match self {
            Self::Json(target) => target
                .decode_json(body)
                .map_err(|err| Error::Decode(err.to_string())),
            Self::Raw(sink) => sink
                .write_all(body)
                .and_then(|()| sink.flush())
                .map_err(|err| Error::Decode(format!("Failed to write response body: {err}"))),
        }
    }
}

impl fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(_) => f.write_str("Destination::Json"),
            Self::Raw(_) => f.write_str("Destination::Raw"),
        }
    }
}
