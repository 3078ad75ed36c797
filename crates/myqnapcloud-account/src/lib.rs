//! myQNAPcloud account API client.
//!
//! Typed façades over the shared dispatcher for the signed-in user's profile,
//! activity, password and avatar, plus the friend and user directories.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{AccountClient, AccountClientBuilder, AvatarService, MeService, Resource};
pub use models::{ApiEnvelope, GetUserResponse, StatusResponse, UserProfile};

/// Convenient result alias that reuses the shared myQNAPcloud error type.
pub type Result<T> = myqnapcloud_core::Result<T>;
