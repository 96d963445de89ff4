//! Session plumbing shared by the Idem client and server roles.
//!
//! - [`IdemConfig`]: which deployment to talk to and how the server role
//!   behaves on failure.
//! - [`CredentialStore`]: where the join code and server credentials come
//!   from ([`MemoryCredentials`], [`EnvCredentials`]).
//! - [`PlayerIdentity`]: who the local matchmaking player is.
//! - [`Authenticator`]: turns server credentials into a bearer token.
//! - [`Backoff`]: reconnect delays.

#![allow(async_fn_in_trait)]

mod auth;
mod backoff;
mod config;
pub mod credentials;
mod error;
mod identity;

pub use auth::{Authenticator, StaticToken};
pub use backoff::Backoff;
pub use config::{IdemConfig, ServerType};
pub use credentials::{CredentialStore, EnvCredentials, MemoryCredentials};
pub use error::SessionError;
pub use identity::{PlayerIdentity, StaticIdentity};
