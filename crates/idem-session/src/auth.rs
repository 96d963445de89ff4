//! Authentication hook for the game server role.
//!
//! Idem does not log in by itself. The server hands the configured
//! username, password and client id to an [`Authenticator`] and expects an
//! opaque bearer token back, which it appends to the connection URL.

use crate::SessionError;

/// Exchanges server credentials for a bearer token.
///
/// # Example
///
/// ```rust
/// use idem_session::{Authenticator, SessionError};
///
/// /// Reads a pre-issued token from the environment.
/// struct EnvToken;
///
/// impl Authenticator for EnvToken {
///     async fn authenticate(
///         &self,
///         _username: &str,
///         _password: &str,
///         _client_id: &str,
///     ) -> Result<String, SessionError> {
///         std::env::var("IDEM_TOKEN")
///             .map_err(|_| SessionError::AuthFailed("IDEM_TOKEN is not set".into()))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Returns a bearer token for the given credentials.
    ///
    /// A blank token counts as a failure.
    ///
    /// # Errors
    /// - [`SessionError::AuthFailed`] when the credentials were rejected.
    /// - [`SessionError::AuthUnavailable`] when the provider couldn't be
    ///   reached; the server treats this as a connection failure.
    fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_id: &str,
    ) -> impl std::future::Future<Output = Result<String, SessionError>> + Send;
}

/// Hands out the same token for any credentials.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl Authenticator for StaticToken {
    async fn authenticate(
        &self,
        _username: &str,
        _password: &str,
        _client_id: &str,
    ) -> Result<String, SessionError> {
        Ok(self.0.clone())
    }
}
