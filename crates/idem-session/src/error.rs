//! Error types for the session layer.

/// Errors raised while configuring or authenticating a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backend rejected the credentials, or issued a blank token.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The identity provider could not be reached. Unlike
    /// [`AuthFailed`](Self::AuthFailed) this is worth retrying.
    #[error("authentication unavailable: {0}")]
    AuthUnavailable(String),

    /// A required key is absent from the credential store.
    #[error("missing credential {0:?}")]
    MissingCredential(&'static str),

    /// A configuration value is unusable (for example a custom server type
    /// without a URL).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
