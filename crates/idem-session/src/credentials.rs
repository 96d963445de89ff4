//! Credential lookup.
//!
//! Both roles read secrets by key: the client needs the join code, the
//! server needs the username and password it authenticates with. Where the
//! secrets live is up to the embedding application.

use std::collections::HashMap;

use crate::SessionError;

/// Key of the join code appended to the client URL.
pub const JOIN_CODE: &str = "JoinCode";
/// Key of the game server's Idem username.
pub const USER_NAME: &str = "UserName";
/// Key of the game server's Idem password.
pub const PASSWORD: &str = "Password";

/// A read-only source of named secrets.
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Like [`get`](Self::get) but treats a missing key as an error.
    ///
    /// # Errors
    /// Returns [`SessionError::MissingCredential`] if `key` is absent.
    fn require(&self, key: &'static str) -> Result<String, SessionError> {
        self.get(key).ok_or(SessionError::MissingCredential(key))
    }
}

/// Credentials held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials {
    values: HashMap<String, String>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder-style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl CredentialStore for MemoryCredentials {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Credentials read from environment variables.
///
/// A key is mapped to `{prefix}{KEY}` where `KEY` is the key in
/// SCREAMING_SNAKE_CASE, so with the prefix `IDEM_` the join code is read
/// from `IDEM_JOIN_CODE` and the username from `IDEM_USER_NAME`.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    prefix: String,
}

impl EnvCredentials {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The variable name `key` is read from.
    pub fn variable_name(&self, key: &str) -> String {
        let mut name = self.prefix.clone();
        for (i, c) in key.chars().enumerate() {
            if c.is_uppercase() && i > 0 {
                name.push('_');
            }
            name.extend(c.to_uppercase());
        }
        name
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new("IDEM_")
    }
}

impl CredentialStore for EnvCredentials {
    fn get(&self, key: &str) -> Option<String> {
        let name = self.variable_name(key);
        match std::env::var(&name) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::debug!(variable = %name, "credential not set");
                None
            }
        }
    }
}
