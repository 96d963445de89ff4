//! Who the local player is.

/// Supplies the identity a matchmaking client queues as.
pub trait PlayerIdentity: Send + Sync + 'static {
    /// Id the backend knows the player by.
    fn player_id(&self) -> String;

    /// Value of the `authorization` query parameter on the client URL.
    fn auth_string(&self) -> String {
        "Demo".to_owned()
    }
}

/// A fixed player id with the default authorization string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    player_id: String,
    auth: Option<String>,
}

impl StaticIdentity {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            auth: None,
        }
    }

    /// Overrides the authorization string.
    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }
}

impl PlayerIdentity for StaticIdentity {
    fn player_id(&self) -> String {
        self.player_id.clone()
    }

    fn auth_string(&self) -> String {
        self.auth.clone().unwrap_or_else(|| "Demo".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl PlayerIdentity for Bare {
        fn player_id(&self) -> String {
            "bare".into()
        }
    }

    #[test]
    fn test_auth_string_defaults_to_demo() {
        assert_eq!(Bare.auth_string(), "Demo");
        assert_eq!(StaticIdentity::new("p").auth_string(), "Demo");
    }

    #[test]
    fn test_static_identity_with_auth() {
        let id = StaticIdentity::new("player_3").with_auth("token-x");
        assert_eq!(id.player_id(), "player_3");
        assert_eq!(id.auth_string(), "token-x");
    }
}
