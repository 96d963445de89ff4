//! Runtime configuration shared by the client and server roles.

use serde::{Deserialize, Serialize};

use crate::SessionError;

pub const MAIN_CONNECTION_URL: &str = "wss://ws-int.idem.gg";
pub const BETA_CONNECTION_URL: &str = "wss://ws.beta.idem.gg";
pub const MAIN_CLIENT_ID: &str = "3b7bo4gjuqsjuer6eatjsgo58u";
pub const BETA_CLIENT_ID: &str = "3ns1sc0lkrdqh25qvrqb9k3a80";

// ---------------------------------------------------------------------------
// ServerType
// ---------------------------------------------------------------------------

/// Which Idem deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServerType {
    #[default]
    Main,
    Beta,
    /// Use [`IdemConfig::custom_url`] and [`IdemConfig::custom_client_id`].
    Custom,
}

// ---------------------------------------------------------------------------
// IdemConfig
// ---------------------------------------------------------------------------

/// Configuration for an Idem session.
///
/// Every field has a default, so a partial JSON document deserializes into
/// a usable config:
///
/// ```rust
/// use idem_session::{IdemConfig, ServerType};
///
/// let config: IdemConfig =
///     serde_json::from_str(r#"{ "game_id": "2v2", "server_type": "Beta" }"#).unwrap();
/// assert_eq!(config.game_id, "2v2");
/// assert_eq!(config.connection_url(), "wss://ws.beta.idem.gg");
/// assert_eq!(config.max_connect_attempts, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdemConfig {
    /// Game mode to queue for and report results under.
    pub game_id: String,

    pub server_type: ServerType,

    /// Backend URL when `server_type` is `Custom`.
    pub custom_url: String,

    /// OAuth client id when `server_type` is `Custom`.
    pub custom_client_id: String,

    /// Exit the host process on unrecoverable server errors.
    pub quit_on_crit_error: bool,

    /// Exit the host process once the match result is acknowledged.
    pub quit_after_result_reporting: bool,

    /// Reconnect the server role automatically after the connection drops.
    pub auto_restart: bool,

    /// Connection attempts before the server role gives up.
    pub max_connect_attempts: u32,
}

impl Default for IdemConfig {
    fn default() -> Self {
        Self {
            game_id: "1v1".to_owned(),
            server_type: ServerType::Main,
            custom_url: String::new(),
            custom_client_id: String::new(),
            quit_on_crit_error: true,
            quit_after_result_reporting: true,
            auto_restart: true,
            max_connect_attempts: 10,
        }
    }
}

impl IdemConfig {
    pub fn with_game_id(mut self, game_id: impl Into<String>) -> Self {
        self.game_id = game_id.into();
        self
    }

    pub fn with_server_type(mut self, server_type: ServerType) -> Self {
        self.server_type = server_type;
        self
    }

    /// Switches to a custom deployment.
    pub fn with_custom_endpoint(
        mut self,
        url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        self.server_type = ServerType::Custom;
        self.custom_url = url.into();
        self.custom_client_id = client_id.into();
        self
    }

    pub fn with_quit_on_crit_error(mut self, quit: bool) -> Self {
        self.quit_on_crit_error = quit;
        self
    }

    pub fn with_quit_after_result_reporting(mut self, quit: bool) -> Self {
        self.quit_after_result_reporting = quit;
        self
    }

    pub fn with_auto_restart(mut self, auto_restart: bool) -> Self {
        self.auto_restart = auto_restart;
        self
    }

    pub fn with_max_connect_attempts(mut self, attempts: u32) -> Self {
        self.max_connect_attempts = attempts;
        self
    }

    /// Base WebSocket URL of the selected deployment.
    pub fn connection_url(&self) -> &str {
        match self.server_type {
            ServerType::Main => MAIN_CONNECTION_URL,
            ServerType::Beta => BETA_CONNECTION_URL,
            ServerType::Custom => &self.custom_url,
        }
    }

    /// OAuth client id of the selected deployment.
    pub fn client_id(&self) -> &str {
        match self.server_type {
            ServerType::Main => MAIN_CLIENT_ID,
            ServerType::Beta => BETA_CLIENT_ID,
            ServerType::Custom => &self.custom_client_id,
        }
    }

    /// URL a matchmaking client connects to.
    ///
    /// The values are percent-encoded, so a join code may contain `&`,
    /// `+` or spaces.
    pub fn full_client_url(&self, player_id: &str, join_code: &str, authorization: &str) -> String {
        format!(
            "{}/?playerId={}&code={}&authorization={}",
            self.connection_url(),
            encode_query_value(player_id),
            encode_query_value(join_code),
            encode_query_value(authorization),
        )
    }

    /// URL a game server connects to with its bearer `token`.
    pub fn server_url(&self, token: &str) -> String {
        format!(
            "{}?authorization={}",
            self.connection_url(),
            encode_query_value(token)
        )
    }

    /// Checks that the selected deployment is fully specified.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidConfig`] for a blank game id, or a
    /// custom deployment without a URL or client id.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.game_id.trim().is_empty() {
            return Err(SessionError::InvalidConfig("game_id is blank".into()));
        }
        if self.server_type == ServerType::Custom {
            if self.custom_url.trim().is_empty() {
                return Err(SessionError::InvalidConfig(
                    "custom server type requires custom_url".into(),
                ));
            }
            if self.custom_client_id.trim().is_empty() {
                return Err(SessionError::InvalidConfig(
                    "custom server type requires custom_client_id".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Percent-encodes everything but the RFC 3986 unreserved characters.
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
