//! Client connection state and the data it accumulates.

use std::fmt;

/// Where the client is in the matchmaking flow.
///
/// Variants are declared in flow order and compare that way, so
/// `state < ConnectionState::Connected` means "no usable connection yet".
///
/// ```text
/// None → Disconnected → Connecting → Connected → MatchmakingRequested
///      → MatchmakingConfirmed → MatchFound → JoinInfoReceived
/// ```
///
/// `RequeueRequired` sits between `Connected` and `MatchmakingRequested`:
/// the backend can demand it from any matchmaking state, and the client
/// answers by reconnecting and queueing again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ConnectionState {
    #[default]
    None,
    Disconnected,
    Connecting,
    Connected,
    RequeueRequired,
    MatchmakingRequested,
    MatchmakingConfirmed,
    MatchFound,
    JoinInfoReceived,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::RequeueRequired => "RequeueRequired",
            Self::MatchmakingRequested => "MatchmakingRequested",
            Self::MatchmakingConfirmed => "MatchmakingConfirmed",
            Self::MatchFound => "MatchFound",
            Self::JoinInfoReceived => "JoinInfoReceived",
        };
        f.write_str(name)
    }
}

/// The match the backend put the player in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedMatch {
    pub game_id: String,
    pub uuid: String,
}

/// A queue request remembered until the connection can carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchmakingIntent {
    pub game_id: String,
    pub servers: Vec<String>,
}

impl MatchmakingIntent {
    pub fn new(game_id: impl Into<String>, servers: Vec<String>) -> Self {
        Self {
            game_id: game_id.into(),
            servers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered_by_flow() {
        assert!(ConnectionState::None < ConnectionState::Disconnected);
        assert!(ConnectionState::Connecting < ConnectionState::Connected);
        assert!(ConnectionState::Connected < ConnectionState::RequeueRequired);
        assert!(ConnectionState::RequeueRequired < ConnectionState::MatchmakingRequested);
        assert!(ConnectionState::MatchFound < ConnectionState::JoinInfoReceived);
    }

    #[test]
    fn test_display_uses_variant_name() {
        assert_eq!(ConnectionState::MatchmakingConfirmed.to_string(), "MatchmakingConfirmed");
        assert_eq!(ConnectionState::default().to_string(), "None");
    }
}
