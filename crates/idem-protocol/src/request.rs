//! Outbound requests.
//!
//! [`Request`] is internally tagged, so serializing a variant yields
//! `{"action": "...", "payload": {...}}` directly. The free functions are
//! the builders the client and server runtimes use.

use serde::Serialize;

use crate::types::*;
use crate::{Codec, JsonCodec, ProtocolError};

/// A request frame sent to the matchmaking backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    AddPlayer { payload: AddPlayerPayload },
    RemovePlayer { payload: RemovePlayerPayload },
    GetPlayers { payload: GameIdPayload },
    GetMatches { payload: GameIdPayload },
    UpdateMatchConfirmed { payload: MatchIdPayload },
    UpdateMatchFailed { payload: FailMatchPayload },
    UpdateMatchCompleted { payload: MatchResult },
    Subscribe { payload: SubscribePayload },
}

impl Request {
    /// The wire action name of this request.
    pub fn action(&self) -> &'static str {
        use crate::message::action;
        match self {
            Self::AddPlayer { .. } => action::ADD_PLAYER,
            Self::RemovePlayer { .. } => action::REMOVE_PLAYER,
            Self::GetPlayers { .. } => action::GET_PLAYERS,
            Self::GetMatches { .. } => action::GET_MATCHES,
            Self::UpdateMatchConfirmed { .. } => action::UPDATE_MATCH_CONFIRMED,
            Self::UpdateMatchFailed { .. } => action::UPDATE_MATCH_FAILED,
            Self::UpdateMatchCompleted { .. } => action::UPDATE_MATCH_COMPLETED,
            Self::Subscribe { .. } => action::SUBSCRIBE,
        }
    }
}

/// Serializes a request into a text frame.
///
/// # Errors
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode(request: &Request) -> Result<String, ProtocolError> {
    let bytes = encode_with(&JsonCodec, request)?;
    // serde_json only ever produces UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Serializes a request with `codec`.
///
/// # Errors
/// Returns whatever `codec` reports, normally [`ProtocolError::Encode`].
pub fn encode_with<C: Codec>(codec: &C, request: &Request) -> Result<Vec<u8>, ProtocolError> {
    codec.encode(request)
}

/// Puts a single player into matchmaking for `game_id`.
pub fn add_player(game_id: &str, player_id: &str, servers: &[String]) -> Request {
    Request::AddPlayer {
        payload: AddPlayerPayload {
            game_id: game_id.to_owned(),
            party_name: None,
            players: vec![AddPlayerEntry {
                player_id: player_id.to_owned(),
                reference: None,
                servers: servers.to_vec(),
            }],
        },
    }
}

pub fn remove_player(game_id: &str, player_id: &str) -> Request {
    Request::RemovePlayer {
        payload: RemovePlayerPayload {
            game_id: game_id.to_owned(),
            player_id: player_id.to_owned(),
        },
    }
}

pub fn get_players(game_id: &str) -> Request {
    Request::GetPlayers {
        payload: GameIdPayload {
            game_id: game_id.to_owned(),
        },
    }
}

pub fn get_matches(game_id: &str) -> Request {
    Request::GetMatches {
        payload: GameIdPayload {
            game_id: game_id.to_owned(),
        },
    }
}

pub fn confirm_match(game_id: &str, match_id: &str) -> Request {
    Request::UpdateMatchConfirmed {
        payload: MatchIdPayload {
            game_id: game_id.to_owned(),
            match_id: match_id.to_owned(),
        },
    }
}

/// Fails a match, dropping the `remove` players and requeueing the rest.
pub fn fail_match(
    game_id: &str,
    match_id: &str,
    remove: Vec<String>,
    requeue: Vec<String>,
) -> Request {
    Request::UpdateMatchFailed {
        payload: FailMatchPayload {
            game_id: game_id.to_owned(),
            match_id: match_id.to_owned(),
            remove,
            requeue,
        },
    }
}

/// Fails a match because of one player: that player is removed and every
/// other player in `all_players` is requeued.
pub fn fail_match_single(
    game_id: &str,
    match_id: &str,
    failed: &str,
    all_players: &[String],
) -> Request {
    let requeue = all_players
        .iter()
        .filter(|p| p.as_str() != failed)
        .cloned()
        .collect();
    fail_match(game_id, match_id, vec![failed.to_owned()], requeue)
}

pub fn complete_match(result: &MatchResult) -> Request {
    Request::UpdateMatchCompleted {
        payload: result.clone(),
    }
}

/// Subscribes to match suggestions for the given games.
pub fn subscribe(game_ids: Vec<String>, priority: i32, rate_limit: i32) -> Request {
    Request::Subscribe {
        payload: SubscribePayload {
            game_ids,
            priority,
            rate_limit,
        },
    }
}
