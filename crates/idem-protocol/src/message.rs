//! Inbound messages and the decode table.
//!
//! Decoding is two-phase: read the frame's [`Envelope`] to learn its
//! `action`, then parse the whole frame again as the payload type the
//! action selects. `joinInfo` adds a third phase keyed on `providerName`.
//!
//! The table is a plain `match`. An action that isn't listed is an error
//! from [`try_decode`] and `None` from [`decode`].

use serde::de::DeserializeOwned;

use crate::types::*;
use crate::{Codec, JsonCodec, ProtocolError};

/// Action names used on the wire.
pub mod action {
    pub const ADD_PLAYER: &str = "addPlayer";
    pub const ADD_PLAYER_RESPONSE: &str = "addPlayerResponse";
    pub const REMOVE_PLAYER: &str = "removePlayer";
    pub const REMOVE_PLAYER_RESPONSE: &str = "removePlayerResponse";
    pub const GET_PLAYERS: &str = "getPlayers";
    pub const GET_PLAYERS_RESPONSE: &str = "getPlayersResponse";
    pub const GET_MATCHES: &str = "getMatches";
    pub const GET_MATCHES_RESPONSE: &str = "getMatchesResponse";
    pub const UPDATE_MATCH_CONFIRMED: &str = "updateMatchConfirmed";
    pub const UPDATE_MATCH_CONFIRMED_RESPONSE: &str = "updateMatchConfirmedResponse";
    pub const UPDATE_MATCH_FAILED: &str = "updateMatchFailed";
    pub const UPDATE_MATCH_FAILED_RESPONSE: &str = "updateMatchFailedResponse";
    pub const UPDATE_MATCH_COMPLETED: &str = "updateMatchCompleted";
    pub const UPDATE_MATCH_COMPLETED_RESPONSE: &str = "updateMatchCompletedResponse";
    pub const MATCH_SUGGESTION: &str = "matchSuggestion";
    pub const SUBSCRIBE: &str = "subscribe";
    pub const SUBSCRIBE_RESPONSE: &str = "subscribeResponse";
    pub const JOIN_INFO: &str = "joinInfo";
    pub const MATCH_FOUND: &str = "matchFound";
    pub const REQUEUE_REQUIRED: &str = "requeueRequired";
    pub const KEEP_ALIVE: &str = "keepAlive";
}

/// Provider names recognized inside `joinInfo`.
pub mod provider {
    pub const HATHORA: &str = "hathora";
    pub const I3D: &str = "i3d";
    pub const EDGEGAP: &str = "edgegap";
    pub const GAMEYE: &str = "gameye";
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    AddPlayerResponse(Frame<AddPlayerResponsePayload>),
    RemovePlayerResponse(Frame<RemovePlayerResponsePayload>),
    GetPlayersResponse(Frame<GetPlayersResponsePayload>),
    GetMatchesResponse(Frame<GetMatchesResponsePayload>),
    ConfirmMatchResponse(Frame<MatchIdPayload>),
    FailMatchResponse(Frame<FailMatchResponsePayload>),
    CompleteMatchResponse(Frame<CompleteMatchResponsePayload>),
    MatchSuggestion(Frame<MatchSuggestionPayload>),
    SubscribeResponse(Frame<SubscribePayload>),
    JoinInfo(Frame<JoinInfo>),
    MatchFound(Frame<MatchFoundPayload>),
    RequeueRequired(Frame<RequeueRequiredPayload>),
    KeepAlive(Envelope),
}

impl Message {
    /// The envelope this message arrived with.
    pub fn envelope(&self) -> &Envelope {
        match self {
            Self::AddPlayerResponse(f) => &f.envelope,
            Self::RemovePlayerResponse(f) => &f.envelope,
            Self::GetPlayersResponse(f) => &f.envelope,
            Self::GetMatchesResponse(f) => &f.envelope,
            Self::ConfirmMatchResponse(f) => &f.envelope,
            Self::FailMatchResponse(f) => &f.envelope,
            Self::CompleteMatchResponse(f) => &f.envelope,
            Self::MatchSuggestion(f) => &f.envelope,
            Self::SubscribeResponse(f) => &f.envelope,
            Self::JoinInfo(f) => &f.envelope,
            Self::MatchFound(f) => &f.envelope,
            Self::RequeueRequired(f) => &f.envelope,
            Self::KeepAlive(envelope) => envelope,
        }
    }

    pub fn action(&self) -> &str {
        &self.envelope().action
    }

    /// The backend-reported error, if this is an error response.
    pub fn error(&self) -> Option<&WireError> {
        self.envelope().error.as_ref()
    }

    pub fn join_info(&self) -> Option<&JoinInfo> {
        match self {
            Self::JoinInfo(frame) => Some(&frame.payload),
            _ => None,
        }
    }

    pub fn is_keep_alive(&self) -> bool {
        matches!(self, Self::KeepAlive(_))
    }
}

fn frame<C: Codec, P: DeserializeOwned + Default>(
    codec: &C,
    data: &[u8],
) -> Result<Frame<P>, ProtocolError> {
    codec.decode(data)
}

fn decode_join_info<C: Codec>(codec: &C, data: &[u8]) -> Result<Message, ProtocolError> {
    let base: Frame<BaseJoinInfo> = frame(codec, data)?;
    let envelope = base.envelope.clone();

    let info = match base.payload.provider_name.as_str() {
        provider::HATHORA => JoinInfo::Hathora(frame(codec, data)?.payload),
        provider::I3D => JoinInfo::I3d(frame(codec, data)?.payload),
        provider::EDGEGAP => JoinInfo::Edgegap(frame(codec, data)?.payload),
        provider::GAMEYE => JoinInfo::Gameye(frame(codec, data)?.payload),
        _ => JoinInfo::Base(base.payload),
    };

    Ok(Message::JoinInfo(Frame {
        envelope,
        payload: info,
    }))
}

/// Decodes a JSON text frame, reporting why it could not be decoded.
///
/// # Errors
/// - [`ProtocolError::Decode`] if the text is not JSON, has no `action`,
///   or doesn't match the shape its action selects.
/// - [`ProtocolError::UnknownAction`] if the action has no table entry.
pub fn try_decode(text: &str) -> Result<Message, ProtocolError> {
    try_decode_with(&JsonCodec, text.as_bytes())
}

/// Runs the decode table with `codec` parsing each phase.
///
/// Every phase re-reads the whole frame, so the codec sees `data` once
/// for the envelope and once per payload shape tried.
///
/// # Errors
/// As [`try_decode`], with decode errors coming from `codec`.
pub fn try_decode_with<C: Codec>(codec: &C, data: &[u8]) -> Result<Message, ProtocolError> {
    let envelope: Envelope = codec.decode(data)?;

    let message = match envelope.action.as_str() {
        action::ADD_PLAYER_RESPONSE => Message::AddPlayerResponse(frame(codec, data)?),
        action::REMOVE_PLAYER_RESPONSE => Message::RemovePlayerResponse(frame(codec, data)?),
        action::GET_PLAYERS_RESPONSE => Message::GetPlayersResponse(frame(codec, data)?),
        action::GET_MATCHES_RESPONSE => Message::GetMatchesResponse(frame(codec, data)?),
        action::UPDATE_MATCH_CONFIRMED_RESPONSE => {
            Message::ConfirmMatchResponse(frame(codec, data)?)
        }
        action::UPDATE_MATCH_FAILED_RESPONSE => Message::FailMatchResponse(frame(codec, data)?),
        action::UPDATE_MATCH_COMPLETED_RESPONSE => {
            Message::CompleteMatchResponse(frame(codec, data)?)
        }
        action::MATCH_SUGGESTION => Message::MatchSuggestion(frame(codec, data)?),
        action::SUBSCRIBE_RESPONSE => Message::SubscribeResponse(frame(codec, data)?),
        action::JOIN_INFO => decode_join_info(codec, data)?,
        action::MATCH_FOUND => Message::MatchFound(frame(codec, data)?),
        action::REQUEUE_REQUIRED => Message::RequeueRequired(frame(codec, data)?),
        action::KEEP_ALIVE => Message::KeepAlive(envelope),
        _ => return Err(ProtocolError::UnknownAction(envelope.action)),
    };
    Ok(message)
}

/// Decodes a frame. Returns `None` for anything [`try_decode`] rejects.
pub fn decode(text: &str) -> Option<Message> {
    try_decode(text).ok()
}
