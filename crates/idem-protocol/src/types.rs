//! Payload types for the Idem wire format.
//!
//! Every frame is a JSON object with an `action` discriminator, optional
//! `error` and `messageId` fields ([`Envelope`]), and an action-specific
//! `payload`. [`Frame`] glues the two together.
//!
//! The backend is lenient about omitted fields and sends `null` for empty
//! ones, so payload structs accept both. `#[serde(default)]` on the struct
//! covers a missing field, and [`null_as_default`] on each non-`Option`
//! field turns an explicit `null` into the same empty value. Either way a
//! sparse allocation record still decodes instead of failing the frame.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes `null` as `T::default()`.
///
/// For use with `#[serde(deserialize_with = "null_as_default")]` on a
/// field of a `#[serde(default)]` struct.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// An error reported by the backend inside a response frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WireError {
    #[serde(deserialize_with = "null_as_default")]
    pub code: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

/// The header every frame carries.
///
/// `action` is the sole routing discriminator; `error` and `messageId` are
/// present only on some responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl Envelope {
    /// An envelope with the given action and no error or message id.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }
}

/// A complete frame: the envelope fields flattened next to a typed payload.
///
/// ```text
/// { "action": "matchFound", "messageId": "m-1", "payload": { ... } }
///   └──────────── Envelope ────────────┘        └─── P ───┘
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame<P> {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        bound(deserialize = "P: Deserialize<'de> + Default")
    )]
    pub payload: P,
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// A player as the backend refers to it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// A player with its current matchmaking state (`getPlayers`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: String,
    pub reference: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

/// A team inside a suggested match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    #[serde(deserialize_with = "null_as_default")]
    pub players: Vec<Player>,
}

/// A match as listed by `getMatches` and `matchSuggestion`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Match {
    #[serde(deserialize_with = "null_as_default")]
    pub server: String,
    #[serde(deserialize_with = "null_as_default")]
    pub teams: Vec<Team>,
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,
}

/// Lifetime and seasonal statistics returned after a match completes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerFullStats {
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: String,
    pub reference: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub losses: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub matches_played: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub ranking_delta_last_game: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub ranking_points: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub rating: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub rating_delta_last_game: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub rating_uncertainty: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub season: String,
    #[serde(deserialize_with = "null_as_default")]
    pub season_losses: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub season_matches_played: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub season_wins: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_losses: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_matches_played: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_wins: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub win_ratio: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub wins: i32,
}

// ---------------------------------------------------------------------------
// Match results
// ---------------------------------------------------------------------------

/// One player's score in a finished match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerResult {
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f32,
}

impl PlayerResult {
    pub fn new(player_id: impl Into<String>, score: f32) -> Self {
        Self {
            player_id: player_id.into(),
            score,
        }
    }
}

/// A team's placement in a finished match. Rank 0 is first place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamResult {
    #[serde(deserialize_with = "null_as_default")]
    pub rank: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub players: Vec<PlayerResult>,
}

/// The outcome of a match, built by the game server and reported with
/// `updateMatchCompleted`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub match_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub server: String,
    /// Elapsed game time, in seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub game_length: f32,
    #[serde(deserialize_with = "null_as_default")]
    pub teams: Vec<TeamResult>,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// A player entering matchmaking, with the servers it can play on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddPlayerEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub servers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddPlayerPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub players: Vec<AddPlayerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemovePlayerPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameIdPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
}

/// Identifies a match; also the payload of the confirm response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchIdPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub match_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FailMatchPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub match_id: String,
    /// Players dropped from matchmaking.
    #[serde(deserialize_with = "null_as_default")]
    pub remove: Vec<String>,
    /// Players put back in the queue.
    #[serde(deserialize_with = "null_as_default")]
    pub requeue: Vec<String>,
}

/// Payload of `subscribe` and `subscribeResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscribePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub rate_limit: i32,
}

// ---------------------------------------------------------------------------
// Response and event payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddPlayerResponsePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemovePlayerResponsePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: String,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetPlayersResponsePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub players: Vec<PlayerStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetMatchesResponsePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FailMatchResponsePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub match_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub removed: Vec<Player>,
    #[serde(deserialize_with = "null_as_default")]
    pub requeued: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompleteMatchResponsePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub match_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub players: Vec<PlayerFullStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchSuggestionPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(rename = "match")]
    #[serde(deserialize_with = "null_as_default")]
    pub suggested: Match,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequeueRequiredPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchFoundPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub game_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub match_uuid: String,
}

// ---------------------------------------------------------------------------
// Join info
// ---------------------------------------------------------------------------

/// A named port on an allocated game server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionPort {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub protocol: String,
}

/// How to reach an allocated game server, normalized across providers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfo {
    pub domain: Option<String>,
    pub host: Option<String>,
    pub ip: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub ports: Vec<ConnectionPort>,
}

/// The provider-independent part of every join-info payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaseJoinInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub connection_info: ConnectionInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub provider_name: String,
    pub provider_reference: Option<String>,
}

/// A provider-specific join-info payload: the common base plus the
/// provider's raw allocation record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderJoinInfo<R> {
    #[serde(flatten)]
    pub base: BaseJoinInfo,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        bound(deserialize = "R: Deserialize<'de> + Default")
    )]
    pub raw_provider_information: R,
}

// -- Hathora --

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HathoraPort {
    #[serde(deserialize_with = "null_as_default")]
    pub host: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub port: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub transport_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HathoraProviderInformation {
    #[serde(deserialize_with = "null_as_default")]
    pub additional_exposed_ports: Vec<HathoraPort>,
    pub exposed_port: Option<HathoraPort>,
    #[serde(deserialize_with = "null_as_default")]
    pub room_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}

// -- i3D.net --

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct I3dIpAddress {
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_version: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub private: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct I3dProperty {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub property_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub property_type: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub property_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct I3dProviderInformation {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_address: Vec<I3dIpAddress>,
    #[serde(deserialize_with = "null_as_default")]
    pub properties: Vec<I3dProperty>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: i32,
}

// -- Edgegap (snake_case on the wire) --

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgegapPort {
    #[serde(deserialize_with = "null_as_default")]
    pub external: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub internal: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub protocol: String,
    #[serde(deserialize_with = "null_as_default")]
    pub proxy: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub tls_upgrade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgegapLocation {
    #[serde(deserialize_with = "null_as_default")]
    pub administrative_division: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub continent: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgegapProviderInformation {
    #[serde(deserialize_with = "null_as_default")]
    pub fqdn: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: EdgegapLocation,
    #[serde(deserialize_with = "null_as_default")]
    pub ports: BTreeMap<String, EdgegapPort>,
    #[serde(deserialize_with = "null_as_default")]
    pub public_ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

// -- Gameye --

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameyePort {
    #[serde(deserialize_with = "null_as_default")]
    pub container: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub host: u16,
    #[serde(rename = "type")]
    #[serde(deserialize_with = "null_as_default")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameyeProviderInformation {
    #[serde(deserialize_with = "null_as_default")]
    pub host: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ports: Vec<GameyePort>,
}

pub type HathoraJoinInfo = ProviderJoinInfo<HathoraProviderInformation>;
pub type I3dJoinInfo = ProviderJoinInfo<I3dProviderInformation>;
pub type EdgegapJoinInfo = ProviderJoinInfo<EdgegapProviderInformation>;
pub type GameyeJoinInfo = ProviderJoinInfo<GameyeProviderInformation>;

/// Join info for an allocated game server, by hosting provider.
///
/// Every variant carries a [`BaseJoinInfo`]; [`JoinInfo::base`] is the
/// provider-independent view. `Base` is what an unknown provider decodes
/// to, and callers should treat it as a complete, usable answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JoinInfo {
    Base(BaseJoinInfo),
    Hathora(HathoraJoinInfo),
    I3d(I3dJoinInfo),
    Edgegap(EdgegapJoinInfo),
    Gameye(GameyeJoinInfo),
}

impl JoinInfo {
    /// The provider-independent part of the payload.
    pub fn base(&self) -> &BaseJoinInfo {
        match self {
            Self::Base(base) => base,
            Self::Hathora(info) => &info.base,
            Self::I3d(info) => &info.base,
            Self::Edgegap(info) => &info.base,
            Self::Gameye(info) => &info.base,
        }
    }

    pub fn connection_info(&self) -> &ConnectionInfo {
        &self.base().connection_info
    }

    pub fn provider_name(&self) -> &str {
        &self.base().provider_name
    }

    pub fn provider_reference(&self) -> Option<&str> {
        self.base().provider_reference.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_absent_optional_fields() {
        let json = serde_json::to_value(Envelope::new("keepAlive")).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "keepAlive" }));
    }

    #[test]
    fn test_envelope_reads_error_and_message_id() {
        let env: Envelope = serde_json::from_str(
            r#"{"action":"addPlayerResponse","messageId":"m-7",
                "error":{"code":409,"message":"already queued"}}"#,
        )
        .unwrap();
        assert_eq!(env.message_id.as_deref(), Some("m-7"));
        let error = env.error.unwrap();
        assert_eq!(error.code, 409);
        assert_eq!(error.message, "already queued");
    }

    #[test]
    fn test_frame_flattens_envelope_next_to_payload() {
        let frame = Frame {
            envelope: Envelope::new("matchFound"),
            payload: MatchFoundPayload {
                game_id: "1v1".into(),
                match_uuid: "abc".into(),
            },
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["action"], "matchFound");
        assert_eq!(json["payload"]["gameId"], "1v1");
        assert_eq!(json["payload"]["matchUuid"], "abc");
    }

    #[test]
    fn test_frame_missing_payload_decodes_to_default() {
        let frame: Frame<RequeueRequiredPayload> =
            serde_json::from_str(r#"{"action":"requeueRequired"}"#).unwrap();
        assert_eq!(frame.payload, RequeueRequiredPayload::default());
    }

    #[test]
    fn test_match_suggestion_uses_match_key() {
        let payload: MatchSuggestionPayload = serde_json::from_str(
            r#"{"gameId":"1v1","match":{"server":"fra","uuid":"u-1","teams":[]}}"#,
        )
        .unwrap();
        assert_eq!(payload.suggested.uuid, "u-1");
        assert_eq!(payload.suggested.server, "fra");
    }

    #[test]
    fn test_edgegap_fields_stay_snake_case() {
        let info: EdgegapProviderInformation = serde_json::from_str(
            r#"{"fqdn":"x.edgegap.net","last_status":"Status.READY",
                "public_ip":"1.2.3.4",
                "ports":{"game":{"external":31500,"internal":7777,"tls_upgrade":false}}}"#,
        )
        .unwrap();
        assert_eq!(info.last_status, "Status.READY");
        assert_eq!(info.public_ip, "1.2.3.4");
        assert_eq!(info.ports["game"].external, 31500);
        assert_eq!(info.ports["game"].internal, 7777);
    }

    #[test]
    fn test_join_info_base_is_shared_by_every_provider() {
        let base = BaseJoinInfo {
            provider_name: "gameye".into(),
            provider_reference: Some("ref-1".into()),
            ..BaseJoinInfo::default()
        };
        let info = JoinInfo::Gameye(ProviderJoinInfo {
            base: base.clone(),
            raw_provider_information: GameyeProviderInformation::default(),
        });
        assert_eq!(info.base(), &base);
        assert_eq!(info.provider_name(), "gameye");
        assert_eq!(info.provider_reference(), Some("ref-1"));
    }

    #[test]
    fn test_match_result_serializes_with_camel_case_keys() {
        let result = MatchResult {
            game_id: "1v1".into(),
            match_id: "m-1".into(),
            server: "mainServer".into(),
            game_length: 20.0,
            teams: vec![TeamResult {
                rank: 0,
                players: vec![PlayerResult::new("p1", 42.0)],
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["gameLength"], 20.0);
        assert_eq!(json["teams"][0]["players"][0]["playerId"], "p1");
        assert_eq!(json["teams"][0]["rank"], 0);
    }
}
