//! Notifications published by the client.

use idem_protocol::JoinInfo;

use crate::{ConnectionState, SuggestedMatch};

/// Something the embedding game should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The client entered a new state. Fired once per transition, after
    /// the transition's side effects ran.
    StateChanged(ConnectionState),

    /// The backend assigned a match.
    MatchFound(SuggestedMatch),

    /// The game server for the match is ready; connect to it.
    JoinInfoReceived(JoinInfo),
}
