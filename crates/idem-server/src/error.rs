//! Error types for the server role.

use idem_protocol::ProtocolError;
use idem_transport::{ReadyState, TransportError};

use crate::MatchState;

/// Errors returned by server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The operation isn't legal in the current match state.
    #[error("cannot {operation} in match state {state}")]
    InvalidMatchState {
        operation: &'static str,
        state: MatchState,
    },

    /// The previous request hasn't been answered and hasn't timed out.
    #[error("another request is still awaiting a response")]
    RequestOutstanding,

    /// The connection to the backend isn't open.
    #[error("server is not connected (transport: {0})")]
    NotReady(ReadyState),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server task has stopped.
    #[error("server is no longer running")]
    Unavailable,
}
