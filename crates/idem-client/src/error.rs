//! Error types for the client role.

use idem_protocol::ProtocolError;
use idem_transport::{ReadyState, TransportError};

use crate::ConnectionState;

/// Errors returned by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The operation isn't allowed in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: ConnectionState,
    },

    /// The transport isn't open, so nothing can be sent.
    #[error("connection is not ready (transport: {0})")]
    NotReady(ReadyState),

    /// A request could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The transport refused the frame.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The client task has stopped.
    #[error("client is no longer running")]
    Unavailable,
}
