//! Unified error type for the Idem runtime.

use idem_client::ClientError;
use idem_protocol::ProtocolError;
use idem_server::ServerError;
use idem_session::SessionError;
use idem_transport::TransportError;

/// Top-level error wrapping the error of every layer.
///
/// `?` converts any layer's error into this one.
#[derive(Debug, thiserror::Error)]
pub enum IdemError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Configuration, credentials or authentication.
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Server(#[from] ServerError),
}
