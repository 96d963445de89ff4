use crate::ReadyState;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection is not in a state that accepts outgoing frames.
    #[error("connection is not open (state: {0})")]
    NotOpen(ReadyState),

    /// The socket task has ended, so the frame could not be queued.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
