//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. A
//! `ProtocolError` always means the problem is in turning frames into
//! messages (or back), never in networking or session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a request into a frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, or a shape that doesn't
    /// match the type selected by the frame's `action`.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame's `action` has no entry in the decode table.
    #[error("unknown action: {0:?}")]
    UnknownAction(String),
}
