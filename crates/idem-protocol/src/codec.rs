//! Codec trait and the JSON implementation used on the Idem wire.
//!
//! A codec turns typed values into frame bytes and back. The decode table
//! in [`crate::message`] and the request encoder in [`crate::request`]
//! never call `serde_json` themselves; they go through a [`Codec`].
//! [`try_decode_with`](crate::try_decode_with) and
//! [`encode_with`](crate::encode_with) take any codec, while
//! [`try_decode`](crate::try_decode) and [`encode`](crate::encode) pass
//! [`JsonCodec`], the only format the backend speaks.
//!
//! Swapping the codec is useful for instrumenting decode (counting or
//! logging every phase) or for replaying frames captured in another
//! serde format. The payload types only assume a self-describing format,
//! since `Frame` flattens the envelope next to the payload.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns typed values into frame bytes and back.
///
/// ## Bounds
///
/// The runtimes hold a codec inside actor tasks that Tokio may move
/// between worker threads, hence `Send + Sync + 'static`.
///
/// `decode` asks for `DeserializeOwned` rather than `Deserialize<'de>`:
/// the decode table parses one frame several times (envelope first, then
/// the payload shape the action selects), and each result must outlive
/// the borrowed input.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use idem_protocol::{Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Envelope::new("keepAlive")).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.action, "keepAlive");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Envelope;

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<Envelope, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_encode_produces_json_object() {
        let bytes = JsonCodec.encode(&Envelope::new("getPlayers")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["action"], "getPlayers");
    }
}
