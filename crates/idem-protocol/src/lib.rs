//! Wire protocol for the Idem matchmaking backend.
//!
//! Every frame is a JSON text message with an `action` field. This crate
//! owns the shapes of those frames and the two directions of travel:
//!
//! - **Inbound**: [`decode`] looks at `action` and parses the frame into the
//!   matching [`Message`] variant. `joinInfo` is further dispatched on its
//!   `providerName` into a [`JoinInfo`] variant.
//! - **Outbound**: [`Request`] plus builders such as [`add_player`] and
//!   [`complete_match`]; [`encode`] turns one into a text frame.
//!
//! ```rust
//! use idem_protocol::{Message, decode, encode, get_players};
//!
//! let text = encode(&get_players("1v1")).unwrap();
//! assert!(text.contains(r#""action":"getPlayers""#));
//!
//! let msg = decode(r#"{"action":"keepAlive"}"#).unwrap();
//! assert!(matches!(msg, Message::KeepAlive(_)));
//! ```

mod codec;
mod error;
pub mod message;
mod request;
pub mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{Message, decode, try_decode, try_decode_with};
pub use request::{
    Request, add_player, complete_match, confirm_match, encode, encode_with, fail_match,
    fail_match_single, get_matches, get_players, remove_player, subscribe,
};
pub use types::{
    BaseJoinInfo, ConnectionInfo, ConnectionPort, Envelope, Frame, JoinInfo,
    MatchResult, PlayerResult, ProviderJoinInfo, TeamResult, WireError,
};
