//! Transport abstraction layer for Idem.
//!
//! Provides the [`Transport`] trait: a single persistent, message-oriented
//! connection that is opened with [`Transport::connect`] and reports its
//! lifecycle through [`TransportEvent`]s pushed into a channel owned by the
//! caller.
//!
//! The state machines above this layer never touch the socket directly.
//! They hand the transport an [`EventSender`], and all notifications (open,
//! message, close, error) arrive on the matching receiver, where the owning
//! task serializes them with its other work.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`
//! - `mock`: in-memory [`mock::MockTransport`] for tests

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

use std::fmt;

use tokio::sync::mpsc;

/// Opaque identifier for a connection.
///
/// Every call to [`Transport::connect`] produces a fresh id, and every event
/// is stamped with the id of the connection that produced it. Consumers use
/// it to drop notifications from a connection they already abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Readiness of the current connection, mirroring the WebSocket ready states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    /// The handshake is in progress.
    Connecting,
    /// Frames can be sent.
    Open,
    /// A close was requested and is being carried out.
    Closing,
    /// No connection, or the connection has ended.
    #[default]
    Closed,
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Closing => write!(f, "Closing"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// A lifecycle notification from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is established and ready to send.
    Open { id: ConnectionId },

    /// A text frame arrived.
    Message { id: ConnectionId, text: String },

    /// The connection ended, for any reason. `code` is the close code
    /// reported by the peer, when there was one.
    Closed {
        id: ConnectionId,
        code: Option<u16>,
        reason: String,
    },

    /// The connection failed. Always followed by `Closed` for the same id.
    Error { id: ConnectionId, detail: String },
}

impl TransportEvent {
    /// Returns the id of the connection that produced this event.
    pub fn id(&self) -> ConnectionId {
        match self {
            Self::Open { id }
            | Self::Message { id, .. }
            | Self::Closed { id, .. }
            | Self::Error { id, .. } => *id,
        }
    }
}

/// Channel half through which a transport delivers its events.
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Channel half on which the owner of a transport receives its events.
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Creates a linked event channel for a transport and its owner.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// A persistent connection to a single remote endpoint.
///
/// One transport carries at most one live connection. Calling
/// [`connect`](Self::connect) again replaces the previous connection.
///
/// All methods are non-blocking. The actual I/O runs on whatever execution
/// context the implementation chooses; its results come back as
/// [`TransportEvent`]s on the supplied [`EventSender`].
pub trait Transport: Send + 'static {
    /// Starts connecting to `url`. Returns the id that will stamp every
    /// event of the new connection.
    fn connect(&mut self, url: &str, events: EventSender) -> ConnectionId;

    /// Queues a text frame on the current connection.
    ///
    /// # Errors
    /// Returns [`TransportError::NotOpen`] unless the connection is open.
    fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Closes the current connection. Fire-and-forget: the close handshake
    /// is not awaited.
    fn close(&mut self);

    /// Returns the readiness of the current connection.
    fn ready_state(&self) -> ReadyState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_ready_state_default_is_closed() {
        assert_eq!(ReadyState::default(), ReadyState::Closed);
        assert_eq!(ReadyState::Open.to_string(), "Open");
    }

    #[test]
    fn test_event_id_covers_every_variant() {
        let id = ConnectionId::new(3);
        let events = [
            TransportEvent::Open { id },
            TransportEvent::Message {
                id,
                text: "{}".into(),
            },
            TransportEvent::Closed {
                id,
                code: Some(1000),
                reason: String::new(),
            },
            TransportEvent::Error {
                id,
                detail: "boom".into(),
            },
        ];
        assert!(events.iter().all(|e| e.id() == id));
    }
}
