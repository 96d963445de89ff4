//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! Each connection runs in its own Tokio task. The task owns the socket,
//! drains an outgoing command channel, and forwards everything it reads as
//! [`TransportEvent`]s. The [`WebSocketTransport`] itself only keeps the
//! command sender and a shared ready-state cell, so none of its methods
//! block.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::{
    ConnectionId, EventSender, ReadyState, Transport, TransportError,
    TransportEvent,
};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Commands from the transport handle to its connection task.
enum Outgoing {
    Text(String),
    Close,
}

/// [`ReadyState`] stored in an atomic so the task and the handle can share it.
#[derive(Debug, Default)]
struct SharedState(AtomicU8);

impl SharedState {
    fn get(&self) -> ReadyState {
        match self.0.load(Ordering::Acquire) {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }

    fn set(&self, state: ReadyState) {
        let raw = match state {
            ReadyState::Connecting => 0,
            ReadyState::Open => 1,
            ReadyState::Closing => 2,
            ReadyState::Closed => 3,
        };
        self.0.store(raw, Ordering::Release);
    }
}

/// The live connection owned by a [`WebSocketTransport`].
struct Link {
    id: ConnectionId,
    outgoing: mpsc::UnboundedSender<Outgoing>,
    state: Arc<SharedState>,
}

/// A client-side WebSocket [`Transport`].
#[derive(Default)]
pub struct WebSocketTransport {
    link: Option<Link>,
}

impl WebSocketTransport {
    /// Creates a transport with no connection.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str, events: EventSender) -> ConnectionId {
        // One connection per transport: a reconnect replaces the old link.
        self.close();

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        let state = Arc::new(SharedState::default());
        state.set(ReadyState::Connecting);
        let (tx, rx) = mpsc::unbounded_channel();

        tracing::debug!(%id, url, "opening WebSocket connection");
        tokio::spawn(run_link(
            id,
            url.to_owned(),
            Arc::clone(&state),
            rx,
            events,
        ));

        self.link = Some(Link {
            id,
            outgoing: tx,
            state,
        });
        id
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let link = self
            .link
            .as_ref()
            .ok_or(TransportError::NotOpen(ReadyState::Closed))?;
        let state = link.state.get();
        if state != ReadyState::Open {
            return Err(TransportError::NotOpen(state));
        }
        link.outgoing.send(Outgoing::Text(text)).map_err(|_| {
            TransportError::ConnectionClosed(format!(
                "{} task has stopped",
                link.id
            ))
        })
    }

    fn close(&mut self) {
        if let Some(link) = self.link.take() {
            tracing::debug!(id = %link.id, "closing WebSocket connection");
            link.state.set(ReadyState::Closing);
            let _ = link.outgoing.send(Outgoing::Close);
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.link
            .as_ref()
            .map_or(ReadyState::Closed, |link| link.state.get())
    }
}

/// Drives one connection from handshake to close.
async fn run_link(
    id: ConnectionId,
    url: String,
    state: Arc<SharedState>,
    mut outgoing: mpsc::UnboundedReceiver<Outgoing>,
    events: EventSender,
) {
    let connected = tokio::select! {
        result = tokio_tungstenite::connect_async(url.as_str()) => result,
        // Text can't be queued before Open, so anything here is a close
        // request (or the handle was dropped).
        _ = outgoing.recv() => {
            state.set(ReadyState::Closed);
            let _ = events.send(TransportEvent::Closed {
                id,
                code: None,
                reason: "closed before the handshake completed".into(),
            });
            return;
        }
    };

    let ws = match connected {
        Ok((ws, _response)) => ws,
        Err(e) => {
            tracing::debug!(%id, error = %e, "WebSocket handshake failed");
            state.set(ReadyState::Closed);
            let _ = events.send(TransportEvent::Error {
                id,
                detail: e.to_string(),
            });
            let _ = events.send(TransportEvent::Closed {
                id,
                code: None,
                reason: e.to_string(),
            });
            return;
        }
    };

    state.set(ReadyState::Open);
    let _ = events.send(TransportEvent::Open { id });

    let (mut sink, mut stream) = ws.split();
    let (code, reason) = loop {
        tokio::select! {
            cmd = outgoing.recv() => match cmd {
                Some(Outgoing::Text(text)) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        let _ = events.send(TransportEvent::Error {
                            id,
                            detail: e.to_string(),
                        });
                        break (None, e.to_string());
                    }
                }
                Some(Outgoing::Close) | None => {
                    state.set(ReadyState::Closing);
                    let _ = sink.close().await;
                    break (None, "closed locally".to_owned());
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Message {
                        id,
                        text: text.as_str().to_owned(),
                    });
                }
                Some(Ok(Message::Binary(data))) => {
                    let _ = events.send(TransportEvent::Message {
                        id,
                        text: String::from_utf8_lossy(&data).into_owned(),
                    });
                }
                Some(Ok(Message::Close(frame))) => {
                    break match frame {
                        Some(frame) => (
                            Some(u16::from(frame.code)),
                            frame.reason.as_str().to_owned(),
                        ),
                        None => (None, String::new()),
                    };
                }
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    let _ = events.send(TransportEvent::Error {
                        id,
                        detail: e.to_string(),
                    });
                    break (None, e.to_string());
                }
                None => break (None, "stream ended".to_owned()),
            },
        }
    };

    state.set(ReadyState::Closed);
    tracing::debug!(%id, ?code, %reason, "WebSocket connection closed");
    let _ = events.send(TransportEvent::Closed { id, code, reason });
}
