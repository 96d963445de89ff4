//! In-memory transport for exercising the state machines without a network.
//!
//! [`MockTransport`] is a cheap, cloneable handle over shared state: hand one
//! clone to the code under test and keep another to inspect what was sent
//! and to inject events (`emit_open`, `emit_message`, ...) as if they came
//! from the wire.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    ConnectionId, EventSender, ReadyState, Transport, TransportError,
    TransportEvent,
};

#[derive(Default)]
struct Inner {
    next_id: u64,
    current: Option<ConnectionId>,
    events: Option<EventSender>,
    ready: ReadyState,
    connects: Vec<String>,
    sent: Vec<String>,
    closes: usize,
}

/// A recording [`Transport`] whose events are driven by the test.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    /// Creates a mock with no connection.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A test that panicked while holding the lock already failed.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// URLs passed to `connect`, in order.
    pub fn connects(&self) -> Vec<String> {
        self.lock().connects.clone()
    }

    /// Frames accepted by `send`, in order.
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// Number of `close` calls that closed a live connection.
    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    /// Id of the current connection, if any.
    pub fn current_id(&self) -> Option<ConnectionId> {
        self.lock().current
    }

    /// Overrides the reported ready state.
    pub fn set_ready_state(&self, state: ReadyState) {
        self.lock().ready = state;
    }

    /// Marks the current connection open and emits `Open`.
    pub fn emit_open(&self) -> Option<ConnectionId> {
        let mut inner = self.lock();
        let id = inner.current?;
        inner.ready = ReadyState::Open;
        send_event(&inner, TransportEvent::Open { id });
        Some(id)
    }

    /// Emits a text frame on the current connection.
    pub fn emit_message(&self, text: impl Into<String>) -> Option<ConnectionId> {
        let inner = self.lock();
        let id = inner.current?;
        send_event(
            &inner,
            TransportEvent::Message {
                id,
                text: text.into(),
            },
        );
        Some(id)
    }

    /// Emits an error on the current connection.
    pub fn emit_error(&self, detail: impl Into<String>) -> Option<ConnectionId> {
        let inner = self.lock();
        let id = inner.current?;
        send_event(
            &inner,
            TransportEvent::Error {
                id,
                detail: detail.into(),
            },
        );
        Some(id)
    }

    /// Ends the current connection from the remote side and emits `Closed`.
    pub fn emit_closed(&self, reason: impl Into<String>) -> Option<ConnectionId> {
        let mut inner = self.lock();
        let id = inner.current?;
        inner.ready = ReadyState::Closed;
        send_event(
            &inner,
            TransportEvent::Closed {
                id,
                code: Some(1000),
                reason: reason.into(),
            },
        );
        inner.current = None;
        Some(id)
    }
}

fn send_event(inner: &Inner, event: TransportEvent) {
    if let Some(events) = &inner.events {
        let _ = events.send(event);
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, url: &str, events: EventSender) -> ConnectionId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = ConnectionId::new(inner.next_id);
        inner.current = Some(id);
        inner.events = Some(events);
        inner.ready = ReadyState::Connecting;
        inner.connects.push(url.to_owned());
        id
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let mut inner = self.lock();
        if inner.current.is_none() || inner.ready != ReadyState::Open {
            return Err(TransportError::NotOpen(inner.ready));
        }
        inner.sent.push(text);
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.lock();
        if inner.current.take().is_some() {
            inner.closes += 1;
        }
        inner.ready = ReadyState::Closed;
    }

    fn ready_state(&self) -> ReadyState {
        self.lock().ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_channel;

    #[test]
    fn test_mock_records_connects_and_rejects_send_until_open() {
        let mut mock = MockTransport::new();
        let (tx, mut rx) = event_channel();

        let id = mock.connect("wss://example", tx);
        assert_eq!(mock.connects(), vec!["wss://example".to_string()]);
        assert!(mock.send("early".into()).is_err());

        assert_eq!(mock.emit_open(), Some(id));
        assert_eq!(rx.try_recv().unwrap(), TransportEvent::Open { id });

        mock.send("hello".into()).unwrap();
        assert_eq!(mock.sent(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_mock_close_counts_only_live_connections() {
        let mut mock = MockTransport::new();
        let (tx, _rx) = event_channel();
        mock.close();
        assert_eq!(mock.close_count(), 0);

        mock.connect("wss://example", tx);
        mock.close();
        mock.close();
        assert_eq!(mock.close_count(), 1);
        assert_eq!(mock.ready_state(), ReadyState::Closed);
    }
}
