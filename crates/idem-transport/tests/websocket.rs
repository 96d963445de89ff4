//! Integration tests for the WebSocket transport.
//!
//! These tests spin up a real WebSocket server on a local port and point a
//! [`WebSocketTransport`] at it, verifying that the event stream (open,
//! message, close, error) matches what happened on the wire.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use idem_transport::{
        ReadyState, Transport, TransportEvent, WebSocketTransport,
        event_channel,
    };
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on a random port and returns it with its `ws://` URL.
    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");
        (listener, format!("ws://{addr}"))
    }

    async fn accept(listener: &TcpListener) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake should succeed")
    }

    async fn next_event(
        rx: &mut idem_transport::EventReceiver,
    ) -> TransportEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event should arrive in time")
            .expect("channel should stay open")
    }

    #[tokio::test]
    async fn test_websocket_open_send_receive_and_remote_close() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move { accept(&listener).await });

        let mut transport = WebSocketTransport::new();
        let (tx, mut rx) = event_channel();
        let id = transport.connect(&url, tx);

        assert_eq!(next_event(&mut rx).await, TransportEvent::Open { id });
        assert_eq!(transport.ready_state(), ReadyState::Open);

        let mut server_ws = server.await.expect("task should complete");

        // --- Client sends, server receives ---
        transport
            .send(r#"{"action":"getPlayers"}"#.into())
            .expect("send should succeed");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"action":"getPlayers"}"#);

        // --- Server sends, client receives ---
        server_ws
            .send(Message::Text(r#"{"action":"keepAlive"}"#.to_string().into()))
            .await
            .unwrap();
        assert_eq!(
            next_event(&mut rx).await,
            TransportEvent::Message {
                id,
                text: r#"{"action":"keepAlive"}"#.into(),
            }
        );

        // --- Server closes ---
        server_ws.close(None).await.unwrap();
        match next_event(&mut rx).await {
            TransportEvent::Closed { id: closed, .. } => assert_eq!(closed, id),
            other => panic!("expected Closed, got {other:?}"),
        }
        assert_eq!(transport.ready_state(), ReadyState::Closed);
    }

    #[tokio::test]
    async fn test_websocket_local_close_is_reported() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            // Drain until the client's close frame arrives.
            while let Some(Ok(msg)) = ws.next().await {
                if msg.is_close() {
                    break;
                }
            }
        });

        let mut transport = WebSocketTransport::new();
        let (tx, mut rx) = event_channel();
        let id = transport.connect(&url, tx);
        assert_eq!(next_event(&mut rx).await, TransportEvent::Open { id });

        transport.close();
        assert_eq!(transport.ready_state(), ReadyState::Closed);
        assert!(transport.send("late".into()).is_err());

        match next_event(&mut rx).await {
            TransportEvent::Closed { id: closed, .. } => assert_eq!(closed, id),
            other => panic!("expected Closed, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_websocket_refused_connection_reports_error_then_close() {
        // Bind and immediately drop to get a port nobody listens on.
        let (listener, url) = listen().await;
        drop(listener);

        let mut transport = WebSocketTransport::new();
        let (tx, mut rx) = event_channel();
        let id = transport.connect(&url, tx);

        match next_event(&mut rx).await {
            TransportEvent::Error { id: failed, .. } => assert_eq!(failed, id),
            other => panic!("expected Error, got {other:?}"),
        }
        match next_event(&mut rx).await {
            TransportEvent::Closed { id: closed, .. } => assert_eq!(closed, id),
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_websocket_reconnect_issues_a_fresh_connection_id() {
        let (listener, url) = listen().await;
        tokio::spawn(async move {
            let _first = accept(&listener).await;
            let _second = accept(&listener).await;
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let mut transport = WebSocketTransport::new();
        let (tx, mut rx) = event_channel();
        let first = transport.connect(&url, tx.clone());
        assert_eq!(next_event(&mut rx).await, TransportEvent::Open { id: first });

        let second = transport.connect(&url, tx);
        assert_ne!(first, second);

        // The first link reports its close; the second reports open.
        let mut saw_second_open = false;
        for _ in 0..2 {
            match next_event(&mut rx).await {
                TransportEvent::Open { id } => {
                    assert_eq!(id, second);
                    saw_second_open = true;
                }
                TransportEvent::Closed { id, .. } => assert_eq!(id, first),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(saw_second_open);
    }
}
