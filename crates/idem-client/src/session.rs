//! The client state machine.
//!
//! [`ClientSession`] owns the transport and all client state. It is driven
//! from one place at a time: public operations and [`TransportEvent`]s are
//! both plain `&mut self` calls, and whatever the embedding code should
//! hear about is queued and collected with
//! [`drain_events`](ClientSession::drain_events).
//!
//! [`IdemClient`](crate::IdemClient) wraps a session in a Tokio task; tests
//! drive it directly.

use idem_protocol::{JoinInfo, Message, Request};
use idem_session::{CredentialStore, IdemConfig, PlayerIdentity, credentials};
use idem_transport::{ConnectionId, EventSender, ReadyState, Transport, TransportEvent};

use crate::{ClientError, ClientEvent, ConnectionState, MatchmakingIntent, SuggestedMatch};

/// Matchmaking client for a single player.
pub struct ClientSession<T, I, S> {
    config: IdemConfig,
    identity: I,
    credentials: S,
    transport: T,
    transport_events: EventSender,

    /// The connection we're listening to. Events from any other id are stale.
    connection: Option<ConnectionId>,
    state: ConnectionState,
    pending: Option<MatchmakingIntent>,
    suggested_match: Option<SuggestedMatch>,
    join_info: Option<JoinInfo>,

    events: Vec<ClientEvent>,
}

impl<T, I, S> ClientSession<T, I, S>
where
    T: Transport,
    I: PlayerIdentity,
    S: CredentialStore,
{
    /// Creates an idle session. Transport events for it must be fed back
    /// through [`handle_transport_event`](Self::handle_transport_event).
    pub fn new(
        config: IdemConfig,
        identity: I,
        credentials: S,
        transport: T,
        transport_events: EventSender,
    ) -> Self {
        Self {
            config,
            identity,
            credentials,
            transport,
            transport_events,
            connection: None,
            state: ConnectionState::None,
            pending: None,
            suggested_match: None,
            join_info: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn suggested_match(&self) -> Option<&SuggestedMatch> {
        self.suggested_match.as_ref()
    }

    pub fn join_info(&self) -> Option<&JoinInfo> {
        self.join_info.as_ref()
    }

    /// The queue request that will be replayed on the next `Connected`.
    pub fn pending_intent(&self) -> Option<&MatchmakingIntent> {
        self.pending.as_ref()
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection
    }

    pub fn config(&self) -> &IdemConfig {
        &self.config
    }

    /// Takes the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Queues the player for `game_id` on the given servers.
    ///
    /// Without a connection the request is remembered (replacing any
    /// earlier one) and a connection is opened; it is sent once the
    /// connection comes up.
    ///
    /// # Errors
    /// - [`ClientError::InvalidState`] if the client is already queued.
    /// - [`ClientError::NotReady`] if the transport isn't open.
    /// - Errors from [`connect`](Self::connect) when a connection is opened.
    pub fn find_match(&mut self, game_id: &str, servers: Vec<String>) -> Result<(), ClientError> {
        if self.state < ConnectionState::Connected {
            self.pending = Some(MatchmakingIntent::new(game_id, servers));
            if self.state < ConnectionState::Connecting {
                self.connect()?;
            }
            return Ok(());
        }

        let player_id = self.identity.player_id();
        let request = idem_protocol::add_player(game_id, &player_id, &servers);
        self.send(&request)?;
        tracing::info!(game_id, %player_id, "matchmaking requested");
        self.set_state(ConnectionState::MatchmakingRequested);
        Ok(())
    }

    /// Forgets any queue request and drops the connection.
    pub fn stop_matchmaking(&mut self) {
        self.pending = None;
        self.close_connection();
    }

    /// Opens the connection to the backend.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidState`] unless the client is idle
    /// (`None` or `Disconnected`).
    pub fn connect(&mut self) -> Result<(), ClientError> {
        if self.state > ConnectionState::Disconnected {
            tracing::error!(state = %self.state, "wrong state for connection");
            return Err(ClientError::InvalidState {
                operation: "connect",
                state: self.state,
            });
        }

        let player_id = self.identity.player_id();
        let join_code = self.credentials.get(credentials::JOIN_CODE).unwrap_or_else(|| {
            tracing::warn!("no join code in the credential store");
            String::new()
        });
        let auth = self.identity.auth_string();
        let url = self.config.full_client_url(&player_id, &join_code, &auth);

        tracing::debug!(%player_id, "starting Idem connection");
        self.set_state(ConnectionState::Connecting);
        let id = self.transport.connect(&url, self.transport_events.clone());
        self.connection = Some(id);
        Ok(())
    }

    /// Sends a request on the open connection.
    ///
    /// # Errors
    /// - [`ClientError::InvalidState`] unless the state is `Connected` or
    ///   `RequeueRequired`.
    /// - [`ClientError::NotReady`] if the transport isn't open.
    pub fn send(&mut self, request: &Request) -> Result<(), ClientError> {
        if !matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::RequeueRequired
        ) {
            tracing::error!(action = request.action(), state = %self.state, "send in wrong state");
            return Err(ClientError::InvalidState {
                operation: "send",
                state: self.state,
            });
        }

        let text = idem_protocol::encode(request)?;
        let ready = self.transport.ready_state();
        if ready != ReadyState::Open {
            tracing::error!(action = request.action(), %ready, "send on a connection that is not open");
            return Err(ClientError::NotReady(ready));
        }

        tracing::debug!(action = request.action(), "sending request");
        self.transport.send(text)?;
        Ok(())
    }

    /// Closes the connection without touching the queue request.
    pub fn shutdown(&mut self) {
        self.close_connection();
    }

    // -----------------------------------------------------------------------
    // Transport events
    // -----------------------------------------------------------------------

    /// Feeds one transport notification into the state machine.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        if self.connection != Some(event.id()) {
            tracing::trace!(id = %event.id(), "ignoring event from a stale connection");
            return;
        }

        match event {
            TransportEvent::Open { id } => {
                tracing::debug!(%id, "connection open");
                self.set_state(ConnectionState::Connected);
            }
            TransportEvent::Message { text, .. } => self.handle_message(&text),
            TransportEvent::Error { id, detail } => {
                tracing::info!(%id, %detail, "connection error");
                if self.state == ConnectionState::Connecting {
                    self.close_connection();
                }
            }
            TransportEvent::Closed { id, code, reason } => {
                tracing::debug!(%id, ?code, %reason, "connection closed");
                self.connection = None;
                self.set_state(ConnectionState::Disconnected);
            }
        }
    }

    fn handle_message(&mut self, text: &str) {
        tracing::trace!(text, "message received");
        let Some(message) = idem_protocol::decode(text) else {
            tracing::error!(text, "failed to parse message");
            return;
        };

        match message {
            Message::AddPlayerResponse(frame) => {
                if let Some(error) = &frame.envelope.error {
                    tracing::warn!(code = error.code, detail = %error.message, "addPlayer rejected");
                } else if self.state == ConnectionState::MatchmakingRequested {
                    tracing::info!(game_id = %frame.payload.game_id, "matchmaking confirmed");
                    self.set_state(ConnectionState::MatchmakingConfirmed);
                }
            }
            Message::MatchFound(frame) => {
                let found = SuggestedMatch {
                    game_id: frame.payload.game_id,
                    uuid: frame.payload.match_uuid,
                };
                tracing::info!(game_id = %found.game_id, uuid = %found.uuid, "match found");
                self.suggested_match = Some(found.clone());
                self.set_state(ConnectionState::MatchFound);
                self.events.push(ClientEvent::MatchFound(found));
            }
            Message::JoinInfo(frame) => {
                tracing::info!(provider = frame.payload.provider_name(), "join info received");
                self.join_info = Some(frame.payload.clone());
                self.events.push(ClientEvent::JoinInfoReceived(frame.payload));
                self.set_state(ConnectionState::JoinInfoReceived);
                self.pending = None;
            }
            Message::RequeueRequired(frame) => {
                tracing::warn!(reason = %frame.payload.reason, "requeue required");
                self.set_state(ConnectionState::RequeueRequired);
            }
            Message::KeepAlive(_) => {}
            other => tracing::warn!(action = other.action(), "unhandled message"),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn close_connection(&mut self) {
        if self.connection.take().is_some() {
            self.transport.close();
            self.set_state(ConnectionState::Disconnected);
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        self.state = state;
        tracing::debug!(%state, "state changed");

        if state == ConnectionState::Connected {
            if let Some(intent) = self.pending.clone() {
                if let Err(e) = self.find_match(&intent.game_id, intent.servers) {
                    tracing::error!(error = %e, "queued matchmaking request failed");
                }
            }
        }

        if state < ConnectionState::Connected {
            self.suggested_match = None;
        }

        if state == ConnectionState::RequeueRequired {
            self.suggested_match = None;
            self.join_info = None;

            // The backend drops the connection on requeue; start over.
            let intent = self.pending.clone();
            self.stop_matchmaking();
            if let Some(intent) = intent {
                if let Err(e) = self.find_match(&intent.game_id, intent.servers) {
                    tracing::error!(error = %e, "requeue failed");
                }
            }
        }

        self.events.push(ClientEvent::StateChanged(state));
    }
}

#[cfg(test)]
mod tests {
    use idem_session::{MemoryCredentials, StaticIdentity};
    use idem_transport::{event_channel, mock::MockTransport};

    use super::*;

    fn session() -> (
        ClientSession<MockTransport, StaticIdentity, MemoryCredentials>,
        MockTransport,
    ) {
        let mock = MockTransport::new();
        let (tx, _rx) = event_channel();
        let session = ClientSession::new(
            IdemConfig::default(),
            StaticIdentity::new("player_1"),
            MemoryCredentials::new().with(credentials::JOIN_CODE, "JC"),
            mock.clone(),
            tx,
        );
        (session, mock)
    }

    #[test]
    fn test_connect_builds_client_url() {
        let (mut s, mock) = session();
        s.connect().unwrap();
        assert_eq!(s.state(), ConnectionState::Connecting);
        assert_eq!(
            mock.connects(),
            vec!["wss://ws-int.idem.gg/?playerId=player_1&code=JC&authorization=Demo".to_string()]
        );
    }

    #[test]
    fn test_connect_encodes_join_code() {
        let mock = MockTransport::new();
        let (tx, _rx) = event_channel();
        let mut s = ClientSession::new(
            IdemConfig::default(),
            StaticIdentity::new("player_1"),
            MemoryCredentials::new().with(credentials::JOIN_CODE, "a b&c"),
            mock.clone(),
            tx,
        );
        s.connect().unwrap();
        assert_eq!(
            mock.connects(),
            vec!["wss://ws-int.idem.gg/?playerId=player_1&code=a%20b%26c&authorization=Demo".to_string()]
        );
    }

    #[test]
    fn test_stale_connection_events_are_ignored() {
        let (mut s, _mock) = session();
        s.connect().unwrap();
        let id = s.connection_id().unwrap();
        let stale = ConnectionId::new(id.into_inner() + 100);
        s.handle_transport_event(TransportEvent::Open { id: stale });
        assert_eq!(s.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_send_before_connected_is_invalid_state() {
        let (mut s, _mock) = session();
        let err = s.send(&idem_protocol::get_players("1v1")).unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidState { operation: "send", state: ConnectionState::None }
        ));
    }

    #[test]
    fn test_set_state_same_state_emits_nothing() {
        let (mut s, _mock) = session();
        s.set_state(ConnectionState::Disconnected);
        s.drain_events();
        s.set_state(ConnectionState::Disconnected);
        assert!(s.drain_events().is_empty());
    }
}
