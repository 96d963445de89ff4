//! The game server state machine.
//!
//! [`ServerSession`] connects a game server to the backend for the one
//! match it hosts, then reports the match as confirmed, completed or
//! failed. Like the client, it is synchronous: the owner feeds it
//! operations and [`TransportEvent`]s, and collects the resulting
//! [`ServerEffect`]s with [`drain_effects`](ServerSession::drain_effects).
//!
//! Authentication is the one async step. [`start`](ServerSession::start)
//! hands back an [`AuthRequest`]; the owner runs the
//! [`Authenticator`](idem_session::Authenticator) and returns the result
//! with [`on_authenticated`](ServerSession::on_authenticated). Each attempt
//! carries a generation number so late results of an abandoned attempt are
//! dropped.

use std::time::Duration;

use idem_protocol::{MatchResult, Message, Request, TeamResult};
use idem_session::{Backoff, CredentialStore, IdemConfig, SessionError, credentials};
use idem_transport::{ConnectionId, EventSender, ReadyState, Transport, TransportEvent};
use tokio::time::Instant;

use crate::{
    ExitCode, HostProcess, MatchEnvironment, MatchState, ServerEffect, ServerError, ServerEvent,
    StartOutcome,
};

/// How long a sent request blocks the next one while unanswered.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials to exchange for a token, tagged with the attempt they
/// belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub generation: u64,
    pub username: String,
    pub password: String,
    pub client_id: String,
}

/// What [`ServerSession::start`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartStep {
    /// An attempt is already running; wait for its outcome.
    Pending,
    /// The request was answered on the spot.
    Resolved(StartOutcome),
    /// A new attempt began; authenticate and report back.
    Authenticate(AuthRequest),
}

/// Backend connection for the game server of one match.
pub struct ServerSession<T, S, H> {
    config: IdemConfig,
    credentials: S,
    environment: MatchEnvironment,
    transport: T,
    host: H,
    transport_events: EventSender,

    connection: Option<ConnectionId>,
    match_state: MatchState,

    /// Generation of the attempt in flight, from `start` until open or failure.
    attempt: Option<u64>,
    generation: u64,
    connect_attempts: u32,
    backoff: Backoff,
    outstanding_since: Option<Instant>,

    effects: Vec<ServerEffect>,
}

impl<T, S, H> ServerSession<T, S, H>
where
    T: Transport,
    S: CredentialStore,
    H: HostProcess,
{
    /// Creates the session and validates the match environment.
    ///
    /// An invalid environment leaves the match in [`MatchState::None`] and,
    /// with `quit_on_crit_error`, asks the host to exit with
    /// [`ExitCode::InvalidEnvironment`].
    pub fn new(
        config: IdemConfig,
        credentials: S,
        environment: MatchEnvironment,
        transport: T,
        host: H,
        transport_events: EventSender,
    ) -> Self {
        let mut session = Self {
            config,
            credentials,
            environment,
            transport,
            host,
            transport_events,
            connection: None,
            match_state: MatchState::None,
            attempt: None,
            generation: 0,
            connect_attempts: 0,
            backoff: Backoff::new(),
            outstanding_since: None,
            effects: Vec::new(),
        };

        tracing::debug!(environment = %session.environment, "match environment");
        if session.environment.is_valid() {
            session.set_match_state(MatchState::Created);
        } else {
            tracing::error!(environment = %session.environment, "invalid match environment");
            if session.config.quit_on_crit_error {
                session.exit(ExitCode::InvalidEnvironment);
            }
        }
        session
    }

    pub fn match_state(&self) -> MatchState {
        self.match_state
    }

    pub fn environment(&self) -> &MatchEnvironment {
        &self.environment
    }

    /// Whether requests can be sent right now.
    pub fn is_server_ready(&self) -> bool {
        self.connection.is_some() && self.transport.ready_state() == ReadyState::Open
    }

    /// Whether a connection attempt is in flight.
    pub fn is_starting(&self) -> bool {
        self.attempt.is_some()
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    pub fn config(&self) -> &IdemConfig {
        &self.config
    }

    /// Takes the effects queued since the last call.
    pub fn drain_effects(&mut self) -> Vec<ServerEffect> {
        std::mem::take(&mut self.effects)
    }

    // -----------------------------------------------------------------------
    // Connection
    // -----------------------------------------------------------------------

    /// Begins connecting to the backend, or joins the attempt in flight.
    pub fn start(&mut self) -> StartStep {
        if self.attempt.is_some() {
            return StartStep::Pending;
        }

        if self.connect_attempts >= self.config.max_connect_attempts {
            tracing::error!(
                attempts = self.config.max_connect_attempts,
                "could not connect to Idem, giving up"
            );
            if self.config.quit_on_crit_error {
                self.exit(ExitCode::CannotConnect);
            }
            self.resolve(StartOutcome::Exhausted);
            return StartStep::Resolved(StartOutcome::Exhausted);
        }

        self.connect_attempts += 1;
        self.generation += 1;
        self.attempt = Some(self.generation);

        let username = self.credentials.require(credentials::USER_NAME);
        let password = self.credentials.require(credentials::PASSWORD);
        let (username, password) = match (username, password) {
            (Ok(username), Ok(password)) => (username, password),
            (Err(e), _) | (_, Err(e)) => {
                self.fail_authorization(&e.to_string());
                return StartStep::Resolved(StartOutcome::Failed);
            }
        };

        tracing::info!(
            attempt = self.connect_attempts,
            generation = self.generation,
            "authenticating with Idem"
        );
        StartStep::Authenticate(AuthRequest {
            generation: self.generation,
            username,
            password,
            client_id: self.config.client_id().to_owned(),
        })
    }

    /// Continues the attempt `generation` with the authenticator's answer.
    pub fn on_authenticated(&mut self, generation: u64, result: Result<String, SessionError>) {
        if self.attempt != Some(generation) {
            tracing::debug!(generation, "ignoring result of an abandoned attempt");
            return;
        }

        match result {
            Ok(token) if !token.trim().is_empty() => {
                let url = self.config.server_url(&token);
                let id = self.transport.connect(&url, self.transport_events.clone());
                tracing::info!(%id, "starting Idem connection");
                self.connection = Some(id);
            }
            Ok(_) => self.fail_authorization("response token is empty"),
            Err(SessionError::AuthFailed(reason)) => self.fail_authorization(&reason),
            Err(e) => {
                tracing::error!(error = %e, "could not start Idem server");
                if self.config.quit_on_crit_error {
                    self.exit(ExitCode::CannotConnect);
                }
                self.attempt = None;
                self.resolve(StartOutcome::Failed);
            }
        }
    }

    /// Abandons any attempt, answers waiting `start` callers and closes
    /// the connection.
    pub fn stop(&mut self) {
        if self.attempt.take().is_some() {
            tracing::debug!("abandoning connection attempt");
        }
        self.resolve(StartOutcome::Stopped);
        if self.connection.take().is_some() {
            self.transport.close();
            self.publish(ServerEvent::Disconnected);
        }
    }

    // -----------------------------------------------------------------------
    // Match reporting
    // -----------------------------------------------------------------------

    /// Tells the backend the match is going ahead.
    ///
    /// # Errors
    /// [`ServerError::InvalidMatchState`] once the match is past `Created`,
    /// otherwise the errors of a send.
    pub fn confirm_match(&mut self) -> Result<(), ServerError> {
        if self.match_state > MatchState::Created {
            return Err(self.wrong_state("confirm match"));
        }
        let request =
            idem_protocol::confirm_match(&self.environment.game_id, &self.environment.match_id);
        self.send(&request)
    }

    /// Reports the result of a confirmed match.
    ///
    /// # Errors
    /// [`ServerError::InvalidMatchState`] unless the match is `Confirmed`,
    /// otherwise the errors of a send.
    pub fn complete_match(
        &mut self,
        game_length: f32,
        server_name: &str,
        teams: Vec<TeamResult>,
    ) -> Result<(), ServerError> {
        if self.match_state != MatchState::Confirmed {
            return Err(self.wrong_state("complete match"));
        }
        let result = MatchResult {
            game_id: self.environment.game_id.clone(),
            match_id: self.environment.match_id.clone(),
            server: server_name.to_owned(),
            game_length,
            teams,
        };
        self.send(&idem_protocol::complete_match(&result))
    }

    /// Reports that the match could not take place. Every player is
    /// removed from matchmaking.
    ///
    /// # Errors
    /// [`ServerError::InvalidMatchState`] unless the match is `Created`,
    /// otherwise the errors of a send.
    pub fn fail_match(&mut self) -> Result<(), ServerError> {
        if self.match_state != MatchState::Created {
            return Err(self.wrong_state("fail match"));
        }
        let request = idem_protocol::fail_match(
            &self.environment.game_id,
            &self.environment.match_id,
            self.environment.all_player_ids(),
            Vec::new(),
        );
        self.send(&request)
    }

    /// Sends a request, allowing one unanswered request at a time.
    ///
    /// # Errors
    /// - [`ServerError::RequestOutstanding`] if the last request was sent
    ///   less than [`RESPONSE_TIMEOUT`] ago and not yet answered.
    /// - [`ServerError::NotReady`] if the transport isn't open.
    pub fn send(&mut self, request: &Request) -> Result<(), ServerError> {
        if let Some(since) = self.outstanding_since {
            if since.elapsed() < RESPONSE_TIMEOUT {
                tracing::error!(action = request.action(), "another request is outstanding");
                return Err(ServerError::RequestOutstanding);
            }
        }

        let text = idem_protocol::encode(request)?;
        let ready = if self.connection.is_some() {
            self.transport.ready_state()
        } else {
            ReadyState::Closed
        };
        if ready != ReadyState::Open {
            tracing::error!(action = request.action(), %ready, "send on a connection that is not open");
            return Err(ServerError::NotReady(ready));
        }

        tracing::debug!(action = request.action(), "sending request");
        self.outstanding_since = Some(Instant::now());
        self.transport.send(text)?;
        Ok(())
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
                tracing::info!(%id, "Idem connection open");
                self.attempt = None;
                self.outstanding_since = None;
                self.connect_attempts = 0;
                self.backoff.reset();
                self.publish(ServerEvent::Connected);
                self.resolve(StartOutcome::Ready);
            }
            TransportEvent::Message { text, .. } => self.handle_message(&text),
            TransportEvent::Error { id, detail } => {
                tracing::warn!(%id, %detail, "Idem connection error");
                // On an established connection the close event follows.
                if self.attempt.take().is_some() {
                    self.transport.close();
                    self.connection = None;
                    self.publish(ServerEvent::Disconnected);
                    self.schedule_restart();
                }
            }
            TransportEvent::Closed { id, code, reason } => {
                tracing::info!(%id, ?code, %reason, "Idem connection closed");
                self.connection = None;
                self.attempt = None;
                self.publish(ServerEvent::Disconnected);
                self.schedule_restart();
            }
        }
    }

    fn handle_message(&mut self, text: &str) {
        tracing::trace!(text, "message received");
        self.outstanding_since = None;

        let Some(message) = idem_protocol::decode(text) else {
            tracing::warn!(text, "failed to parse message");
            return;
        };

        match message {
            Message::CompleteMatchResponse(_) => {
                self.set_match_state(MatchState::Completed);
                if self.config.quit_after_result_reporting {
                    tracing::info!("quitting after reporting results");
                    self.exit(ExitCode::Normal);
                }
            }
            Message::FailMatchResponse(_) => {
                tracing::info!("quitting after failing match");
                self.set_match_state(MatchState::Failed);
                self.exit(ExitCode::FailedMatch);
            }
            Message::ConfirmMatchResponse(frame) => {
                tracing::info!(match_id = %frame.payload.match_id, "match confirmed");
                self.set_match_state(MatchState::Confirmed);
            }
            Message::KeepAlive(_) => {}
            other => tracing::debug!(action = other.action(), "unhandled message"),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn fail_authorization(&mut self, reason: &str) {
        tracing::error!(reason, "could not authorize with Idem");
        if self.config.quit_on_crit_error {
            self.exit(ExitCode::CannotAuthorize);
        }
        self.set_match_state(MatchState::Failed);
        self.attempt = None;
        self.resolve(StartOutcome::Failed);
    }

    fn schedule_restart(&mut self) {
        if self.config.auto_restart {
            let delay = self.backoff.next_delay();
            tracing::info!(delay_secs = delay.as_secs(), "reconnecting");
            self.effects.push(ServerEffect::ScheduleStart(delay));
        } else {
            self.resolve(StartOutcome::Failed);
        }
    }

    fn resolve(&mut self, outcome: StartOutcome) {
        self.effects.push(ServerEffect::ResolveStart(outcome));
    }

    fn publish(&mut self, event: ServerEvent) {
        self.effects.push(ServerEffect::Publish(event));
    }

    fn set_match_state(&mut self, state: MatchState) {
        if self.match_state == state {
            return;
        }
        self.match_state = state;
        tracing::info!(%state, "match state changed");
        self.publish(ServerEvent::MatchStateChanged(state));
    }

    fn exit(&mut self, code: ExitCode) {
        self.publish(ServerEvent::ExitRequested(code));
        self.host.exit(code);
    }

    fn wrong_state(&self, operation: &'static str) -> ServerError {
        tracing::error!(operation, state = %self.match_state, "wrong match state");
        ServerError::InvalidMatchState {
            operation,
            state: self.match_state,
        }
    }
}
