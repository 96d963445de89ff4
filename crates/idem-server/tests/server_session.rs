//! Drives the server state machine synchronously through a mock transport.

use std::time::Duration;

use idem_protocol::{PlayerResult, TeamResult};
use idem_server::{
    AuthRequest, ExitCode, MatchEnvironment, MatchState, PlayerRating, RecordingHost,
    ServerEffect, ServerError, ServerEvent, ServerSession, StartOutcome, StartStep,
};
use idem_session::{IdemConfig, MemoryCredentials, SessionError, credentials};
use idem_transport::mock::MockTransport;
use idem_transport::{EventReceiver, ReadyState, event_channel};

type Session = ServerSession<MockTransport, MemoryCredentials, RecordingHost>;

struct Harness {
    session: Session,
    mock: MockTransport,
    host: RecordingHost,
    rx: EventReceiver,
}

fn environment() -> MatchEnvironment {
    MatchEnvironment::new(
        "1v1",
        "m-1",
        vec![
            vec![PlayerRating::new("alice", 1500.0)],
            vec![PlayerRating::new("bob", 1480.0)],
        ],
    )
}

fn server_credentials() -> MemoryCredentials {
    MemoryCredentials::new()
        .with(credentials::USER_NAME, "server-user")
        .with(credentials::PASSWORD, "hunter2")
}

impl Harness {
    fn with(config: IdemConfig, environment: MatchEnvironment) -> Self {
        let mock = MockTransport::new();
        let host = RecordingHost::new();
        let (tx, rx) = event_channel();
        let session = ServerSession::new(
            config,
            server_credentials(),
            environment,
            mock.clone(),
            host.clone(),
            tx,
        );
        Self {
            session,
            mock,
            host,
            rx,
        }
    }

    fn new() -> Self {
        Self::with(IdemConfig::default(), environment())
    }

    fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.session.handle_transport_event(event);
        }
    }

    fn authenticate(&mut self) -> AuthRequest {
        match self.session.start() {
            StartStep::Authenticate(request) => request,
            other => panic!("expected a new attempt, got {other:?}"),
        }
    }

    /// Runs a full start: authenticate, connect, open.
    fn ready() -> Self {
        let mut h = Self::new();
        let request = h.authenticate();
        h.session
            .on_authenticated(request.generation, Ok("tok".into()));
        h.mock.emit_open().unwrap();
        h.pump();
        h.session.drain_effects();
        h
    }

    fn receive(&mut self, text: &str) {
        self.mock.emit_message(text).unwrap();
        self.pump();
    }
}

const CONFIRMED: &str =
    r#"{"action":"updateMatchConfirmedResponse","payload":{"gameId":"1v1","matchId":"m-1"}}"#;
const COMPLETED: &str =
    r#"{"action":"updateMatchCompletedResponse","payload":{"gameId":"1v1","matchId":"m-1","players":[]}}"#;
const FAILED: &str =
    r#"{"action":"updateMatchFailedResponse","payload":{"gameId":"1v1","matchId":"m-1"}}"#;

fn teams() -> Vec<TeamResult> {
    vec![
        TeamResult {
            rank: 0,
            players: vec![PlayerResult::new("alice", 10.0)],
        },
        TeamResult {
            rank: 1,
            players: vec![PlayerResult::new("bob", 4.0)],
        },
    ]
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn test_new_valid_environment_is_created() {
    let h = Harness::new();
    assert_eq!(h.session.match_state(), MatchState::Created);
    assert!(h.host.exits().is_empty());
}

#[test]
fn test_new_invalid_environment_exits_when_configured() {
    let h = Harness::with(IdemConfig::default(), MatchEnvironment::default());
    assert_eq!(h.session.match_state(), MatchState::None);
    assert_eq!(h.host.exits(), vec![ExitCode::InvalidEnvironment]);
}

#[test]
fn test_new_invalid_environment_without_quit_stays_alive() {
    let config = IdemConfig::default().with_quit_on_crit_error(false);
    let h = Harness::with(config, MatchEnvironment::default());
    assert_eq!(h.session.match_state(), MatchState::None);
    assert!(h.host.exits().is_empty());
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

#[test]
fn test_start_authenticates_with_stored_credentials() {
    let mut h = Harness::new();
    let request = h.authenticate();
    assert_eq!(request.username, "server-user");
    assert_eq!(request.password, "hunter2");
    assert_eq!(request.client_id, "3b7bo4gjuqsjuer6eatjsgo58u");
    assert_eq!(h.session.connect_attempts(), 1);
}

#[test]
fn test_start_while_in_flight_joins_the_attempt() {
    let mut h = Harness::new();
    let request = h.authenticate();
    assert_eq!(h.session.start(), StartStep::Pending);

    h.session.on_authenticated(request.generation, Ok("tok".into()));
    assert_eq!(h.session.start(), StartStep::Pending);
    assert_eq!(
        h.mock.connects(),
        vec!["wss://ws-int.idem.gg?authorization=tok".to_string()]
    );

    h.mock.emit_open().unwrap();
    h.pump();
    assert!(h.session.is_server_ready());
    let effects = h.session.drain_effects();
    assert!(effects.contains(&ServerEffect::ResolveStart(StartOutcome::Ready)));
    assert!(effects.contains(&ServerEffect::Publish(ServerEvent::Connected)));
    assert_eq!(h.mock.connects().len(), 1);
}

#[test]
fn test_stale_authentication_result_is_ignored() {
    let mut h = Harness::new();
    let first = h.authenticate();
    h.session.stop();
    let second = h.authenticate();
    assert_ne!(first.generation, second.generation);

    h.session.on_authenticated(first.generation, Ok("old".into()));
    assert!(h.mock.connects().is_empty());

    h.session.on_authenticated(second.generation, Ok("new".into()));
    assert_eq!(
        h.mock.connects(),
        vec!["wss://ws-int.idem.gg?authorization=new".to_string()]
    );
}

#[test]
fn test_token_is_percent_encoded_in_connect_url() {
    let mut h = Harness::new();
    let request = h.authenticate();
    h.session
        .on_authenticated(request.generation, Ok("a+b/c=".into()));
    assert_eq!(
        h.mock.connects(),
        vec!["wss://ws-int.idem.gg?authorization=a%2Bb%2Fc%3D".to_string()]
    );
}

#[test]
fn test_blank_token_fails_authorization() {
    let mut h = Harness::new();
    let request = h.authenticate();
    h.session.on_authenticated(request.generation, Ok("   ".into()));

    assert_eq!(h.session.match_state(), MatchState::Failed);
    assert_eq!(h.host.exits(), vec![ExitCode::CannotAuthorize]);
    assert!(!h.session.is_starting());
    assert!(
        h.session
            .drain_effects()
            .contains(&ServerEffect::ResolveStart(StartOutcome::Failed))
    );
    assert!(h.mock.connects().is_empty());
}

#[test]
fn test_rejected_credentials_fail_authorization() {
    let mut h = Harness::new();
    let request = h.authenticate();
    h.session.on_authenticated(
        request.generation,
        Err(SessionError::AuthFailed("bad password".into())),
    );
    assert_eq!(h.session.match_state(), MatchState::Failed);
    assert_eq!(h.host.exits(), vec![ExitCode::CannotAuthorize]);
}

#[test]
fn test_unreachable_identity_provider_is_a_connect_failure() {
    let mut h = Harness::new();
    let request = h.authenticate();
    h.session.on_authenticated(
        request.generation,
        Err(SessionError::AuthUnavailable("timeout".into())),
    );
    assert_eq!(h.session.match_state(), MatchState::Created);
    assert_eq!(h.host.exits(), vec![ExitCode::CannotConnect]);
    assert!(!h.session.is_starting());
}

#[test]
fn test_missing_credentials_fail_authorization() {
    let mock = MockTransport::new();
    let host = RecordingHost::new();
    let (tx, _rx) = event_channel();
    let mut session = ServerSession::new(
        IdemConfig::default().with_quit_on_crit_error(false),
        MemoryCredentials::new(),
        environment(),
        mock,
        host.clone(),
        tx,
    );
    assert_eq!(session.start(), StartStep::Resolved(StartOutcome::Failed));
    assert_eq!(session.match_state(), MatchState::Failed);
    assert!(host.exits().is_empty());
}

#[test]
fn test_start_after_max_attempts_is_exhausted() {
    let config = IdemConfig::default().with_max_connect_attempts(1);
    let mut h = Harness::with(config, environment());
    let request = h.authenticate();
    h.session.on_authenticated(request.generation, Ok("tok".into()));
    h.mock.emit_error("refused").unwrap();
    h.pump();

    assert_eq!(h.session.start(), StartStep::Resolved(StartOutcome::Exhausted));
    assert_eq!(h.host.exits(), vec![ExitCode::CannotConnect]);
}

// ---------------------------------------------------------------------------
// Reconnect
// ---------------------------------------------------------------------------

fn scheduled(effects: &[ServerEffect]) -> Vec<Duration> {
    effects
        .iter()
        .filter_map(|e| match e {
            ServerEffect::ScheduleStart(delay) => Some(*delay),
            _ => None,
        })
        .collect()
}

#[test]
fn test_errors_while_connecting_schedule_restarts_with_backoff() {
    let mut h = Harness::new();
    let mut delays = Vec::new();
    for _ in 0..4 {
        let request = h.authenticate();
        h.session.on_authenticated(request.generation, Ok("tok".into()));
        h.mock.emit_error("refused").unwrap();
        h.pump();
        assert!(!h.session.is_starting());
        delays.extend(scheduled(&h.session.drain_effects()));
    }
    assert_eq!(
        delays,
        vec![0, 1, 2, 4]
            .into_iter()
            .map(Duration::from_secs)
            .collect::<Vec<_>>()
    );
    assert_eq!(h.mock.close_count(), 4);
}

#[test]
fn test_open_resets_backoff_and_attempts() {
    let mut h = Harness::new();
    for _ in 0..2 {
        let request = h.authenticate();
        h.session.on_authenticated(request.generation, Ok("tok".into()));
        h.mock.emit_error("refused").unwrap();
        h.pump();
    }
    let request = h.authenticate();
    h.session.on_authenticated(request.generation, Ok("tok".into()));
    h.mock.emit_open().unwrap();
    h.pump();
    assert_eq!(h.session.connect_attempts(), 0);
    h.session.drain_effects();

    h.mock.emit_closed("bye").unwrap();
    h.pump();
    let effects = h.session.drain_effects();
    assert_eq!(scheduled(&effects), vec![Duration::ZERO]);
    assert!(effects.contains(&ServerEffect::Publish(ServerEvent::Disconnected)));
}

#[test]
fn test_error_on_open_connection_waits_for_close() {
    let mut h = Harness::ready();
    h.session.drain_effects();

    h.mock.emit_error("reset").unwrap();
    h.pump();
    assert!(scheduled(&h.session.drain_effects()).is_empty());

    h.mock.emit_closed("reset").unwrap();
    h.pump();
    assert_eq!(scheduled(&h.session.drain_effects()), vec![Duration::ZERO]);
}

#[test]
fn test_failure_without_auto_restart_resolves_waiters() {
    let config = IdemConfig::default().with_auto_restart(false);
    let mut h = Harness::with(config, environment());
    let request = h.authenticate();
    h.session.on_authenticated(request.generation, Ok("tok".into()));
    h.mock.emit_error("refused").unwrap();
    h.pump();
    let effects = h.session.drain_effects();
    assert!(scheduled(&effects).is_empty());
    assert!(effects.contains(&ServerEffect::ResolveStart(StartOutcome::Failed)));
}

#[test]
fn test_stop_resolves_and_closes() {
    let mut h = Harness::ready();
    h.session.stop();
    assert_eq!(h.mock.close_count(), 1);
    assert!(!h.session.is_server_ready());
    assert!(
        h.session
            .drain_effects()
            .contains(&ServerEffect::ResolveStart(StartOutcome::Stopped))
    );
}

// ---------------------------------------------------------------------------
// Match reporting
// ---------------------------------------------------------------------------

#[test]
fn test_confirm_then_complete_reaches_completed_and_exits() {
    let mut h = Harness::ready();
    h.session.confirm_match().unwrap();
    let sent: serde_json::Value = serde_json::from_str(&h.mock.sent()[0]).unwrap();
    assert_eq!(sent["action"], "updateMatchConfirmed");
    assert_eq!(sent["payload"]["matchId"], "m-1");

    h.receive(CONFIRMED);
    assert_eq!(h.session.match_state(), MatchState::Confirmed);

    h.session.complete_match(42.0, "mainServer", teams()).unwrap();
    let sent: serde_json::Value = serde_json::from_str(&h.mock.sent()[1]).unwrap();
    assert_eq!(sent["action"], "updateMatchCompleted");
    assert_eq!(sent["payload"]["gameLength"], 42.0);
    assert_eq!(sent["payload"]["server"], "mainServer");
    assert_eq!(sent["payload"]["teams"][1]["players"][0]["playerId"], "bob");

    h.receive(COMPLETED);
    assert_eq!(h.session.match_state(), MatchState::Completed);
    assert_eq!(h.host.exits(), vec![ExitCode::Normal]);
}

#[test]
fn test_complete_without_result_exit_keeps_running() {
    let config = IdemConfig::default().with_quit_after_result_reporting(false);
    let mut h = Harness::with(config, environment());
    let request = h.authenticate();
    h.session.on_authenticated(request.generation, Ok("tok".into()));
    h.mock.emit_open().unwrap();
    h.pump();

    h.session.confirm_match().unwrap();
    h.receive(CONFIRMED);
    h.session.complete_match(1.0, "s", teams()).unwrap();
    h.receive(COMPLETED);
    assert_eq!(h.session.match_state(), MatchState::Completed);
    assert!(h.host.exits().is_empty());
}

#[test]
fn test_complete_before_confirmed_is_rejected() {
    let mut h = Harness::ready();
    let err = h
        .session
        .complete_match(1.0, "s", teams())
        .unwrap_err();
    assert!(matches!(
        err,
        ServerError::InvalidMatchState {
            state: MatchState::Created,
            ..
        }
    ));
    assert!(h.mock.sent().is_empty());
}

#[test]
fn test_confirm_after_confirmed_is_rejected() {
    let mut h = Harness::ready();
    h.session.confirm_match().unwrap();
    h.receive(CONFIRMED);
    assert!(matches!(
        h.session.confirm_match(),
        Err(ServerError::InvalidMatchState { .. })
    ));
}

#[test]
fn test_fail_match_removes_every_player_and_exits() {
    let config = IdemConfig::default()
        .with_quit_on_crit_error(false)
        .with_quit_after_result_reporting(false);
    let mut h = Harness::with(config, environment());
    let request = h.authenticate();
    h.session.on_authenticated(request.generation, Ok("tok".into()));
    h.mock.emit_open().unwrap();
    h.pump();

    h.session.fail_match().unwrap();
    let sent: serde_json::Value = serde_json::from_str(&h.mock.sent()[0]).unwrap();
    assert_eq!(sent["action"], "updateMatchFailed");
    assert_eq!(sent["payload"]["remove"], serde_json::json!(["alice", "bob"]));
    assert_eq!(sent["payload"]["requeue"], serde_json::json!([]));

    h.receive(FAILED);
    assert_eq!(h.session.match_state(), MatchState::Failed);
    assert_eq!(h.host.exits(), vec![ExitCode::FailedMatch]);
}

#[test]
fn test_fail_match_after_confirmed_is_rejected() {
    let mut h = Harness::ready();
    h.session.confirm_match().unwrap();
    h.receive(CONFIRMED);
    assert!(matches!(
        h.session.fail_match(),
        Err(ServerError::InvalidMatchState { operation: "fail match", .. })
    ));
}

#[test]
fn test_send_without_connection_is_not_ready() {
    let mut h = Harness::new();
    assert!(matches!(
        h.session.confirm_match(),
        Err(ServerError::NotReady(ReadyState::Closed))
    ));
}

#[test]
fn test_any_inbound_message_clears_outstanding_request() {
    let mut h = Harness::ready();
    h.session.confirm_match().unwrap();
    assert!(matches!(
        h.session.confirm_match(),
        Err(ServerError::RequestOutstanding)
    ));

    h.receive(r#"{"action":"keepAlive"}"#);
    h.session.confirm_match().unwrap();
    assert_eq!(h.mock.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_outstanding_request_expires_after_response_timeout() {
    let mut h = Harness::ready();
    h.session.confirm_match().unwrap();

    tokio::time::advance(Duration::from_secs(29)).await;
    assert!(matches!(
        h.session.confirm_match(),
        Err(ServerError::RequestOutstanding)
    ));

    tokio::time::advance(Duration::from_secs(2)).await;
    h.session.confirm_match().unwrap();
    assert_eq!(h.mock.sent().len(), 2);
}
