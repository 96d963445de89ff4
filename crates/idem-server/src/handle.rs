//! Server actor: a Tokio task that owns a [`ServerSession`].
//!
//! Three inputs feed one `select!` loop: commands from [`IdemServer`]
//! handles, transport notifications, and results of authentication runs
//! spawned by the actor. Reconnect timers are small tasks that post a
//! `Start` command back to the mailbox; they are aborted on stop.

use std::sync::Arc;

use idem_protocol::TeamResult;
use idem_session::{Authenticator, CredentialStore, IdemConfig, SessionError};
use idem_transport::{EventReceiver, Transport, event_channel};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::session::StartStep;
use crate::{
    HostProcess, MatchEnvironment, MatchState, ServerEffect, ServerError, ServerEvent,
    ServerSession, StartOutcome,
};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<T>;
type AuthResult = (u64, Result<String, SessionError>);

/// Commands sent to the server actor.
enum ServerCommand {
    /// `reply` is `None` for a reconnect timer.
    Start {
        reply: Option<Reply<StartOutcome>>,
    },
    ConfirmMatch {
        reply: Reply<Result<(), ServerError>>,
    },
    CompleteMatch {
        game_length: f32,
        server_name: String,
        teams: Vec<TeamResult>,
        reply: Reply<Result<(), ServerError>>,
    },
    FailMatch {
        reply: Reply<Result<(), ServerError>>,
    },
    Status {
        reply: Reply<ServerStatus>,
    },
    Environment {
        reply: Reply<MatchEnvironment>,
    },
    Stop {
        reply: Reply<()>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

/// A snapshot of the server's connection and match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStatus {
    pub match_state: MatchState,
    pub ready: bool,
    pub starting: bool,
}

/// Handle to a running game server connection.
///
/// Cheap to clone. The actor stops on [`shutdown`](Self::shutdown) or when
/// every handle has been dropped.
#[derive(Clone)]
pub struct IdemServer {
    commands: mpsc::Sender<ServerCommand>,
    events: broadcast::Sender<ServerEvent>,
}

impl IdemServer {
    /// Spawns the actor on the current Tokio runtime.
    ///
    /// The match environment is validated right away; see
    /// [`ServerSession::new`].
    pub fn spawn<T, S, H, A>(
        config: IdemConfig,
        credentials: S,
        environment: MatchEnvironment,
        authenticator: A,
        transport: T,
        host: H,
    ) -> Self
    where
        T: Transport,
        S: CredentialStore,
        H: HostProcess,
        A: Authenticator,
    {
        let (transport_tx, transport_rx) = event_channel();
        let session =
            ServerSession::new(config, credentials, environment, transport, host, transport_tx);

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (auth_tx, auth_rx) = mpsc::unbounded_channel();

        let actor = ServerActor {
            session,
            authenticator: Arc::new(authenticator),
            commands: command_rx,
            timer_commands: command_tx.downgrade(),
            transport_events: transport_rx,
            auth_results: auth_rx,
            auth_tx,
            events: event_tx.clone(),
            waiters: Vec::new(),
            timers: Vec::new(),
        };
        tokio::spawn(actor.run());

        Self {
            commands: command_tx,
            events: event_tx,
        }
    }

    /// Receives every [`ServerEvent`] published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    /// Connects to the backend and resolves once the attempt ends.
    ///
    /// Calls made while an attempt is in flight resolve with that attempt.
    /// A caller keeps waiting across automatic reconnects until the
    /// connection opens or fails for good.
    pub async fn start(&self) -> Result<StartOutcome, ServerError> {
        self.request(|reply| ServerCommand::Start { reply: Some(reply) })
            .await
    }

    /// See [`ServerSession::confirm_match`].
    pub async fn confirm_match(&self) -> Result<(), ServerError> {
        self.request(|reply| ServerCommand::ConfirmMatch { reply })
            .await?
    }

    /// See [`ServerSession::complete_match`].
    pub async fn complete_match(
        &self,
        game_length: f32,
        server_name: impl Into<String>,
        teams: Vec<TeamResult>,
    ) -> Result<(), ServerError> {
        let server_name = server_name.into();
        self.request(|reply| ServerCommand::CompleteMatch {
            game_length,
            server_name,
            teams,
            reply,
        })
        .await?
    }

    /// See [`ServerSession::fail_match`].
    pub async fn fail_match(&self) -> Result<(), ServerError> {
        self.request(|reply| ServerCommand::FailMatch { reply }).await?
    }

    pub async fn status(&self) -> Result<ServerStatus, ServerError> {
        self.request(|reply| ServerCommand::Status { reply }).await
    }

    pub async fn match_state(&self) -> Result<MatchState, ServerError> {
        Ok(self.status().await?.match_state)
    }

    pub async fn is_server_ready(&self) -> Result<bool, ServerError> {
        Ok(self.status().await?.ready)
    }

    pub async fn environment(&self) -> Result<MatchEnvironment, ServerError> {
        self.request(|reply| ServerCommand::Environment { reply })
            .await
    }

    /// Closes the connection and cancels pending reconnects. The actor
    /// keeps running; `start` may be called again.
    pub async fn stop(&self) -> Result<(), ServerError> {
        self.request(|reply| ServerCommand::Stop { reply }).await
    }

    /// Stops and ends the actor.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        self.request(|reply| ServerCommand::Shutdown { reply }).await
    }

    async fn request<R>(
        &self,
        command: impl FnOnce(Reply<R>) -> ServerCommand,
    ) -> Result<R, ServerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| ServerError::Unavailable)?;
        reply_rx.await.map_err(|_| ServerError::Unavailable)
    }
}

struct ServerActor<T, S, H, A> {
    session: ServerSession<T, S, H>,
    authenticator: Arc<A>,
    commands: mpsc::Receiver<ServerCommand>,
    /// Weak so that pending timers don't keep the actor alive.
    timer_commands: mpsc::WeakSender<ServerCommand>,
    transport_events: EventReceiver,
    auth_results: mpsc::UnboundedReceiver<AuthResult>,
    auth_tx: mpsc::UnboundedSender<AuthResult>,
    events: broadcast::Sender<ServerEvent>,
    waiters: Vec<Reply<StartOutcome>>,
    timers: Vec<JoinHandle<()>>,
}

impl<T, S, H, A> ServerActor<T, S, H, A>
where
    T: Transport,
    S: CredentialStore,
    H: HostProcess,
    A: Authenticator,
{
    async fn run(mut self) {
        tracing::debug!(match_id = %self.session.environment().match_id, "server actor started");
        self.apply_effects();

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(ServerCommand::Shutdown { reply }) => {
                        self.stop();
                        let _ = reply.send(());
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        self.stop();
                        break;
                    }
                },
                Some(event) = self.transport_events.recv() => {
                    self.session.handle_transport_event(event);
                }
                Some((generation, result)) = self.auth_results.recv() => {
                    self.session.on_authenticated(generation, result);
                }
            }
            self.apply_effects();
        }

        tracing::debug!("server actor stopped");
    }

    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Start { reply } => {
                if let Some(reply) = reply {
                    self.waiters.push(reply);
                }
                if let StartStep::Authenticate(request) = self.session.start() {
                    let authenticator = Arc::clone(&self.authenticator);
                    let results = self.auth_tx.clone();
                    tokio::spawn(async move {
                        let result = authenticator
                            .authenticate(&request.username, &request.password, &request.client_id)
                            .await;
                        let _ = results.send((request.generation, result));
                    });
                }
            }
            ServerCommand::ConfirmMatch { reply } => {
                let _ = reply.send(self.session.confirm_match());
            }
            ServerCommand::CompleteMatch {
                game_length,
                server_name,
                teams,
                reply,
            } => {
                let result = self
                    .session
                    .complete_match(game_length, &server_name, teams);
                let _ = reply.send(result);
            }
            ServerCommand::FailMatch { reply } => {
                let _ = reply.send(self.session.fail_match());
            }
            ServerCommand::Status { reply } => {
                let _ = reply.send(ServerStatus {
                    match_state: self.session.match_state(),
                    ready: self.session.is_server_ready(),
                    starting: self.session.is_starting(),
                });
            }
            ServerCommand::Environment { reply } => {
                let _ = reply.send(self.session.environment().clone());
            }
            ServerCommand::Stop { reply } => {
                self.stop();
                let _ = reply.send(());
            }
            ServerCommand::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn stop(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
        self.session.stop();
        self.apply_effects();
    }

    fn apply_effects(&mut self) {
        for effect in self.session.drain_effects() {
            match effect {
                ServerEffect::Publish(event) => {
                    let _ = self.events.send(event);
                }
                ServerEffect::ResolveStart(outcome) => {
                    for waiter in self.waiters.drain(..) {
                        let _ = waiter.send(outcome);
                    }
                }
                ServerEffect::ScheduleStart(delay) => {
                    let commands = self.timer_commands.clone();
                    self.timers.retain(|timer| !timer.is_finished());
                    self.timers.push(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        if let Some(commands) = commands.upgrade() {
                            let _ = commands.send(ServerCommand::Start { reply: None }).await;
                        }
                    }));
                }
            }
        }
    }
}
