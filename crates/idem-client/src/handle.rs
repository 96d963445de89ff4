//! Client actor: a Tokio task that owns a [`ClientSession`].
//!
//! Public calls become [`ClientCommand`]s on an mpsc mailbox; transport
//! notifications arrive on a second channel. One `select!` loop serializes
//! both, so the session is only ever touched from the actor task.

use idem_protocol::JoinInfo;
use idem_session::{CredentialStore, IdemConfig, PlayerIdentity};
use idem_transport::{EventReceiver, Transport, event_channel};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::{ClientError, ClientEvent, ClientSession, ConnectionState, SuggestedMatch};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<T>;

/// Commands sent to the client actor.
enum ClientCommand {
    FindMatch {
        game_id: String,
        servers: Vec<String>,
        reply: Reply<Result<(), ClientError>>,
    },
    StopMatchmaking {
        reply: Reply<()>,
    },
    Connect {
        reply: Reply<Result<(), ClientError>>,
    },
    SuggestedMatch {
        reply: Reply<Option<SuggestedMatch>>,
    },
    JoinInfo {
        reply: Reply<Option<JoinInfo>>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

/// Handle to a running matchmaking client.
///
/// Cheap to clone. The actor stops on [`shutdown`](Self::shutdown) or when
/// every handle has been dropped.
///
/// ```rust,no_run
/// # async fn demo(client: idem_client::IdemClient) -> Result<(), idem_client::ClientError> {
/// use idem_client::{ClientEvent, ConnectionState};
///
/// let mut events = client.subscribe();
/// client.find_match("1v1", vec!["fra".into()]).await?;
/// while let Ok(event) = events.recv().await {
///     if let ClientEvent::JoinInfoReceived(info) = event {
///         println!("join {:?}", info.connection_info());
///         break;
///     }
/// }
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct IdemClient {
    commands: mpsc::Sender<ClientCommand>,
    events: broadcast::Sender<ClientEvent>,
    state: watch::Receiver<ConnectionState>,
}

impl IdemClient {
    /// Spawns the actor on the current Tokio runtime.
    pub fn spawn<T, I, S>(config: IdemConfig, identity: I, credentials: S, transport: T) -> Self
    where
        T: Transport,
        I: PlayerIdentity,
        S: CredentialStore,
    {
        let (transport_tx, transport_rx) = event_channel();
        let session = ClientSession::new(config, identity, credentials, transport, transport_tx);

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (state_tx, state_rx) = watch::channel(session.state());

        let actor = ClientActor {
            session,
            commands: command_rx,
            transport_events: transport_rx,
            events: event_tx.clone(),
            state: state_tx,
        };
        tokio::spawn(actor.run());

        Self {
            commands: command_tx,
            events: event_tx,
            state: state_rx,
        }
    }

    /// Receives every [`ClientEvent`] published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Latest state published by the actor.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Waits until the client reaches `target`.
    ///
    /// # Errors
    /// Returns [`ClientError::Unavailable`] if the actor stops first.
    pub async fn wait_for_state(&self, target: ConnectionState) -> Result<(), ClientError> {
        let mut state = self.state.clone();
        state
            .wait_for(|s| *s == target)
            .await
            .map(|_| ())
            .map_err(|_| ClientError::Unavailable)
    }

    /// See [`ClientSession::find_match`].
    pub async fn find_match(
        &self,
        game_id: impl Into<String>,
        servers: Vec<String>,
    ) -> Result<(), ClientError> {
        let game_id = game_id.into();
        self.request(|reply| ClientCommand::FindMatch {
            game_id,
            servers,
            reply,
        })
        .await?
    }

    pub async fn stop_matchmaking(&self) -> Result<(), ClientError> {
        self.request(|reply| ClientCommand::StopMatchmaking { reply })
            .await
    }

    /// See [`ClientSession::connect`].
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.request(|reply| ClientCommand::Connect { reply }).await?
    }

    pub async fn suggested_match(&self) -> Result<Option<SuggestedMatch>, ClientError> {
        self.request(|reply| ClientCommand::SuggestedMatch { reply })
            .await
    }

    pub async fn join_info(&self) -> Result<Option<JoinInfo>, ClientError> {
        self.request(|reply| ClientCommand::JoinInfo { reply }).await
    }

    /// Closes the connection and stops the actor.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.request(|reply| ClientCommand::Shutdown { reply }).await
    }

    async fn request<R>(
        &self,
        command: impl FnOnce(Reply<R>) -> ClientCommand,
    ) -> Result<R, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| ClientError::Unavailable)?;
        reply_rx.await.map_err(|_| ClientError::Unavailable)
    }
}

struct ClientActor<T, I, S> {
    session: ClientSession<T, I, S>,
    commands: mpsc::Receiver<ClientCommand>,
    transport_events: EventReceiver,
    events: broadcast::Sender<ClientEvent>,
    state: watch::Sender<ConnectionState>,
}

impl<T, I, S> ClientActor<T, I, S>
where
    T: Transport,
    I: PlayerIdentity,
    S: CredentialStore,
{
    async fn run(mut self) {
        tracing::debug!("client actor started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(ClientCommand::Shutdown { reply }) => {
                        self.session.shutdown();
                        self.publish();
                        let _ = reply.send(());
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        self.session.shutdown();
                        break;
                    }
                },
                Some(event) = self.transport_events.recv() => {
                    self.session.handle_transport_event(event);
                }
            }
            self.publish();
        }

        tracing::debug!("client actor stopped");
    }

    fn handle_command(&mut self, cmd: ClientCommand) {
        match cmd {
            ClientCommand::FindMatch {
                game_id,
                servers,
                reply,
            } => {
                let _ = reply.send(self.session.find_match(&game_id, servers));
            }
            ClientCommand::StopMatchmaking { reply } => {
                self.session.stop_matchmaking();
                let _ = reply.send(());
            }
            ClientCommand::Connect { reply } => {
                let _ = reply.send(self.session.connect());
            }
            ClientCommand::SuggestedMatch { reply } => {
                let _ = reply.send(self.session.suggested_match().cloned());
            }
            ClientCommand::JoinInfo { reply } => {
                let _ = reply.send(self.session.join_info().cloned());
            }
            ClientCommand::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    /// Forwards queued session events and the current state to observers.
    fn publish(&mut self) {
        for event in self.session.drain_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
        let latest = self.session.state();
        self.state.send_if_modified(|current| {
            let changed = *current != latest;
            *current = latest;
            changed
        });
    }
}
