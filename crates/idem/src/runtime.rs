//! `IdemRuntime` builder.
//!
//! The runtime holds what the client and server roles share: the
//! [`IdemConfig`] and a credential store. It spawns either role on the
//! current Tokio runtime, over a WebSocket by default.

use idem_client::IdemClient;
use idem_server::{HostProcess, IdemServer, MatchEnvironment, StdProcess};
use idem_session::{Authenticator, CredentialStore, EnvCredentials, IdemConfig, PlayerIdentity};
use idem_transport::{Transport, WebSocketTransport};

use crate::IdemError;

/// Builder for an [`IdemRuntime`].
///
/// # Example
///
/// ```rust,no_run
/// use idem::prelude::*;
///
/// # async fn demo() -> Result<(), IdemError> {
/// let runtime = IdemRuntime::builder()
///     .config(IdemConfig::default().with_game_id("2v2"))
///     .credentials(MemoryCredentials::new().with(credentials::JOIN_CODE, "code"))
///     .build()?;
/// let client = runtime.client(StaticIdentity::new("player_1"));
/// client.find_match("2v2", vec!["fra".into()]).await?;
/// # Ok(()) }
/// ```
pub struct IdemRuntimeBuilder<S = EnvCredentials> {
    config: IdemConfig,
    credentials: S,
}

impl IdemRuntimeBuilder {
    /// Creates a builder with the default config, reading credentials from
    /// `IDEM_*` environment variables.
    pub fn new() -> Self {
        Self {
            config: IdemConfig::default(),
            credentials: EnvCredentials::default(),
        }
    }
}

impl Default for IdemRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> IdemRuntimeBuilder<S> {
    /// Sets the configuration.
    pub fn config(mut self, config: IdemConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the credential store.
    pub fn credentials<C>(self, credentials: C) -> IdemRuntimeBuilder<C>
    where
        C: CredentialStore + Clone,
    {
        IdemRuntimeBuilder {
            config: self.config,
            credentials,
        }
    }
}

impl<S> IdemRuntimeBuilder<S>
where
    S: CredentialStore + Clone,
{
    /// Validates the configuration and builds the runtime.
    pub fn build(self) -> Result<IdemRuntime<S>, IdemError> {
        self.config.validate()?;
        tracing::debug!(
            game_id = %self.config.game_id,
            url = %self.config.connection_url(),
            "idem runtime configured"
        );
        Ok(IdemRuntime {
            config: self.config,
            credentials: self.credentials,
        })
    }
}

/// A validated configuration, ready to spawn clients and servers.
#[derive(Debug, Clone)]
pub struct IdemRuntime<S = EnvCredentials> {
    config: IdemConfig,
    credentials: S,
}

impl IdemRuntime {
    /// Creates a new builder.
    pub fn builder() -> IdemRuntimeBuilder {
        IdemRuntimeBuilder::new()
    }
}

impl<S> IdemRuntime<S>
where
    S: CredentialStore + Clone,
{
    pub fn config(&self) -> &IdemConfig {
        &self.config
    }

    pub fn credentials(&self) -> &S {
        &self.credentials
    }

    /// Spawns a matchmaking client for `identity` over a WebSocket.
    pub fn client<I: PlayerIdentity>(&self, identity: I) -> IdemClient {
        self.client_with_transport(identity, WebSocketTransport::new())
    }

    /// Spawns a matchmaking client over `transport`.
    pub fn client_with_transport<I, T>(&self, identity: I, transport: T) -> IdemClient
    where
        I: PlayerIdentity,
        T: Transport,
    {
        IdemClient::spawn(
            self.config.clone(),
            identity,
            self.credentials.clone(),
            transport,
        )
    }

    /// Spawns the game server connection for the match described by the
    /// process environment. The process exits when the match is over.
    pub fn server<A: Authenticator>(&self, authenticator: A) -> IdemServer {
        self.server_with(
            MatchEnvironment::from_env(),
            authenticator,
            WebSocketTransport::new(),
            StdProcess,
        )
    }

    /// Spawns the game server connection with every collaborator supplied.
    pub fn server_with<A, T, H>(
        &self,
        environment: MatchEnvironment,
        authenticator: A,
        transport: T,
        host: H,
    ) -> IdemServer
    where
        A: Authenticator,
        T: Transport,
        H: HostProcess,
    {
        IdemServer::spawn(
            self.config.clone(),
            self.credentials.clone(),
            environment,
            authenticator,
            transport,
            host,
        )
    }
}
