//! # Idem
//!
//! Client and game server runtime for the Idem matchmaking backend.
//!
//! Two roles share one configuration:
//!
//! - a **client** queues a player for a game mode and receives join info
//!   for the game server the backend allocated;
//! - a **game server** reads its match from the process environment,
//!   confirms the match with the backend, and reports the result.
//!
//! Both talk to the backend over one persistent WebSocket using JSON
//! frames tagged by `action`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use idem::prelude::*;
//!
//! # async fn demo() -> Result<(), IdemError> {
//! let runtime = IdemRuntime::builder()
//!     .config(IdemConfig::default().with_game_id("1v1"))
//!     .build()?;
//!
//! let client = runtime.client(StaticIdentity::new("player_42"));
//! let mut events = client.subscribe();
//! client.find_match("1v1", vec!["fra".into()]).await?;
//! while let Ok(event) = events.recv().await {
//!     if let ClientEvent::JoinInfoReceived(info) = event {
//!         println!("join {:?}", info.connection_info());
//!         break;
//!     }
//! }
//! # Ok(()) }
//! ```

mod error;
mod runtime;

pub use error::IdemError;
pub use runtime::{IdemRuntime, IdemRuntimeBuilder};

pub use idem_client as client;
pub use idem_protocol as protocol;
pub use idem_server as server;
pub use idem_session as session;
pub use idem_transport as transport;

/// Common imports for applications.
pub mod prelude {
    pub use crate::{IdemError, IdemRuntime, IdemRuntimeBuilder};
    pub use idem_client::{ClientError, ClientEvent, ConnectionState, IdemClient, SuggestedMatch};
    pub use idem_protocol::{JoinInfo, MatchResult, PlayerResult, TeamResult};
    pub use idem_server::{
        ExitCode, HostProcess, IdemServer, MatchEnvironment, MatchState, PlayerRating,
        ServerError, ServerEvent, StartOutcome,
    };
    pub use idem_session::{
        Authenticator, CredentialStore, EnvCredentials, IdemConfig, MemoryCredentials,
        PlayerIdentity, ServerType, SessionError, StaticIdentity, StaticToken, credentials,
    };
}
