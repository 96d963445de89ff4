//! Matchmaking client for the Idem backend.
//!
//! A client connects as one player, queues for a game mode and waits for
//! the backend to find a match and hand out join info for the allocated
//! game server.
//!
//! - [`ClientSession`] is the state machine. It is synchronous and owns
//!   its [`Transport`](idem_transport::Transport); tests drive it directly.
//! - [`IdemClient`] runs a session in a Tokio task and exposes it as an
//!   async handle with an event stream.
//!
//! # Lifecycle
//!
//! ```text
//! find_match ──→ Connecting ──(open)──→ Connected ──(addPlayer sent)──→ MatchmakingRequested
//!   ──(addPlayerResponse)──→ MatchmakingConfirmed ──(matchFound)──→ MatchFound
//!   ──(joinInfo)──→ JoinInfoReceived
//! ```
//!
//! A `requeueRequired` from the backend drops the connection and replays
//! the last queue request on a fresh one.

mod error;
mod event;
mod handle;
mod session;
mod state;

pub use error::ClientError;
pub use event::ClientEvent;
pub use handle::IdemClient;
pub use session::ClientSession;
pub use state::{ConnectionState, MatchmakingIntent, SuggestedMatch};
