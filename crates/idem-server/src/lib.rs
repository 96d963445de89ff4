//! Game server side of the Idem matchmaking runtime.
//!
//! A game server is launched by the hosting provider for exactly one
//! match. It authenticates with the backend, connects, then reports the
//! match:
//!
//! ```text
//! start ──→ confirm_match ──→ complete_match ──→ exit(Normal)
//!       └─→ fail_match ──→ exit(FailedMatch)
//! ```
//!
//! - [`ServerSession`] is the synchronous state machine.
//! - [`IdemServer`] runs it in a Tokio task, performs authentication and
//!   schedules reconnects with the session's backoff.
//! - [`MatchEnvironment`] is the match description the provider passes in.
//! - [`HostProcess`] is how the server exits when the match is over.

mod environment;
mod error;
mod event;
mod handle;
mod host;
pub mod session;
mod state;

pub use environment::{MatchEnvironment, PlayerRating};
pub use error::ServerError;
pub use event::{ServerEffect, ServerEvent, StartOutcome};
pub use handle::{IdemServer, ServerStatus};
pub use host::{HostProcess, RecordingHost, StdProcess};
pub use session::{AuthRequest, RESPONSE_TIMEOUT, ServerSession, StartStep};
pub use state::{ExitCode, MatchState};
