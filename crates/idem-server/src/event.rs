//! Notifications and effects produced by the server state machine.
//!
//! The state machine never spawns, sleeps or sends on a channel itself.
//! Everything with a side effect outside the session comes out as a
//! [`ServerEffect`]:
//!
//! - [`ServerEffect::Publish`] goes to subscribers as a [`ServerEvent`].
//! - [`ServerEffect::ResolveStart`] answers every caller waiting on
//!   `start`.
//! - [`ServerEffect::ScheduleStart`] asks the owner to call `start` again
//!   after a delay.
//!
//! Tests drive the session synchronously and assert on the drained
//! effects. The actor in [`crate::IdemServer`] turns them into broadcast
//! sends, oneshot replies and timer tasks.

use std::time::Duration;

use crate::{ExitCode, MatchState};

/// Something the embedding game server may want to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    /// The connection to the backend is open.
    Connected,
    /// The connection to the backend ended.
    Disconnected,
    MatchStateChanged(MatchState),
    /// The host process was asked to exit.
    ExitRequested(ExitCode),
}

/// How a `start` request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The connection is open.
    Ready,
    /// Authorization or connection failed for good.
    Failed,
    /// `max_connect_attempts` was reached.
    Exhausted,
    /// The server was stopped before the connection opened.
    Stopped,
}

/// Work the state machine asks its owner to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEffect {
    Publish(ServerEvent),
    /// Answer every caller waiting on `start`.
    ResolveStart(StartOutcome),
    /// Call `start` again after the delay.
    ScheduleStart(Duration),
}
