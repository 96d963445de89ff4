//! Reconnect delay policy.
//!
//! The game server reconnects on its own when the backend connection
//! drops. With [`Backoff`] the first retry is immediate, the next few
//! double (1, 2, 4, 8 seconds), and after that the delay grows by five
//! seconds per attempt up to a one minute ceiling.
//!
//! The policy is plain data with no timer of its own. The server state
//! machine asks it for a delay and hands that to its owner, which sleeps
//! (`tokio::time::sleep`) before calling `start` again. A successful open
//! calls [`Backoff::reset`], so the next outage starts from zero.

use std::time::Duration;

/// Upper bound of the delay, in seconds.
pub const MAX_DELAY_SECS: u64 = 60;

/// Growing delay between reconnect attempts.
///
/// Each call to [`next_delay`](Self::next_delay) returns the current delay
/// and then advances it: doubling while it stays under 10 seconds, then
/// adding 5 seconds at a time up to a 60 second cap.
///
/// ```text
/// 0, 1, 2, 4, 8, 13, 18, 23, ... 53, 58, 60, 60, ...
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Backoff {
    current: u64,
}

impl Backoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the delay to wait now, and advances the policy.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = if delay == 0 {
            1
        } else if delay * 2 < 10 {
            delay * 2
        } else if delay < MAX_DELAY_SECS {
            (delay + 5).min(MAX_DELAY_SECS)
        } else {
            MAX_DELAY_SECS
        };
        Duration::from_secs(delay)
    }

    /// Starts over from a zero delay.
    pub fn reset(&mut self) {
        self.current = 0;
    }
}
