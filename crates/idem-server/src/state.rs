//! Match lifecycle and process exit codes.

use std::fmt;

/// Where the hosted match is in its lifecycle.
///
/// Ordered, so `state <= MatchState::Created` means "not yet confirmed".
///
/// ```text
///            ┌──→ Failed
/// Created ───┤
///            └──→ Confirmed ──→ Completed
/// ```
///
/// `None` means the match environment was unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MatchState {
    #[default]
    None = 0,
    Failed = 1,
    Created = 10,
    Confirmed = 11,
    Completed = 12,
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Failed => "Failed",
            Self::Created => "Created",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
        };
        f.write_str(name)
    }
}

/// Exit status the server process terminates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitCode {
    /// The result was reported and acknowledged.
    Normal = 0,
    /// The match environment was missing or malformed.
    InvalidEnvironment = 1,
    /// The backend could not be reached.
    CannotConnect = 2,
    /// The match was reported as failed.
    FailedMatch = 3,
    /// The backend rejected the server's credentials.
    CannotAuthorize = 4,
}

impl ExitCode {
    /// The numeric process status.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.code())
    }
}
