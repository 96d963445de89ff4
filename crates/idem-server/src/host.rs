//! Process termination.

use std::sync::{Arc, Mutex};

use crate::ExitCode;

/// The process hosting the game server.
///
/// The server calls [`exit`](Self::exit) when the match is over or cannot
/// go on. Embedders that manage their own shutdown can intercept it.
pub trait HostProcess: Send + 'static {
    fn exit(&self, code: ExitCode);
}

/// Exits the current process with [`std::process::exit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdProcess;

impl HostProcess for StdProcess {
    fn exit(&self, code: ExitCode) {
        tracing::info!(%code, "exiting");
        std::process::exit(code.code());
    }
}

/// Records exit requests instead of exiting.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    exits: Arc<Mutex<Vec<ExitCode>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every exit requested so far, in order.
    pub fn exits(&self) -> Vec<ExitCode> {
        self.exits.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl HostProcess for RecordingHost {
    fn exit(&self, code: ExitCode) {
        tracing::info!(%code, "exit requested");
        if let Ok(mut exits) = self.exits.lock() {
            exits.push(code);
        }
    }
}
