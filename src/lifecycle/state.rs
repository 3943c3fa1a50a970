//! Server lifecycle state machine.
//!
//! # States
//! ```text
//! Starting → Listening → Draining → Stopped
//! ```
//!
//! Transitions only move forward. Observers (tests, readiness probes) watch
//! the current state through a `watch` channel.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerState {
    /// Binding the listener and building collaborators.
    Starting,
    /// Accepting connections.
    Listening,
    /// No longer accepting; waiting for in-flight requests.
    Draining,
    /// Serving has ended.
    Stopped,
}

impl ServerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerState::Starting => "starting",
            ServerState::Listening => "listening",
            ServerState::Draining => "draining",
            ServerState::Stopped => "stopped",
        }
    }
}

/// Owner of the lifecycle state.
#[derive(Debug)]
pub struct Lifecycle {
    tx: watch::Sender<ServerState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ServerState::Starting);
        Self { tx }
    }

    pub fn current(&self) -> ServerState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.tx.subscribe()
    }

    /// Move to `next`. Backwards transitions are ignored.
    pub fn transition(&self, next: ServerState) {
        let changed = self.tx.send_if_modified(|state| {
            if next > *state {
                *state = next;
                true
            } else {
                false
            }
        });

        if changed {
            tracing::info!(state = next.as_str(), "Server state changed");
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
