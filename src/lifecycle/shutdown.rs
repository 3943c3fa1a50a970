//! Shutdown coordination for the gateway.

use tokio::sync::broadcast;

/// Why the gateway was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM, as sent by the platform on deploys and scale-downs.
    Terminate,
    /// Programmatic request.
    Requested,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::Interrupt => "SIGINT",
            ShutdownReason::Terminate => "SIGTERM",
            ShutdownReason::Requested => "requested",
        }
    }
}

impl std::fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fans a single stop request out to the server and anything else waiting on it.
///
/// The signal listener is the producer in the binary; tests call
/// [`Shutdown::trigger`] directly.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<ShutdownReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.tx.subscribe()
    }

    /// Ask every subscriber to stop, recording `reason`.
    pub fn request(&self, reason: ShutdownReason) {
        if self.tx.send(reason).is_err() {
            tracing::debug!(reason = %reason, "Shutdown requested with nothing listening");
        }
    }

    pub fn trigger(&self) {
        self.request(ShutdownReason::Requested);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
