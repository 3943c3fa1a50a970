//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and, on Unix, SIGTERM both start a graceful shutdown.
//! Handlers are installed eagerly so a registration failure surfaces at
//! startup instead of leaving the process without a way to drain.

use std::io;

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};

/// Registered termination signal handlers.
pub struct SignalListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl SignalListener {
    /// Register the handlers with the OS.
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(windows)]
        {
            Ok(Self {
                ctrl_c: tokio::signal::windows::ctrl_c()?,
            })
        }

        #[cfg(not(any(unix, windows)))]
        {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "signal handling is not supported on this platform",
            ))
        }
    }

    /// Wait for the first termination signal.
    pub async fn recv(&mut self) -> ShutdownReason {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.interrupt.recv() => ShutdownReason::Interrupt,
                _ = self.terminate.recv() => ShutdownReason::Terminate,
            }
        }

        #[cfg(windows)]
        {
            self.ctrl_c.recv().await;
            ShutdownReason::Interrupt
        }

        #[cfg(not(any(unix, windows)))]
        {
            std::future::pending().await
        }
    }
}

/// Install signal handlers, then spawn a task that forwards the first signal
/// to `shutdown`.
pub fn spawn_signal_listener(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    let mut signals = SignalListener::install()?;

    Ok(tokio::spawn(async move {
        let reason = signals.recv().await;
        tracing::info!(signal = %reason, "Received termination signal");
        shutdown.request(reason);
    }))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn sigterm_is_forwarded_as_terminate() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        let _listener = spawn_signal_listener(shutdown).expect("handlers install");

        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("kill -TERM {}", std::process::id()))
            .status()
            .unwrap();
        assert!(status.success());

        let reason = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("signal was not forwarded")
            .unwrap();
        assert_eq!(reason, ShutdownReason::Terminate);
    }
}
