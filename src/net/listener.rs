//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Report bind failures as a distinct, fatal error
//! - Hand the bound socket to the HTTP server

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Failure to bind the listening address. Always fatal at startup.
#[derive(Debug, Error)]
#[error("failed to bind {address}: {source}")]
pub struct BindError {
    pub address: String,
    #[source]
    pub source: std::io::Error,
}

/// A bound TCP listener, ready to accept connections.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, BindError> {
        let bind_error = |source: std::io::Error| BindError {
            address: config.bind_address.clone(),
            source,
        };

        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            bind_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let inner = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = inner.local_addr().map_err(bind_error)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}
