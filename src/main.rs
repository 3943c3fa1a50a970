//! Capture Gateway
//!
//! An HTTP front door that durably captures every inbound request and hands
//! a reference to it to a queue for asynchronous processing elsewhere.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────┐
//!                              │                   CAPTURE GATEWAY                    │
//!                              │                                                      │
//!     Client Request           │  ┌─────────┐    ┌─────────┐    ┌──────────────┐      │
//!     ─────────────────────────┼─▶│   net   │───▶│  http   │───▶│    ingest    │      │
//!                              │  │listener │    │ server  │    │  identifier  │      │
//!                              │  └─────────┘    └─────────┘    │   capture    │      │
//!                              │                                └──────┬───────┘      │
//!                              │                                       │              │
//!                              │                        1. put         ▼              │
//!                              │                     ┌──────────────────────┐         │
//!                              │                     │  storage (S3 / mem)  │─────────┼──▶ Object Store
//!                              │                     └──────────┬───────────┘         │
//!                              │                                │ acknowledged        │
//!                              │                        2. send ▼                     │
//!     Client Response          │  ┌─────────┐         ┌──────────────────────┐         │
//!     ◀────────────────────────┼──│response │◀────────│  queue (SQS / mem)   │─────────┼──▶ Queue
//!                              │  └─────────┘         └──────────────────────┘         │
//!                              │                                                      │
//!                              │  ┌────────────────────────────────────────────────┐  │
//!                              │  │             Cross-Cutting Concerns             │  │
//!                              │  │  ┌─────────┐  ┌──────────────┐  ┌───────────┐  │  │
//!                              │  │  │ config  │  │observability │  │ lifecycle │  │  │
//!                              │  │  └─────────┘  └──────────────┘  └───────────┘  │  │
//!                              │  └────────────────────────────────────────────────┘  │
//!                              └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use capture_gateway::config::{load_config, GatewayConfig, Overrides};
use capture_gateway::http::{HttpServer, ServerError};
use capture_gateway::ingest::Ingestor;
use capture_gateway::lifecycle::{build_collaborators, signals, Shutdown};
use capture_gateway::net::Listener;
use capture_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "capture-gateway", version)]
#[command(about = "Capture HTTP requests to an object store and queue a reference", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "CAPTURE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(long, env = "CAPTURE_BIND_ADDRESS")]
    bind: Option<String>,

    /// Bucket captured requests are written to.
    #[arg(long, env = "CAPTURE_BUCKET")]
    bucket: Option<String>,

    /// Queue URL references are published to.
    #[arg(long, env = "CAPTURE_QUEUE_URL")]
    queue_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let overrides = Overrides {
        bind_address: cli.bind,
        bucket: cli.bucket,
        queue_url: cli.queue_url,
    };

    let config = match load_config(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("capture-gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("capture-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: GatewayConfig) -> Result<(), ServerError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        bucket = %config.storage.bucket,
        queue_url = %config.queue.queue_url,
        shutdown_grace_secs = config.timeouts.shutdown_grace_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let collaborators = build_collaborators(&config).await;
    let ingestor = Ingestor::from_config(&config, collaborators.store, collaborators.queue);
    let server = HttpServer::new(&config, ingestor);

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown).map_err(ServerError::Signals)?;

    server.run(listener, server_shutdown).await
}
