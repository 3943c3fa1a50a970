//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create Axum Router with the liveness and ingestion handlers
//! - Wire up middleware (tracing span per request)
//! - Serve the bound listener until shutdown is requested
//! - Drain in-flight requests within the grace period
//!
//! # Shutdown
//! ```text
//! Listening ──shutdown──▶ Draining ──all connections closed──▶ Stopped (Ok)
//!                             │
//!                             └──grace period elapsed──▶ Stopped (ShutdownTimeout)
//! ```

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::http::request::CorrelationSpan;
use crate::http::response::{Accepted, UP_BODY};
use crate::ingest::Ingestor;
use crate::lifecycle::{Lifecycle, ServerState, ShutdownReason};
use crate::net::{BindError, InFlightTracker, Listener};
use crate::observability::metrics;

/// Process-fatal server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("shutdown grace period of {grace:?} elapsed with {in_flight} request(s) in flight")]
    ShutdownTimeout { grace: Duration, in_flight: u64 },
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Ingestor,
    pub in_flight: InFlightTracker,
}

/// HTTP server for the capture gateway.
pub struct HttpServer {
    router: Router,
    in_flight: InFlightTracker,
    lifecycle: Arc<Lifecycle>,
    grace_period: Duration,
}

impl HttpServer {
    /// Create a new HTTP server around a configured pipeline.
    pub fn new(config: &GatewayConfig, ingestor: Ingestor) -> Self {
        let in_flight = InFlightTracker::new(config.listener.max_in_flight);
        let correlation_header = HeaderName::try_from(config.ingest.correlation_header.as_str())
            .unwrap_or_else(|_| HeaderName::from_static(crate::ingest::FLY_REQUEST_ID));

        let state = AppState {
            ingestor,
            in_flight: in_flight.clone(),
        };

        Self {
            router: Self::build_router(state, correlation_header),
            in_flight,
            lifecycle: Arc::new(Lifecycle::new()),
            grace_period: Duration::from_secs(config.timeouts.shutdown_grace_secs),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, correlation_header: HeaderName) -> Router {
        Router::new()
            .route("/up", any(up_handler))
            .route("/{*path}", any(ingest_handler))
            .route("/", any(ingest_handler))
            .with_state(state)
            .layer(
                TraceLayer::new_for_http().make_span_with(CorrelationSpan::new(correlation_header)),
            )
    }

    /// The router, for driving the handlers without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Observe lifecycle transitions.
    pub fn state(&self) -> watch::Receiver<ServerState> {
        self.lifecycle.subscribe()
    }

    pub fn in_flight(&self) -> InFlightTracker {
        self.in_flight.clone()
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Serve `listener` until `shutdown` fires, then drain.
    ///
    /// Returns `ShutdownTimeout` if requests are still running when the grace
    /// period ends; the serving task is aborted in that case.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<ShutdownReason>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr();
        let (drain_tx, mut drain_rx) = watch::channel(false);

        let serve = axum::serve(listener.into_inner(), self.router)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.wait_for(|draining| *draining).await;
            })
            .into_future();
        let mut serve = tokio::spawn(serve);

        self.lifecycle.transition(ServerState::Listening);
        tracing::info!(address = %addr, "HTTP server listening");

        let reason = tokio::select! {
            res = &mut serve => {
                self.lifecycle.transition(ServerState::Stopped);
                return Ok(res??);
            }
            res = shutdown.recv() => res.unwrap_or(ShutdownReason::Requested),
        };

        tracing::info!(
            reason = %reason,
            in_flight = self.in_flight.active_count(),
            grace_period = ?self.grace_period,
            "Shutdown requested, draining"
        );
        self.lifecycle.transition(ServerState::Draining);
        let _ = drain_tx.send(true);

        let result = match tokio::time::timeout(self.grace_period, &mut serve).await {
            Ok(res) => {
                tracing::info!("HTTP server stopped");
                Ok(res??)
            }
            Err(_) => {
                serve.abort();
                let in_flight = self.in_flight.active_count();
                tracing::error!(
                    in_flight,
                    grace_period = ?self.grace_period,
                    "Drain did not finish in time, forcing shutdown"
                );
                Err(ServerError::ShutdownTimeout {
                    grace: self.grace_period,
                    in_flight,
                })
            }
        };

        self.lifecycle.transition(ServerState::Stopped);
        result
    }
}

/// Liveness check. Never touches the store or the queue.
async fn up_handler() -> &'static str {
    UP_BODY
}

/// Run the capture pipeline for any other method and path.
async fn ingest_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let _slot = state.in_flight.track().await;
    let start = Instant::now();

    match state.ingestor.ingest(request).await {
        Ok(request_id) => {
            tracing::info!(
                request_id = %request_id,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request accepted"
            );
            metrics::record_request("accepted", start);
            Accepted(request_id).into_response()
        }
        Err(rejection) => {
            tracing::error!(
                request_id = %rejection.request_id,
                stage = %rejection.stage,
                error = %rejection.error,
                "Request rejected"
            );
            metrics::record_request(rejection.error.kind(), start);
            rejection.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::InMemoryQueue;
    use crate::storage::InMemoryObjectStore;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> (Arc<InMemoryObjectStore>, Arc<InMemoryQueue>, HttpServer) {
        let store = Arc::new(InMemoryObjectStore::new());
        let queue = Arc::new(InMemoryQueue::new());
        let ingestor = Ingestor::new(store.clone(), queue.clone(), "captures", "q");
        let server = HttpServer::new(&GatewayConfig::default(), ingestor);
        (store, queue, server)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn up_is_constant_and_side_effect_free() {
        let (store, queue, server) = server();
        store.fail_writes(true);
        queue.fail_sends(true);

        for method in ["GET", "POST", "HEAD"] {
            let request = Request::builder().method(method).uri("/up").body(Body::empty()).unwrap();
            let (status, _) = send(server.router(), request).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(server.router(), Request::get("/up").body(Body::empty()).unwrap()).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "up"));
        assert_eq!(store.attempts(), 0);
        assert_eq!(queue.attempts(), 0);
    }

    #[tokio::test]
    async fn root_and_nested_paths_are_ingested() {
        let (store, queue, server) = server();

        for uri in ["/", "/a/b/c?d=e", "/up/not-health"] {
            let request = Request::delete(uri).body(Body::empty()).unwrap();
            let (status, body) = send(server.router(), request).await;
            assert_eq!((status, body.as_str()), (StatusCode::OK, "done"));
        }

        assert_eq!(store.len(), 3);
        assert_eq!(queue.messages().len(), 3);
    }

    #[tokio::test]
    async fn truncated_body_is_a_server_error() {
        let (store, queue, server) = server();
        let chunks: Vec<Result<bytes::Bytes, std::io::Error>> = vec![
            Ok(bytes::Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let request = Request::post("/hooks")
            .body(Body::from_stream(futures_util::stream::iter(chunks)))
            .unwrap();

        let (status, body) = send(server.router(), request).await;
        assert_eq!((status, body.as_str()), (StatusCode::INTERNAL_SERVER_ERROR, "server error"));
        assert_eq!(store.attempts(), 0);
        assert_eq!(queue.attempts(), 0);
    }

    #[test]
    fn signal_install_failure_is_fatal() {
        let err = ServerError::Signals(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "no signals",
        ));
        assert_eq!(err.to_string(), "failed to install signal handlers: no signals");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn in_flight_released_after_request() {
        let (_, _, server) = server();
        let tracker = server.in_flight();

        send(server.router(), Request::post("/").body(Body::from("x")).unwrap()).await;
        assert_eq!(tracker.active_count(), 0);
    }
}
