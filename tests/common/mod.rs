//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use capture_gateway::config::GatewayConfig;
use capture_gateway::http::{HttpServer, ServerError};
use capture_gateway::ingest::Ingestor;
use capture_gateway::lifecycle::{ServerState, Shutdown};
use capture_gateway::net::Listener;
use capture_gateway::queue::InMemoryQueue;
use capture_gateway::storage::InMemoryObjectStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const BUCKET: &str = "captures";
pub const QUEUE_URL: &str = "https://queue.test/captures";

/// A gateway serving on an ephemeral port with in-memory collaborators.
#[allow(dead_code)]
pub struct TestGateway {
    pub addr: SocketAddr,
    pub store: Arc<InMemoryObjectStore>,
    pub queue: Arc<InMemoryQueue>,
    pub shutdown: Shutdown,
    pub state: watch::Receiver<ServerState>,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

#[allow(dead_code)]
impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Poll until the store has seen `n` write attempts.
    pub async fn wait_for_store_attempts(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.store.attempts() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("store write never started");
    }
}

/// Start a gateway with the given shutdown grace period.
pub async fn start_gateway(grace: Duration) -> TestGateway {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.storage.bucket = BUCKET.into();
    config.queue.queue_url = QUEUE_URL.into();

    let store = Arc::new(InMemoryObjectStore::new());
    let queue = Arc::new(InMemoryQueue::new());
    let ingestor = Ingestor::from_config(&config, store.clone(), queue.clone());
    let server = HttpServer::new(&config, ingestor).with_grace_period(grace);
    let mut state = server.state();

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, server_shutdown));

    state
        .wait_for(|s| *s == ServerState::Listening)
        .await
        .unwrap();

    TestGateway {
        addr,
        store,
        queue,
        shutdown,
        state,
        handle,
    }
}

/// HTTP client without connection pooling or proxies.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
