//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires a fully-constructed
//! [`AppContext`] around a fast stub engine and a throwaway temp directory.
//! The [`TestHarness::with_server`] constructor starts Axum on a random port
//! for HTTP-level testing.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use sl_core::config::Config;
use sl_core::events::EventBus;
use sl_omr::{OmrEngine, StubEngine};
use sl_server::context::AppContext;
use sl_server::router::build_router;
use sl_server::service::ConversionService;
use sl_server::store::JobStore;

/// Engine that fails every conversion with a fixed message.
pub struct FailingEngine;

#[async_trait]
impl OmrEngine for FailingEngine {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn convert(&self, _input: &Path, _output: &Path) -> sl_core::Result<Vec<u8>> {
        Err(sl_core::Error::engine("deterministic test failure"))
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// temp directory and (by default) a fast stub engine.
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: Arc<JobStore>,
    pub service: Arc<ConversionService>,
    _temp: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new harness with a 25 ms stub engine.
    pub fn new() -> Self {
        Self::with_stub_delay(Duration::from_millis(25))
    }

    /// Create a new harness with a stub engine of the given delay.
    pub fn with_stub_delay(delay: Duration) -> Self {
        Self::with_engine(Arc::new(StubEngine::new(delay)))
    }

    /// Create a new harness around an arbitrary engine.
    pub fn with_engine(engine: Arc<dyn OmrEngine>) -> Self {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let config = Config::default();

        let store = Arc::new(JobStore::new());
        let event_bus = Arc::new(EventBus::default());
        let service = Arc::new(ConversionService::new(
            store.clone(),
            engine,
            event_bus.clone(),
            temp.path().to_path_buf(),
            config.workers.count,
            Duration::from_secs(30),
        ));

        let ctx = AppContext {
            config: Arc::new(config),
            store: store.clone(),
            service: service.clone(),
            event_bus,
        };

        Self {
            ctx,
            store,
            service,
            _temp: temp,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::serve(Self::new()).await
    }

    /// Start a server around an arbitrary engine.
    pub async fn with_engine_server(engine: Arc<dyn OmrEngine>) -> (Self, SocketAddr) {
        Self::serve(Self::with_engine(engine)).await
    }

    /// Start a server whose stub engine is slow enough that jobs are still
    /// running when the test pokes at them.
    pub async fn with_slow_server() -> (Self, SocketAddr) {
        Self::serve(Self::with_stub_delay(Duration::from_secs(5))).await
    }

    async fn serve(harness: Self) -> (Self, SocketAddr) {
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }
}

/// Build a multipart form carrying `content` as the `file` field.
pub fn upload_form(filename: &str, content: &[u8]) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(content.to_vec())
        .file_name(filename.to_string())
        .mime_str("application/octet-stream")
        .expect("valid mime");
    reqwest::multipart::Form::new().part("file", part)
}

/// Poll the status endpoint until the job leaves pending/processing.
pub async fn wait_for_terminal(
    client: &reqwest::Client,
    addr: SocketAddr,
    job_id: &str,
) -> serde_json::Value {
    for _ in 0..200 {
        let resp = client
            .get(format!("http://{addr}/api/jobs/{job_id}"))
            .send()
            .await
            .expect("status request failed");
        if resp.status().is_success() {
            let json: serde_json::Value = resp.json().await.unwrap();
            let status = json["status"].as_str().unwrap_or_default().to_string();
            if status == "completed" || status == "failed" {
                return json;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never reached a terminal state");
}
