//! Test harness for job processing integration tests.
//!
//! Wires a memory document store and a scripted text generator into
//! `ServerDeps`, so tests drive the real state machine and router without any
//! network access.

use std::sync::Arc;

use axum::Router;
use processor_core::common::Result;
use processor_core::domains::posts::{process_message, JobOutcome};
use processor_core::kernel::{MemoryDocumentStore, MockTextGenerator, ServerDeps};
use processor_core::server::build_app;
use serde_json::Value;
use test_context::AsyncTestContext;

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test harness that manages test dependencies.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     ctx.deliver(hello_payload()).await.unwrap();
/// }
/// ```
pub struct TestHarness {
    pub store: Arc<MemoryDocumentStore>,
    pub generator: Arc<MockTextGenerator>,
    pub deps: ServerDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // Memory store is dropped with the harness
    }
}

impl TestHarness {
    /// Harness whose generator returns the default structured article
    pub fn new() -> Self {
        Self::with_generator(MockTextGenerator::new())
    }

    pub fn with_generator(generator: MockTextGenerator) -> Self {
        init_tracing();

        let store = Arc::new(MemoryDocumentStore::new());
        let generator = Arc::new(generator);
        let deps = ServerDeps::new(store.clone(), generator.clone());

        Self {
            store,
            generator,
            deps,
        }
    }

    /// Deliver one decoded job payload to the state machine
    pub async fn deliver(&self, payload: Value) -> Result<JobOutcome> {
        process_message(payload, &self.deps).await
    }

    /// Router over the same dependencies
    pub fn router(&self) -> Router {
        build_app(self.deps.clone())
    }

    /// Current job record for a post
    pub fn job(&self, post_id: &str) -> Option<Value> {
        self.store
            .snapshot(&self.deps.collections.jobs, post_id)
            .map(Value::Object)
    }

    /// Current generated post for a post
    pub fn generated_post(&self, post_id: &str) -> Option<Value> {
        self.store
            .snapshot(&self.deps.collections.generated_posts, post_id)
            .map(Value::Object)
    }

    pub fn retry_count(&self, post_id: &str) -> u64 {
        self.job(post_id)
            .and_then(|job| job["retry_count"].as_u64())
            .unwrap_or_default()
    }
}
