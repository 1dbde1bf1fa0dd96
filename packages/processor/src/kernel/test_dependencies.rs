// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::stores::MemoryDocumentStore;
use super::{BaseDocumentStore, BaseTextGenerator, Document, ServerDeps};
use crate::common::{ProcessorError, Result};
use crate::domains::posts::models::Brief;

// =============================================================================
// Mock Text Generator
// =============================================================================

/// Arguments captured from a generate call
#[derive(Debug, Clone)]
pub struct GenerateCallArgs {
    pub brief: Brief,
    pub additional_context: Option<String>,
}

/// Default structured response when nothing is scripted
pub const DEFAULT_MOCK_ARTICLE: &str =
    r#"{"title":"Mock Article","sections":[{"subtitle":"Mock Section","content":"Mock content."}]}"#;

enum Scripted {
    Text(String),
    Failure(String),
}

/// Scripted text generator.
///
/// Scripted responses are consumed in order; once exhausted the generator
/// returns [`DEFAULT_MOCK_ARTICLE`], or fails when built with `fail_always`.
pub struct MockTextGenerator {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<GenerateCallArgs>>>,
    fail_always: Option<String>,
    delay: Option<Duration>,
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_always: None,
            delay: None,
        }
    }

    /// Generator whose every call fails with a provider error
    pub fn failing(message: &str) -> Self {
        Self {
            fail_always: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn with_response(self, text: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Text(text.to_string()));
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.to_string()));
        self
    }

    /// Sleep before answering (timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all generate calls with their arguments
    pub fn calls(&self) -> Vec<GenerateCallArgs> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseTextGenerator for MockTextGenerator {
    async fn generate(&self, brief: &Brief, additional_context: Option<&str>) -> Result<String> {
        self.calls.lock().unwrap().push(GenerateCallArgs {
            brief: brief.clone(),
            additional_context: additional_context.map(str::to_string),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.fail_always {
            return Err(ProcessorError::Provider(message.clone()));
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Failure(message)) => Err(ProcessorError::Provider(message)),
            None => Ok(DEFAULT_MOCK_ARTICLE.to_string()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

// =============================================================================
// Flaky Document Store
// =============================================================================

/// Wraps a [`MemoryDocumentStore`] and fails selected operations.
///
/// `fail_update_when(collection, field, value)` fails any update on
/// `collection` whose patch sets `field` to `value`, which lets tests break a
/// single state transition (e.g. the write of `status = completed`).
/// `fail_gets_after(collection, n)` lets the first `n` reads through and fails
/// the rest, e.g. the re-read that follows a failed generation.
pub struct FlakyDocumentStore {
    inner: Arc<MemoryDocumentStore>,
    failing_updates: Mutex<Vec<(String, String, serde_json::Value)>>,
    /// collection -> reads still allowed before failing
    failing_gets: Mutex<Vec<(String, usize)>>,
    failing_sets: Mutex<Vec<String>>,
}

impl FlakyDocumentStore {
    pub fn new(inner: Arc<MemoryDocumentStore>) -> Self {
        Self {
            inner,
            failing_updates: Mutex::new(Vec::new()),
            failing_gets: Mutex::new(Vec::new()),
            failing_sets: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_update_when(self, collection: &str, field: &str, value: serde_json::Value) -> Self {
        self.failing_updates
            .lock()
            .unwrap()
            .push((collection.to_string(), field.to_string(), value));
        self
    }

    pub fn fail_sets_on(self, collection: &str) -> Self {
        self.failing_sets.lock().unwrap().push(collection.to_string());
        self
    }

    pub fn fail_gets_after(self, collection: &str, successful_reads: usize) -> Self {
        self.failing_gets
            .lock()
            .unwrap()
            .push((collection.to_string(), successful_reads));
        self
    }
}

#[async_trait]
impl BaseDocumentStore for FlakyDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let should_fail = self
            .failing_gets
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|(c, _)| c == collection)
            .any(|(_, remaining)| match remaining.checked_sub(1) {
                Some(left) => {
                    *remaining = left;
                    false
                }
                None => true,
            });
        if should_fail {
            return Err(ProcessorError::Persistence(format!(
                "injected read failure on {}",
                collection
            )));
        }
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<()> {
        if self.failing_sets.lock().unwrap().iter().any(|c| c == collection) {
            return Err(ProcessorError::Persistence(format!(
                "injected write failure on {}",
                collection
            )));
        }
        self.inner.set(collection, id, doc).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<()> {
        let should_fail = self
            .failing_updates
            .lock()
            .unwrap()
            .iter()
            .any(|(c, field, value)| c == collection && patch.get(field) == Some(value));
        if should_fail {
            return Err(ProcessorError::Persistence(format!(
                "injected update failure on {}",
                collection
            )));
        }
        self.inner.update(collection, id, patch).await
    }

    fn kind(&self) -> &'static str {
        "flaky-memory"
    }
}

// =============================================================================
// TestDependencies Builder
// =============================================================================

/// Bundles a memory store and a mock generator into [`ServerDeps`].
pub struct TestDependencies {
    pub store: Arc<MemoryDocumentStore>,
    pub generator: Arc<MockTextGenerator>,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryDocumentStore::new()),
            generator: Arc::new(MockTextGenerator::new()),
        }
    }

    pub fn with_generator(mut self, generator: MockTextGenerator) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(self.store.clone(), self.generator.clone())
    }
}
