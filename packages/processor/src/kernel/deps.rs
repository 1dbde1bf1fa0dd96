//! Server dependencies for job processing (using traits for testability)
//!
//! Constructed once at startup and shared by every request. All external
//! services sit behind trait objects so tests can swap them for mocks.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{CollectionNames, Config};
use crate::kernel::{BaseDocumentStore, BaseTextGenerator};

/// Default bound on a single provider call
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Dependencies accessible to the job state machine and generation orchestrator
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseDocumentStore>,
    pub generator: Arc<dyn BaseTextGenerator>,
    pub collections: CollectionNames,
    pub generation_timeout: Duration,
}

impl ServerDeps {
    pub fn new(store: Arc<dyn BaseDocumentStore>, generator: Arc<dyn BaseTextGenerator>) -> Self {
        Self {
            store,
            generator,
            collections: CollectionNames::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Apply collection names and timeout from configuration
    pub fn with_config(mut self, config: &Config) -> Self {
        self.collections = config.collections.clone();
        self.generation_timeout = config.generation_timeout;
        self
    }

    pub fn with_collections(mut self, collections: CollectionNames) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }
}
