// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The job state machine and generation orchestration live in domains/posts and
// only ever talk to these seams.
//
// Naming convention: Base* for trait names (e.g., BaseDocumentStore)

use async_trait::async_trait;
use serde_json::Value;

use crate::common::Result;
use crate::domains::posts::models::Brief;

/// A stored document: a flat map of field names to JSON values.
pub type Document = serde_json::Map<String, Value>;

// =============================================================================
// Document Store Trait (Infrastructure - keyed JSON documents)
// =============================================================================

#[async_trait]
pub trait BaseDocumentStore: Send + Sync {
    /// Fetch a document, `None` when absent
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Create or replace a document wholesale
    async fn set(&self, collection: &str, id: &str, doc: Document) -> Result<()>;

    /// Merge fields into an existing document.
    ///
    /// Fields not named in `patch` are left untouched. Fails with
    /// `ProcessorError::NotFound` when the document does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<()>;

    /// Backend label for logs
    fn kind(&self) -> &'static str;
}

// =============================================================================
// Text Generator Trait (Infrastructure - LLM article generation)
// =============================================================================

#[async_trait]
pub trait BaseTextGenerator: Send + Sync {
    /// Produce article text for a brief.
    ///
    /// The result is either a JSON string `{title, sections:[{subtitle, content}]}`
    /// or free text. Callers must cope with both.
    async fn generate(&self, brief: &Brief, additional_context: Option<&str>) -> Result<String>;

    /// Provider label for logs
    fn provider_name(&self) -> &'static str;
}
