//! Document store backends.
//!
//! - [`MemoryDocumentStore`] for tests and local development
//! - [`PostgresDocumentStore`] for deployments (JSONB documents keyed by collection + id)

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::common::{ProcessorError, Result};
use crate::kernel::Document;

/// Serialize a typed record into a store document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProcessorError::Persistence(format!(
            "expected a JSON object document, got {}",
            other
        ))),
        Err(e) => Err(ProcessorError::Persistence(e.to_string())),
    }
}

/// Read a typed view of a stored document.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| ProcessorError::Persistence(format!("malformed document: {}", e)))
}
