//! Kernel module - infrastructure and dependencies.

pub mod ai;
pub mod deps;
pub mod stores;
pub mod test_dependencies;
pub mod traits;

pub use ai::{create_text_generator, GeminiArticleGenerator, OpenAIChatGenerator};
pub use deps::ServerDeps;
pub use stores::{MemoryDocumentStore, PostgresDocumentStore};
pub use test_dependencies::{FlakyDocumentStore, MockTextGenerator, TestDependencies};
pub use traits::*;
