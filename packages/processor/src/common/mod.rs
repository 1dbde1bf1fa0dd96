pub mod errors;

pub use errors::{ProcessorError, Result};
