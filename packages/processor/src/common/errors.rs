use thiserror::Error;

/// Failures raised by the job pipeline and its gateways.
///
/// Whether a failure is retried is decided by the job state machine from the
/// persisted retry counters, not by the variant alone. `is_retryable` only
/// describes whether a redelivery could plausibly succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    /// Inbound job message is malformed or missing required fields
    #[error("invalid job message: {0}")]
    Validation(String),

    /// A document that must exist is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Text generation failed (auth, quota, network, malformed output, timeout)
    #[error("provider error: {0}")]
    Provider(String),

    /// Document store operation failed
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl ProcessorError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessorError::Provider(_) | ProcessorError::Persistence(_)
        )
    }

    /// Short, stable label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessorError::Validation(_) => "validation",
            ProcessorError::NotFound(_) => "not_found",
            ProcessorError::Provider(_) => "provider",
            ProcessorError::Persistence(_) => "persistence",
        }
    }
}

impl From<genai_client::GenAIError> for ProcessorError {
    fn from(err: genai_client::GenAIError) -> Self {
        ProcessorError::Provider(err.to_string())
    }
}

impl From<sqlx::Error> for ProcessorError {
    fn from(err: sqlx::Error) -> Self {
        ProcessorError::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
