//! Error types for the provider clients.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, GenAIError>;

/// Provider client errors.
#[derive(Debug, Error)]
pub enum GenAIError {
    /// Configuration error (missing credentials, incomplete endpoint settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not obtain credentials or an access token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, quota, auth)
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The provider answered but produced no text
    #[error("Received empty content from {0}")]
    EmptyResponse(&'static str),
}

impl GenAIError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GenAIError::Network(_) | GenAIError::EmptyResponse(_) => true,
            GenAIError::Api { status, .. } => *status == 429 || *status >= 500,
            GenAIError::Config(_) | GenAIError::Auth(_) | GenAIError::Parse(_) => false,
        }
    }
}
