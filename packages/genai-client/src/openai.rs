//! OpenAI chat completions client.

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{GenAIError, Result};
use crate::types::{ChatRequest, ChatResponse, ChatResponseRaw};

const PROVIDER: &str = "OpenAI";

/// Minimal OpenAI API client (chat completions only).
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| GenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Reuse an existing HTTP client (shared connection pool, custom timeouts).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Returns the first choice's content. A missing or null content comes back
    /// as an empty string; callers decide whether that is an error.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                GenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(GenAIError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| GenAIError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or(GenAIError::EmptyResponse(PROVIDER))?
            .message
            .content
            .unwrap_or_default();

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAIClient::new("sk-test").with_base_url("https://proxy.internal/v1");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url(), "https://proxy.internal/v1");
    }
}
