// Free-form article generation using OpenAI chat completions
//
// Infrastructure implementation of BaseTextGenerator.

use async_trait::async_trait;
use genai_client::{ChatRequest, Message, OpenAIClient};
use tracing::{info, warn};

use crate::common::{ProcessorError, Result};
use crate::domains::posts::models::Brief;
use crate::domains::posts::prompts::{chat_prompt, CHAT_SYSTEM_PROMPT};
use crate::kernel::BaseTextGenerator;

pub struct OpenAIChatGenerator {
    client: OpenAIClient,
    model: String,
}

impl OpenAIChatGenerator {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn build_request(&self, brief: &Brief, additional_context: Option<&str>) -> ChatRequest {
        ChatRequest::new(&self.model)
            .message(Message::system(CHAT_SYSTEM_PROMPT))
            .message(Message::user(chat_prompt(brief, additional_context)))
    }
}

#[async_trait]
impl BaseTextGenerator for OpenAIChatGenerator {
    async fn generate(&self, brief: &Brief, additional_context: Option<&str>) -> Result<String> {
        info!(
            model = %self.model,
            title = brief.title().unwrap_or("[No title provided]"),
            "Generating article with OpenAI"
        );

        let response = self
            .client
            .chat_completion(self.build_request(brief, additional_context))
            .await
            .map_err(|e| {
                warn!(error = %e, transient = e.is_transient(), "OpenAI generation failed");
                ProcessorError::from(e)
            })?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err(ProcessorError::Provider(
                "Received empty content from OpenAI".to_string(),
            ));
        }

        Ok(text.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
