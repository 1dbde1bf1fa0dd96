// Schema-constrained article generation using Gemini
//
// Infrastructure implementation of BaseTextGenerator. The prompt text lives in
// domains/posts/prompts.rs.

use async_trait::async_trait;
use genai_client::{
    extract_fenced_block, truncate_to_char_boundary, GeminiClient, GenerateContentRequest,
    GenerationConfig, ResponseSchema,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::common::{ProcessorError, Result};
use crate::domains::posts::models::{Brief, GeneratedArticle};
use crate::domains::posts::prompts::{article_details_prompt, article_system_prompt};
use crate::kernel::BaseTextGenerator;

pub struct GeminiArticleGenerator {
    client: GeminiClient,
    model: String,
    system_prompt: String,
}

impl GeminiArticleGenerator {
    pub fn new(client: GeminiClient, model: impl Into<String>, language: &str) -> Self {
        Self {
            client,
            model: model.into(),
            system_prompt: article_system_prompt(language),
        }
    }

    pub fn build_request(&self, brief: &Brief, additional_context: Option<&str>) -> GenerateContentRequest {
        GenerateContentRequest::user_prompt(article_details_prompt(brief, additional_context))
            .system_instruction(self.system_prompt.clone())
            .generation_config(GenerationConfig {
                temperature: Some(0.7),
                top_p: Some(0.95),
                top_k: Some(20),
                max_output_tokens: Some(16000),
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(GeneratedArticle::gemini_schema()),
            })
    }
}

/// Validate provider output as JSON and return it pretty-printed.
///
/// Falls back to the first fenced code block when the model wrapped its answer.
pub fn normalize_json_response(text: &str) -> Result<String> {
    let text = text.trim();

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => {
            let block = extract_fenced_block(text).ok_or_else(|| {
                ProcessorError::Provider(format!(
                    "no valid JSON found in response: {}",
                    truncate_to_char_boundary(text, 200)
                ))
            })?;
            let value = serde_json::from_str::<Value>(block).map_err(|e| {
                ProcessorError::Provider(format!("could not parse JSON from code block: {}", e))
            })?;
            info!("Parsed JSON from fenced code block");
            value
        }
    };

    serde_json::to_string_pretty(&value).map_err(|e| ProcessorError::Provider(e.to_string()))
}

#[async_trait]
impl BaseTextGenerator for GeminiArticleGenerator {
    async fn generate(&self, brief: &Brief, additional_context: Option<&str>) -> Result<String> {
        info!(
            model = %self.model,
            title = brief.title().unwrap_or("[No title provided]"),
            "Generating article with Gemini"
        );

        let request = self.build_request(brief, additional_context);
        let text = self
            .client
            .generate_text(&self.model, &request)
            .await
            .map_err(|e| {
                warn!(error = %e, transient = e.is_transient(), "Gemini generation failed");
                ProcessorError::from(e)
            })?;

        normalize_json_response(&text)
    }

    fn provider_name(&self) -> &'static str {
        "google"
    }
}
