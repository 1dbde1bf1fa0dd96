//! Text generator implementations, one per provider.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiArticleGenerator;
pub use openai::OpenAIChatGenerator;

use anyhow::{Context, Result};
use genai_client::{GeminiClient, OpenAIClient};
use std::sync::Arc;

use crate::config::{AiProvider, Config};
use crate::kernel::BaseTextGenerator;

// =============================================================================
// Factory function
// =============================================================================

/// Create the text generator selected by configuration
pub fn create_text_generator(config: &Config) -> Result<Arc<dyn BaseTextGenerator>> {
    match config.ai_provider {
        AiProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY must be set when AI_PROVIDER=OPENAI")?;
            tracing::info!(model = %config.openai_model, "Using OpenAI chat generator");
            Ok(Arc::new(OpenAIChatGenerator::new(
                OpenAIClient::new(api_key),
                config.openai_model.clone(),
            )))
        }
        AiProvider::Google => {
            let client = match &config.google_api_key {
                Some(key) => {
                    tracing::info!(model = %config.gemini_model, "Using Gemini Developer API");
                    GeminiClient::with_api_key(key.clone())
                }
                None => {
                    let project_id = config.gcp_project_id.clone().unwrap_or_default();
                    let region = config.gcp_region.clone().unwrap_or_default();
                    tracing::info!(
                        model = %config.gemini_model,
                        project_id = %project_id,
                        region = %region,
                        "Using Gemini on Vertex AI with Application Default Credentials"
                    );
                    GeminiClient::vertex(project_id, region)
                        .context("Invalid Vertex AI configuration")?
                }
            };
            Ok(Arc::new(GeminiArticleGenerator::new(
                client,
                config.gemini_model.clone(),
                &config.article_language,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn selects_generator_by_provider() {
        let google = create_text_generator(&config(&[("GOOGLE_API_KEY", "k")])).unwrap();
        assert_eq!(google.provider_name(), "google");

        let vertex = create_text_generator(&config(&[
            ("GCP_PROJECT_ID", "p"),
            ("GCP_REGION", "us-central1"),
        ]))
        .unwrap();
        assert_eq!(vertex.provider_name(), "google");

        let openai = create_text_generator(&config(&[
            ("AI_PROVIDER", "OPENAI"),
            ("OPENAI_API_KEY", "sk"),
        ]))
        .unwrap();
        assert_eq!(openai.provider_name(), "openai");
    }
}
