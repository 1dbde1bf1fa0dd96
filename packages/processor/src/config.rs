use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Text generation provider selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    /// Gemini with a server-enforced response schema
    Google,
    /// OpenAI free-form chat completion
    OpenAi,
}

impl FromStr for AiProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GOOGLE" => Ok(AiProvider::Google),
            "OPENAI" => Ok(AiProvider::OpenAi),
            other => bail!("AI_PROVIDER must be GOOGLE or OPENAI, got {:?}", other),
        }
    }
}

/// Document collections the service reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNames {
    /// Job lifecycle records, one per post id
    pub jobs: String,
    /// Original posts consulted when regenerating
    pub source_posts: String,
    /// Generated article records, one per post id
    pub generated_posts: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            jobs: "posts".to_string(),
            source_posts: "source_posts".to_string(),
            generated_posts: "generated_posts".to_string(),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ai_provider: AiProvider,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub google_api_key: Option<String>,
    pub gcp_project_id: Option<String>,
    pub gcp_region: Option<String>,
    pub gemini_model: String,
    pub article_language: String,
    pub database_url: Option<String>,
    pub collections: CollectionNames,
    pub generation_timeout: Duration,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = CollectionNames::default();

        let config = Self {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            ai_provider: var("AI_PROVIDER")
                .unwrap_or_else(|| "GOOGLE".to_string())
                .parse()?,
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            google_api_key: var("GOOGLE_API_KEY"),
            gcp_project_id: var("GCP_PROJECT_ID"),
            gcp_region: var("GCP_REGION"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-pro".to_string()),
            article_language: var("ARTICLE_LANGUAGE").unwrap_or_else(|| "Polish".to_string()),
            database_url: var("DATABASE_URL"),
            collections: CollectionNames {
                jobs: var("JOBS_COLLECTION").unwrap_or(defaults.jobs),
                source_posts: var("SOURCE_POSTS_COLLECTION").unwrap_or(defaults.source_posts),
                generated_posts: var("GENERATED_POSTS_COLLECTION")
                    .unwrap_or(defaults.generated_posts),
            },
            generation_timeout: Duration::from_secs(
                var("GENERATION_TIMEOUT_SECS")
                    .unwrap_or_else(|| "300".to_string())
                    .parse()
                    .context("GENERATION_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        config.validate_provider_credentials()?;
        Ok(config)
    }

    fn validate_provider_credentials(&self) -> Result<()> {
        match self.ai_provider {
            AiProvider::OpenAi if self.openai_api_key.is_none() => {
                bail!("OPENAI_API_KEY must be set when AI_PROVIDER=OPENAI")
            }
            AiProvider::Google
                if self.google_api_key.is_none()
                    && (self.gcp_project_id.is_none() || self.gcp_region.is_none()) =>
            {
                bail!(
                    "AI_PROVIDER=GOOGLE needs GOOGLE_API_KEY, or GCP_PROJECT_ID + GCP_REGION for Vertex AI"
                )
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = config_from(&[("GOOGLE_API_KEY", "g-key")]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.ai_provider, AiProvider::Google);
        assert_eq!(config.gemini_model, "gemini-2.5-pro");
        assert_eq!(config.collections, CollectionNames::default());
        assert_eq!(config.generation_timeout, Duration::from_secs(300));
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn provider_name_is_case_insensitive() {
        assert_eq!("openai".parse::<AiProvider>().unwrap(), AiProvider::OpenAi);
        assert_eq!(" Google ".parse::<AiProvider>().unwrap(), AiProvider::Google);
        assert!("anthropic".parse::<AiProvider>().is_err());
    }

    #[test]
    fn openai_requires_api_key() {
        let err = config_from(&[("AI_PROVIDER", "OPENAI")]).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let config = config_from(&[("AI_PROVIDER", "OPENAI"), ("OPENAI_API_KEY", "sk")]).unwrap();
        assert_eq!(config.ai_provider, AiProvider::OpenAi);
    }

    #[test]
    fn google_accepts_vertex_credentials_instead_of_api_key() {
        assert!(config_from(&[("AI_PROVIDER", "GOOGLE")]).is_err());
        assert!(config_from(&[("GCP_PROJECT_ID", "p")]).is_err());

        // Vertex AI authenticates with Application Default Credentials
        let config =
            config_from(&[("GCP_PROJECT_ID", "p"), ("GCP_REGION", "europe-west4")]).unwrap();
        assert_eq!(config.gcp_region.as_deref(), Some("europe-west4"));
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("GOOGLE_API_KEY", "k"), ("JOBS_COLLECTION", "  ")]).unwrap();
        assert_eq!(config.collections.jobs, "posts");
    }

    #[test]
    fn collection_names_and_timeout_are_overridable() {
        let config = config_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("JOBS_COLLECTION", "jobs"),
            ("SOURCE_POSTS_COLLECTION", "blog_posts"),
            ("GENERATED_POSTS_COLLECTION", "articles"),
            ("GENERATION_TIMEOUT_SECS", "45"),
        ])
        .unwrap();

        assert_eq!(config.collections.jobs, "jobs");
        assert_eq!(config.collections.source_posts, "blog_posts");
        assert_eq!(config.collections.generated_posts, "articles");
        assert_eq!(config.generation_timeout, Duration::from_secs(45));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[("GOOGLE_API_KEY", "k"), ("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
