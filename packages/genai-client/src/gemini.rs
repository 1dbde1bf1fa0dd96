//! Gemini `generateContent` client.
//!
//! Two endpoints are supported:
//! - Gemini Developer API, authenticated with an API key
//! - Vertex AI for a project/region, authenticated with OAuth access tokens
//!   fetched per request from an [`AccessTokenProvider`]

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, warn};

use crate::auth::{AccessTokenProvider, ApplicationDefaultCredentials};
use crate::error::{GenAIError, Result};
use crate::types::{GenerateContentRequest, GenerateContentResponse};

const PROVIDER: &str = "Gemini";
const DEVELOPER_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// How requests are authenticated, which also decides the endpoint.
#[derive(Clone)]
pub enum GeminiAuth {
    /// Gemini Developer API key (`x-goog-api-key`)
    ApiKey(String),

    /// Vertex AI with bearer tokens
    Vertex {
        project_id: String,
        region: String,
        tokens: Arc<dyn AccessTokenProvider>,
    },
}

impl std::fmt::Debug for GeminiAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeminiAuth::ApiKey(_) => f.write_str("ApiKey(***)"),
            GeminiAuth::Vertex {
                project_id, region, ..
            } => f
                .debug_struct("Vertex")
                .field("project_id", project_id)
                .field("region", region)
                .finish_non_exhaustive(),
        }
    }
}

/// Minimal Gemini client.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    http_client: Client,
    auth: GeminiAuth,
    base_url: Option<String>,
}

impl GeminiClient {
    pub fn new(auth: GeminiAuth) -> Self {
        Self {
            http_client: Client::new(),
            auth,
            base_url: None,
        }
    }

    /// Developer API client.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(GeminiAuth::ApiKey(api_key.into()))
    }

    /// Vertex AI client authenticated with Application Default Credentials.
    pub fn vertex(project_id: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        Self::vertex_with_tokens(
            project_id,
            region,
            Arc::new(ApplicationDefaultCredentials::new()),
        )
    }

    /// Vertex AI client with a custom token source.
    pub fn vertex_with_tokens(
        project_id: impl Into<String>,
        region: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let (project_id, region) = (project_id.into(), region.into());
        if project_id.is_empty() || region.is_empty() {
            return Err(GenAIError::Config(
                "project id and region must be set for Vertex AI".into(),
            ));
        }
        Ok(Self::new(GeminiAuth::Vertex {
            project_id,
            region,
            tokens,
        }))
    }

    /// Override the API root (proxies, emulators).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Full `generateContent` URL for a model.
    pub fn endpoint(&self, model: &str) -> String {
        match &self.auth {
            GeminiAuth::ApiKey(_) => {
                let base = self.base_url.as_deref().unwrap_or(DEVELOPER_API_URL);
                format!("{}/models/{}:generateContent", base, model)
            }
            GeminiAuth::Vertex {
                project_id, region, ..
            } => {
                let base = self
                    .base_url
                    .clone()
                    .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com/v1", region));
                format!(
                    "{}/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                    base, project_id, region, model
                )
            }
        }
    }

    /// Call `generateContent` and return the raw response.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start = std::time::Instant::now();

        let builder = self.http_client.post(self.endpoint(model)).json(request);
        let builder = match &self.auth {
            GeminiAuth::ApiKey(key) => builder.header("x-goog-api-key", key),
            GeminiAuth::Vertex { tokens, .. } => {
                let access_token = tokens.access_token().await.map_err(|e| {
                    warn!(error = %e, "Could not obtain a Vertex AI access token");
                    e
                })?;
                builder.bearer_auth(access_token)
            }
        };

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Gemini request failed");
            GenAIError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(GenAIError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenAIError::Parse(e.to_string()))?;

        debug!(
            model = model,
            duration_ms = start.elapsed().as_millis(),
            total_tokens = body.usage_metadata.as_ref().map(|u| u.total_token_count),
            "Gemini generateContent"
        );

        Ok(body)
    }

    /// Call `generateContent` and return the candidate text.
    ///
    /// Blocked prompts and empty candidates are errors.
    pub async fn generate_text(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String> {
        let response = self.generate_content(model, request).await?;
        match response.text() {
            Some(text) => Ok(text),
            None => match response.block_reason() {
                Some(reason) => Err(GenAIError::Api {
                    provider: PROVIDER,
                    status: 200,
                    message: format!("response blocked: {}", reason),
                }),
                None => Err(GenAIError::EmptyResponse(PROVIDER)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn developer_api_endpoint() {
        let client = GeminiClient::with_api_key("key");
        assert_eq!(
            client.endpoint("gemini-2.5-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn vertex_endpoint_is_regional() {
        let client = GeminiClient::vertex("my-project", "europe-west4").unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-pro"),
            "https://europe-west4-aiplatform.googleapis.com/v1/projects/my-project/locations/europe-west4/publishers/google/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn base_url_override_applies_to_both_endpoints() {
        let dev = GeminiClient::with_api_key("key").with_base_url("http://localhost:9000");
        assert_eq!(
            dev.endpoint("m"),
            "http://localhost:9000/models/m:generateContent"
        );

        let vertex = GeminiClient::vertex("p", "r")
            .unwrap()
            .with_base_url("http://localhost:9000");
        assert_eq!(
            vertex.endpoint("m"),
            "http://localhost:9000/projects/p/locations/r/publishers/google/models/m:generateContent"
        );
    }

    #[test]
    fn vertex_requires_project_and_region() {
        assert!(matches!(
            GeminiClient::vertex("", "us-central1"),
            Err(GenAIError::Config(_))
        ));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let rendered = format!("{:?}", GeminiAuth::ApiKey("secret-key".into()));
        assert!(!rendered.contains("secret-key"));

        let rendered = format!(
            "{:?}",
            GeminiAuth::Vertex {
                project_id: "p".into(),
                region: "r".into(),
                tokens: Arc::new(StaticToken::new("ya29.secret")),
            }
        );
        assert!(!rendered.contains("ya29.secret"));
    }

    /// Hands out a new token per call and counts the calls
    struct RotatingTokens {
        issued: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl AccessTokenProvider for RotatingTokens {
        async fn access_token(&self) -> Result<String> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GenAIError::Auth("credentials revoked".into()));
            }
            Ok(format!("ya29.token-{}", n))
        }
    }

    fn unreachable_vertex(tokens: Arc<RotatingTokens>) -> GeminiClient {
        // Nothing listens on the discard port; requests fail after auth
        GeminiClient::vertex_with_tokens("p", "r", tokens)
            .unwrap()
            .with_base_url("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn vertex_fetches_a_token_for_every_request() {
        let tokens = Arc::new(RotatingTokens {
            issued: AtomicUsize::new(0),
            fail: false,
        });
        let client = unreachable_vertex(tokens.clone());
        let request = GenerateContentRequest::user_prompt("hello");

        for _ in 0..2 {
            let err = client.generate_content("m", &request).await.unwrap_err();
            assert!(matches!(err, GenAIError::Network(_)));
        }

        assert_eq!(tokens.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn token_failure_is_an_auth_error() {
        let tokens = Arc::new(RotatingTokens {
            issued: AtomicUsize::new(0),
            fail: true,
        });
        let client = unreachable_vertex(tokens);

        let err = client
            .generate_content("m", &GenerateContentRequest::user_prompt("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenAIError::Auth(_)));
        assert!(!err.is_transient());
    }
}
