//! OAuth access tokens for Vertex AI.
//!
//! Vertex AI access tokens expire after about an hour, so the client asks its
//! [`AccessTokenProvider`] for a token on every request instead of holding one.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::{GenAIError, Result};

/// Scope required by the Vertex AI `generateContent` endpoint.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Source of bearer tokens for Vertex AI requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// A token valid for at least the next request
    async fn access_token(&self) -> Result<String>;
}

/// Application Default Credentials (service account key file, workload
/// identity, metadata server or `gcloud` user credentials).
///
/// Credentials are discovered on first use. `gcp_auth` caches tokens and
/// refreshes them before they expire.
#[derive(Default)]
pub struct ApplicationDefaultCredentials {
    provider: OnceCell<Arc<dyn gcp_auth::TokenProvider>>,
}

impl ApplicationDefaultCredentials {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenProvider for ApplicationDefaultCredentials {
    async fn access_token(&self) -> Result<String> {
        let provider = self
            .provider
            .get_or_try_init(|| async {
                let provider = gcp_auth::provider().await.map_err(|e| {
                    warn!(error = %e, "No Google Application Default Credentials found");
                    GenAIError::Auth(e.to_string())
                })?;
                info!("Loaded Google Application Default Credentials");
                Ok::<_, GenAIError>(provider)
            })
            .await?;

        let token = provider
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| GenAIError::Auth(e.to_string()))?;

        Ok(token.as_str().to_string())
    }
}

/// A fixed token (emulators, proxies that ignore auth, tests).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
