//! Pure REST clients for the text-generation providers
//!
//! Thin, domain-free wrappers over:
//! - OpenAI chat completions (free-form text)
//! - Gemini `generateContent` (Developer API key, or Vertex AI with
//!   Application Default Credentials), including
//!   schema-constrained JSON output
//!
//! # Example
//!
//! ```rust,ignore
//! use genai_client::{ChatRequest, Message, OpenAIClient};
//!
//! let client = OpenAIClient::from_env()?;
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new("gpt-4o")
//!             .message(Message::system("You are a helpful assistant"))
//!             .message(Message::user("Hello!")),
//!     )
//!     .await?;
//! ```
//!
//! # Schema-constrained output
//!
//! ```rust,ignore
//! use genai_client::{GeminiClient, GenerateContentRequest, GenerationConfig, ResponseSchema};
//!
//! let request = GenerateContentRequest::user_prompt(prompt).generation_config(GenerationConfig {
//!     response_mime_type: Some("application/json".into()),
//!     response_schema: Some(Article::gemini_schema()),
//!     ..Default::default()
//! });
//! let json = GeminiClient::with_api_key(key)
//!     .generate_text("gemini-2.5-pro", &request)
//!     .await?;
//! ```

pub mod auth;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod schema;
pub mod types;

pub use auth::{AccessTokenProvider, ApplicationDefaultCredentials, StaticToken};
pub use error::{GenAIError, Result};
pub use gemini::{GeminiAuth, GeminiClient};
pub use openai::OpenAIClient;
pub use schema::ResponseSchema;
pub use types::*;
