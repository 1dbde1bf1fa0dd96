//! Push subscription endpoint.
//!
//! The push channel redelivers any message that is not acknowledged with a
//! 2xx, so every propagated failure maps to 500 and everything else, including
//! absorbed terminal failures, to 204.

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::common::{ProcessorError, Result};
use crate::domains::posts::{process_message, JobOutcome};
use crate::kernel::ServerDeps;
use crate::server::app::AppState;

/// Push request body
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    pub message: Value,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Extract the job payload from a push message.
///
/// A string `data` field carries base64-encoded JSON; otherwise the message
/// object itself is the job payload.
pub fn decode_push_message(message: Value) -> Result<Value> {
    let encoded = match message.get("data") {
        Some(Value::String(encoded)) => encoded.trim().to_string(),
        _ => return Ok(message),
    };

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| ProcessorError::Validation(format!("message data is not base64: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProcessorError::Validation(format!("message data is not JSON: {}", e)))
}

fn parse_envelope(body: &[u8]) -> Result<PushEnvelope> {
    serde_json::from_slice(body)
        .map_err(|e| ProcessorError::Validation(format!("invalid push envelope: {}", e)))
}

async fn handle_push(body: &[u8], deps: &ServerDeps) -> Result<JobOutcome> {
    let envelope = parse_envelope(body)?;
    info!(
        message_id = envelope.message.get("messageId").and_then(|v| v.as_str()),
        subscription = envelope.subscription.as_deref(),
        "Received push message"
    );
    let payload = decode_push_message(envelope.message)?;
    process_message(payload, deps).await
}

/// Receive a push notification and run the job state machine.
pub async fn pubsub_push_handler(Extension(state): Extension<AppState>, body: Bytes) -> Response {
    match handle_push(&body, &state.deps).await {
        Ok(outcome) => {
            info!(outcome = ?outcome, "Push message acknowledged");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(
                error = %e,
                kind = e.kind(),
                retryable = e.is_retryable(),
                "Failed to process push message, requesting redelivery"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": format!("Failed to process message: {}", e)})),
            )
                .into_response()
        }
    }
}
