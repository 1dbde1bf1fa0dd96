//! Payload and document builders shared by the integration tests.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use processor_core::kernel::Document;
use serde_json::{json, Value};

/// Event time used by every fixture message (2023-11-14T22:13:20Z)
pub const FIXTURE_TIMESTAMP: i64 = 1_700_000_000_000;

/// A job payload as the publisher sends it
pub fn job_payload(post_id: &str, action: &str, data: Value) -> Value {
    json!({
        "postId": post_id,
        "action": action,
        "timestamp": FIXTURE_TIMESTAMP,
        "data": data,
    })
}

/// The canonical "Hello" brief for post `p1`
pub fn hello_payload() -> Value {
    job_payload(
        "p1",
        "created",
        json!({"title": "Hello", "keywords": ["a", "b"], "focus": "f"}),
    )
}

/// Structured provider output with one section
pub const HELLO_ARTICLE: &str =
    r#"{"title":"Hello","sections":[{"subtitle":"S1","content":"C1"}]}"#;

/// Wrap a payload the way the push subscription delivers it
pub fn push_envelope(payload: &Value) -> Value {
    json!({
        "message": {
            "data": STANDARD.encode(payload.to_string()),
            "messageId": "1234567890",
            "publishTime": "2023-11-14T22:13:21Z",
        },
        "subscription": "projects/test/subscriptions/blog-posts-push",
    })
}

/// Convert a JSON object literal into a store document
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture is not a JSON object: {}", other),
    }
}

/// A job record left behind by an earlier delivery
pub fn existing_job(post_id: &str, status: &str, retry_count: u32) -> Document {
    doc(json!({
        "postId": post_id,
        "action": "created",
        "timestamp": FIXTURE_TIMESTAMP,
        "status": status,
        "blogPost": {"title": "Hello"},
        "processedAt": "2023-11-14T22:13:21Z",
        "completedAt": null,
        "errorAt": null,
        "generatedContent": null,
        "sections": null,
        "error": null,
        "retry_count": retry_count,
        "max_retries": 3,
    }))
}
