//! HTTP route tests, driving the router in-process with `oneshot`.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use processor_core::kernel::MockTextGenerator;
use serde_json::{json, Value};
use test_context::test_context;
use tower::ServiceExt;

use crate::common::*;

async fn post_json(ctx: &TestHarness, uri: &str, body: String) -> (StatusCode, Value) {
    let response = ctx
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get_json(ctx: &TestHarness, uri: &str) -> (StatusCode, Value) {
    let response = ctx
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn encoded_push_message_is_processed_and_acknowledged() {
    let ctx = TestHarness::with_generator(MockTextGenerator::new().with_response(HELLO_ARTICLE));
    let envelope = push_envelope(&hello_payload());

    let (status, body) = post_json(&ctx, "/pubsub/push", envelope.to_string()).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert_eq!(ctx.job("p1").unwrap()["status"], "completed");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unencoded_message_object_is_accepted(ctx: &TestHarness) {
    let envelope = json!({"message": hello_payload(), "subscription": "sub"});

    let (status, _) = post_json(ctx, "/pubsub/push", envelope.to_string()).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.generator.call_count(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn malformed_envelope_is_a_server_error(ctx: &TestHarness) {
    let (status, body) = post_json(ctx, "/pubsub/push", "not json".to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Failed to process message: invalid job message"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invalid_job_message_is_a_server_error(ctx: &TestHarness) {
    let envelope = push_envelope(&json!({"postId": "p1", "action": "published"}));

    let (status, body) = post_json(ctx, "/pubsub/push", envelope.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("invalid job message"));
    assert_eq!(ctx.store.count("posts"), 0);
}

#[tokio::test]
async fn provider_failure_requests_redelivery_until_the_ceiling() {
    let ctx = TestHarness::with_generator(MockTextGenerator::failing("quota exceeded"));
    let envelope = push_envelope(&hello_payload()).to_string();

    for _ in 0..3 {
        let (status, body) = post_json(&ctx, "/pubsub/push", envelope.clone()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["detail"],
            "Failed to process message: provider error: quota exceeded"
        );
    }

    let (status, _) = post_json(&ctx, "/pubsub/push", envelope.clone()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.job("p1").unwrap()["status"], "failed_permanently");

    let (status, _) = post_json(&ctx, "/pubsub/push", envelope).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.generator.call_count(), 4);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reports_backends(ctx: &TestHarness) {
    let (status, body) = get_json(ctx, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "store": "memory", "provider": "mock"})
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn root_says_hello(ctx: &TestHarness) {
    let (status, body) = get_json(ctx, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Hello": "World"}));
}
