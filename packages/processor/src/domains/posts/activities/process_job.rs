//! Job state machine.
//!
//! Entry point for every delivered job message. Each delivery is handled
//! independently and re-reads the job record; the persisted `retry_count` is
//! the only coordination between deliveries.
//!
//! Transitions, keyed by the record stored under the post id:
//! - no record: create it (`processing`, retry 0) and generate
//! - `failed_permanently`: no-op
//! - `retry_count >= max_retries`: mark `failed_permanently`, skip generation
//! - otherwise: increment `retry_count`, back to `processing`, generate
//!
//! A failed generation is recorded as `error` and propagated so the push
//! channel redelivers, unless the ceiling has been reached, in which case the
//! record becomes `failed_permanently` and the failure is absorbed.

use serde_json::Value;
use tracing::{error, info, warn};

use super::generation::{generate_blog_post, GenerationOutcome};
use crate::common::{ProcessorError, Result};
use crate::domains::posts::models::{
    Brief, JobAction, JobMessage, JobProgress, JobRecord, JobRecordPatch, JobStatus, JobStep,
    SourcePost,
};
use crate::kernel::stores::{from_document, to_document};
use crate::kernel::ServerDeps;

/// How a delivery ended without needing redelivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Article generated and job marked completed
    Completed,
    /// Record was already terminal; nothing done
    AlreadyFailedPermanently,
    /// Ceiling already reached on arrival; marked failed without generating
    RetriesExhausted,
    /// Generation failed on the last allowed attempt; failure absorbed
    FailedPermanently,
}

/// Validate a decoded payload and process it.
pub async fn process_message(payload: Value, deps: &ServerDeps) -> Result<JobOutcome> {
    let message = JobMessage::from_value(payload).map_err(|e| {
        error!(error = %e, "Failed to parse incoming job message");
        e
    })?;

    process_job(message, deps).await
}

/// Drive one delivery of a job through the state machine.
pub async fn process_job(message: JobMessage, deps: &ServerDeps) -> Result<JobOutcome> {
    let post_id = message.post_id.as_str();
    let jobs = deps.collections.jobs.as_str();

    info!(post_id = %post_id, action = %message.action, "Processing job message");

    let in_hand = match deps.store.get(jobs, post_id).await? {
        None => {
            let record = JobRecord::new_processing(&message);
            deps.store
                .set(jobs, post_id, to_document(&record)?)
                .await
                .map_err(|e| {
                    error!(post_id = %post_id, error = %e, "Failed to save initial job record");
                    e
                })?;
            info!(post_id = %post_id, "Initial job record saved");
            JobProgress::from(&record)
        }
        Some(doc) => {
            let progress: JobProgress = from_document(doc)?;
            info!(
                post_id = %post_id,
                status = %progress.status,
                retry_count = progress.retry_count,
                "Found existing job record"
            );

            match progress.next_step() {
                JobStep::Skip => {
                    warn!(post_id = %post_id, "Job is permanently failed, skipping");
                    return Ok(JobOutcome::AlreadyFailedPermanently);
                }
                JobStep::Exhaust => {
                    error!(
                        post_id = %post_id,
                        max_retries = progress.max_retries,
                        "Job exceeded max retries, marking as permanently failed"
                    );
                    write_patch(deps, post_id, &JobRecordPatch::exhausted(&progress)).await?;
                    return Ok(JobOutcome::RetriesExhausted);
                }
                JobStep::Retry { retry_count } => {
                    info!(post_id = %post_id, retry_count = retry_count, "Incrementing retry count");
                    write_patch(deps, post_id, &JobRecordPatch::retrying(retry_count)).await?;
                    JobProgress {
                        status: JobStatus::Processing,
                        retry_count,
                        max_retries: progress.max_retries,
                    }
                }
            }
        }
    };

    let mut brief = message.data.clone();
    if message.action == JobAction::Regenerate {
        merge_original_post(post_id, &mut brief, deps).await?;
    }

    let context = message.additional_context();
    let failure = match generate_blog_post(post_id, brief, Some(&context), deps).await {
        GenerationOutcome::Generated {
            generated_content,
            body,
        } => {
            let patch = JobRecordPatch::completed(generated_content, body.into_sections());
            match write_patch(deps, post_id, &patch).await {
                Ok(()) => {
                    info!(post_id = %post_id, "Job completed");
                    return Ok(JobOutcome::Completed);
                }
                Err(e) => e,
            }
        }
        GenerationOutcome::Error { error } => error,
    };

    record_failure(post_id, failure, in_hand, deps).await
}

/// Fill absent brief fields from the original post.
async fn merge_original_post(post_id: &str, brief: &mut Brief, deps: &ServerDeps) -> Result<()> {
    let source_posts = deps.collections.source_posts.as_str();

    let Some(doc) = deps.store.get(source_posts, post_id).await? else {
        error!(post_id = %post_id, "Could not find original post for regeneration");
        return Err(ProcessorError::NotFound(format!(
            "original post for regeneration: {}/{}",
            source_posts, post_id
        )));
    };

    let original: SourcePost = from_document(doc)?;
    brief.fill_missing_from(&original);
    info!(post_id = %post_id, "Merged original post data for regeneration");
    Ok(())
}

/// Record a failed attempt and decide whether to absorb it.
///
/// `in_hand` is the progress this delivery wrote; it stands in when the
/// record cannot be re-read.
async fn record_failure(
    post_id: &str,
    failure: ProcessorError,
    in_hand: JobProgress,
    deps: &ServerDeps,
) -> Result<JobOutcome> {
    let message = failure.to_string();
    error!(
        post_id = %post_id,
        error = %message,
        kind = failure.kind(),
        retryable = failure.is_retryable(),
        "Error during content generation or final update"
    );

    if let Err(e) = write_patch(deps, post_id, &JobRecordPatch::errored(&message)).await {
        error!(post_id = %post_id, error = %e, "CRITICAL: Failed to update error status");
    }

    let progress = match deps.store.get(&deps.collections.jobs, post_id).await {
        Ok(Some(doc)) => from_document::<JobProgress>(doc).unwrap_or(in_hand),
        Ok(None) => in_hand,
        Err(e) => {
            warn!(post_id = %post_id, error = %e, "Could not re-read job record, using in-hand retry count");
            in_hand
        }
    };

    if !progress.is_exhausted() {
        info!(
            post_id = %post_id,
            retry_count = progress.retry_count,
            max_retries = progress.max_retries,
            "Job will be retried on redelivery"
        );
        return Err(failure);
    }

    error!(
        post_id = %post_id,
        max_retries = progress.max_retries,
        "Marking job as permanently failed"
    );
    let patch = JobRecordPatch::failed_permanently(&progress, &message);
    if let Err(e) = write_patch(deps, post_id, &patch).await {
        error!(
            post_id = %post_id,
            error = %e,
            "CRITICAL: Failed to mark job as permanently failed"
        );
    }

    Ok(JobOutcome::FailedPermanently)
}

async fn write_patch(deps: &ServerDeps, post_id: &str, patch: &JobRecordPatch) -> Result<()> {
    deps.store
        .update(&deps.collections.jobs, post_id, to_document(patch)?)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{MockTextGenerator, TestDependencies};
    use serde_json::json;

    fn message(action: &str) -> JobMessage {
        JobMessage::from_value(json!({
            "postId": "p1",
            "action": action,
            "timestamp": 1700000000000i64,
            "data": {"title": "Hello", "keywords": ["a", "b"], "focus": "f"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn invalid_payload_is_a_validation_error() {
        let test_deps = TestDependencies::new();
        let err = process_message(json!({"action": "created"}), &test_deps.server_deps())
            .await
            .unwrap_err();

        assert!(matches!(err, ProcessorError::Validation(_)));
        assert_eq!(test_deps.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn provider_receives_action_context() {
        let test_deps = TestDependencies::new();
        process_job(message("updated"), &test_deps.server_deps())
            .await
            .unwrap();

        let calls = test_deps.generator.calls();
        assert_eq!(
            calls[0].additional_context.as_deref(),
            Some("This post was updated at 2023-11-14T22:13:20+00:00.")
        );
    }

    #[tokio::test]
    async fn first_failure_is_recorded_and_propagated() {
        let test_deps = TestDependencies::new()
            .with_generator(MockTextGenerator::failing("quota exceeded"));
        let deps = test_deps.server_deps();

        let err = process_job(message("created"), &deps).await.unwrap_err();

        assert_eq!(err, ProcessorError::Provider("quota exceeded".into()));
        let stored = test_deps.store.snapshot("posts", "p1").unwrap();
        assert_eq!(stored["status"], "error");
        assert_eq!(stored["retry_count"], 0);
    }
}
