use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use typed_builder::TypedBuilder;

use super::article::Section;
use super::brief::Brief;
use crate::common::{ProcessorError, Result};

/// Retry ceiling written into every new job record
pub const DEFAULT_MAX_RETRIES: u32 = 3;

// =============================================================================
// Enums
// =============================================================================

/// What happened to the post upstream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    Created,
    Updated,
    Deleted,
    Regenerate,
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobAction::Created => write!(f, "created"),
            JobAction::Updated => write!(f, "updated"),
            JobAction::Deleted => write!(f, "deleted"),
            JobAction::Regenerate => write!(f, "regenerate"),
        }
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Processing,
    Completed,
    Error,
    FailedPermanently,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::FailedPermanently)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Error => write!(f, "error"),
            JobStatus::FailedPermanently => write!(f, "failed_permanently"),
        }
    }
}

// =============================================================================
// Inbound message
// =============================================================================

/// A job as delivered by the push channel
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobMessage {
    #[serde(rename = "postId", alias = "post_id")]
    pub post_id: String,
    pub action: JobAction,
    /// Event time of the originating request, epoch millis
    pub timestamp: i64,
    pub data: Brief,
}

impl JobMessage {
    /// Validate a decoded JSON payload
    pub fn from_value(payload: Value) -> Result<Self> {
        let message: JobMessage = serde_json::from_value(payload)
            .map_err(|e| ProcessorError::Validation(e.to_string()))?;

        if message.post_id.trim().is_empty() {
            return Err(ProcessorError::Validation("postId must not be empty".into()));
        }

        Ok(message)
    }

    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Free-text context handed to the provider alongside the brief
    pub fn additional_context(&self) -> String {
        match self.event_time() {
            Some(at) => format!("This post was {} at {}.", self.action, at.to_rfc3339()),
            None => format!("This post was {}.", self.action),
        }
    }
}

// =============================================================================
// Persisted job record
// =============================================================================

/// One job lifecycle document per post id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[builder(setter(into))]
    pub post_id: String,
    pub action: JobAction,
    pub timestamp: i64,
    #[builder(default)]
    pub status: JobStatus,
    pub blog_post: Brief,
    #[builder(default = Utc::now())]
    pub processed_at: DateTime<Utc>,
    #[builder(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[builder(default)]
    pub error_at: Option<DateTime<Utc>>,
    #[builder(default)]
    pub generated_content: Option<String>,
    #[builder(default)]
    pub sections: Option<Vec<Section>>,
    #[builder(default)]
    pub error: Option<String>,
    #[serde(rename = "retry_count")]
    #[builder(default)]
    pub retry_count: u32,
    #[serde(rename = "max_retries")]
    #[builder(default = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

impl JobRecord {
    /// Fresh record for a first delivery
    pub fn new_processing(message: &JobMessage) -> Self {
        JobRecord::builder()
            .post_id(message.post_id.clone())
            .action(message.action)
            .timestamp(message.timestamp)
            .blog_post(message.data.clone())
            .build()
    }
}

/// The retry bookkeeping of an existing record.
///
/// Read leniently: records written by other tools may lack the counters or
/// carry a status this service never writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct JobProgress {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: JobStatus,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Unrecognized statuses read as `error` so the record stays under retry
/// accounting instead of failing every delivery.
fn lenient_status<'de, D>(deserializer: D) -> std::result::Result<JobStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let status = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => JobStatus::default(),
        Some(value) => serde_json::from_value(value).unwrap_or(JobStatus::Error),
    };
    Ok(status)
}

/// What to do with a redelivered job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStep {
    /// Record is terminal; do nothing
    Skip,
    /// Ceiling reached; mark failed without generating
    Exhaust,
    /// Generate again with the incremented counter
    Retry { retry_count: u32 },
}

impl JobProgress {
    pub fn is_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    pub fn next_step(&self) -> JobStep {
        if self.status.is_terminal() {
            JobStep::Skip
        } else if self.is_exhausted() {
            JobStep::Exhaust
        } else {
            JobStep::Retry {
                retry_count: self.retry_count + 1,
            }
        }
    }
}

impl From<&JobRecord> for JobProgress {
    fn from(record: &JobRecord) -> Self {
        Self {
            status: record.status,
            retry_count: record.retry_count,
            max_retries: record.max_retries,
        }
    }
}

// =============================================================================
// Partial updates
// =============================================================================

/// Fields written on a state transition. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_content: Option<String>,
    /// Outer `None` leaves sections alone; `Some(None)` writes null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Option<Vec<Section>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "retry_count", skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
}

impl JobRecordPatch {
    pub fn retrying(retry_count: u32) -> Self {
        Self {
            status: Some(JobStatus::Processing),
            processed_at: Some(Utc::now()),
            retry_count: Some(retry_count),
            ..Default::default()
        }
    }

    pub fn exhausted(progress: &JobProgress) -> Self {
        Self {
            status: Some(JobStatus::FailedPermanently),
            error_at: Some(Utc::now()),
            error: Some(format!(
                "Exceeded maximum retry attempts ({})",
                progress.max_retries
            )),
            retry_count: Some(progress.retry_count),
            ..Default::default()
        }
    }

    pub fn completed(generated_content: String, sections: Option<Vec<Section>>) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            completed_at: Some(Utc::now()),
            generated_content: Some(generated_content),
            sections: Some(sections),
            ..Default::default()
        }
    }

    pub fn errored(message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Error),
            error_at: Some(Utc::now()),
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn failed_permanently(progress: &JobProgress, last_error: &str) -> Self {
        Self {
            status: Some(JobStatus::FailedPermanently),
            error_at: Some(Utc::now()),
            error: Some(format!(
                "Permanently failed after {} retries. Last error: {}",
                progress.max_retries, last_error
            )),
            retry_count: Some(progress.retry_count),
            ..Default::default()
        }
    }
}
