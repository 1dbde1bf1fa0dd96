//! Generation orchestrator.
//!
//! Turns a brief into a persisted [`GeneratedPostRecord`] and reports the
//! outcome. Failures are returned as [`GenerationOutcome::Error`] rather than
//! raised, so the job state machine keeps control of retry accounting.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::common::{ProcessorError, Result};
use crate::domains::posts::models::{ArticleBody, Brief, GeneratedPostRecord, GeneratedPostStatus};
use crate::kernel::stores::to_document;
use crate::kernel::ServerDeps;

/// Result of one generation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated {
        generated_content: String,
        body: ArticleBody,
    },
    Error {
        error: ProcessorError,
    },
}

/// Placeholder title for briefs that arrive without one.
///
/// Embeds the wall-clock time, so retries produce different titles.
pub fn fallback_title(post_id: &str) -> String {
    format!("Generated content for {} at {}", post_id, Utc::now().to_rfc3339())
}

/// Generate an article for `brief` and store it under `post_id`.
pub async fn generate_blog_post(
    post_id: &str,
    brief: Brief,
    additional_context: Option<&str>,
    deps: &ServerDeps,
) -> GenerationOutcome {
    match try_generate(post_id, brief, additional_context, deps).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(post_id = %post_id, error = %e, kind = e.kind(), "Article generation failed");
            GenerationOutcome::Error { error: e }
        }
    }
}

async fn try_generate(
    post_id: &str,
    mut brief: Brief,
    additional_context: Option<&str>,
    deps: &ServerDeps,
) -> Result<GenerationOutcome> {
    info!(
        post_id = %post_id,
        title = brief.title().unwrap_or("[No title provided]"),
        is_regeneration = brief.is_regeneration(),
        provider = deps.generator.provider_name(),
        "Generating blog post content"
    );

    if brief.title().is_none() {
        let title = fallback_title(post_id);
        warn!(post_id = %post_id, title = %title, "No title provided, using fallback title");
        brief.title = Some(title);
    }

    let generated_content = tokio::time::timeout(
        deps.generation_timeout,
        deps.generator.generate(&brief, additional_context),
    )
    .await
    .map_err(|_| {
        ProcessorError::Provider(format!(
            "text generation timed out after {}s",
            deps.generation_timeout.as_secs()
        ))
    })??;

    let body = ArticleBody::parse(&generated_content);
    if !body.is_structured() {
        warn!(
            post_id = %post_id,
            preview = genai_client::truncate_to_char_boundary(&generated_content, 100),
            "Generated content is not structured JSON, keeping raw text"
        );
    }

    if brief.previous_generation.is_some() {
        info!(post_id = %post_id, "Including previous generation in the generated post");
    }

    let record = GeneratedPostRecord {
        id: post_id.to_string(),
        title: brief.title().unwrap_or_default().to_string(),
        original_content: brief.original_content.clone().unwrap_or_default(),
        keywords: brief.keywords().to_vec(),
        focus: brief.focus.clone().unwrap_or_default(),
        generated_content: Some(generated_content.clone()),
        sections: body.sections().map(<[_]>::to_vec),
        generated_at: Utc::now(),
        status: GeneratedPostStatus::Generated,
        previous_generation: brief.previous_generation.clone(),
    };

    deps.store
        .set(
            &deps.collections.generated_posts,
            post_id,
            to_document(&record)?,
        )
        .await?;

    info!(
        post_id = %post_id,
        collection = %deps.collections.generated_posts,
        structured = body.is_structured(),
        "Saved generated post"
    );

    Ok(GenerationOutcome::Generated {
        generated_content,
        body,
    })
}
