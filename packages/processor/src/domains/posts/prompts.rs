//! Prompt builders for article generation.
//!
//! Both providers receive the same brief details; the schema-constrained one
//! additionally gets the copywriter persona and structural requirements as a
//! system instruction.

use super::models::Brief;

/// System message for the free-form chat provider
pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant that writes blog posts.";

/// Persona and structural requirements for schema-constrained generation.
pub fn article_system_prompt(language: &str) -> String {
    format!(
        r#"You are an experienced copywriter specializing in engaging articles about digital transformation, process automation and AI for small and medium-sized businesses. You write expert, engaging and well-structured content in {language}, applying SEO principles, conversion strategies and E-E-A-T (Experience, Expertise, Authoritativeness, Trustworthiness).

**Task:**
Generate a complete, well-structured blog article that follows the guidelines below, returned as JSON.

**Content and structure requirements:**
- The article must contain at least 4000 characters.
- Each section (subtitle with its content) must contain between 500 and 800 characters.
- The article should contain:
  - A clearly defined title,
  - A logical structure with subtitles,
  - Key phrases woven into the text,
  - Elements that engage the reader (lists, tips),
  - A call to action (CTA).

**Output format:**
Respond with a single JSON object matching the provided schema:
{{
  "title": "Article title",
  "sections": [
    {{
      "subtitle": "Section subtitle",
      "content": "Section content..."
    }}
  ]
}}

**Additional instructions:**
- The text must not contain markdown elements.
- Write the whole article in {language}."#
    )
}

/// Brief details for the schema-constrained provider
pub fn article_details_prompt(brief: &Brief, additional_context: Option<&str>) -> String {
    let mut parts = vec!["**Article details:**".to_string()];

    if let Some(title) = brief.title() {
        parts.push(format!("- Title: {}", title));
    }
    if !brief.keywords().is_empty() {
        parts.push(format!("- Keywords: {}", brief.keywords().join(", ")));
    }
    if let Some(focus) = non_blank(&brief.focus) {
        parts.push(format!("- Main topic: {}", focus));
    }
    if let Some(original) = non_blank(&brief.original_content) {
        parts.push(format!("\n- Use this content as a base:\n{}", original));
    }
    if let Some(feedback) = non_blank(&brief.feedback) {
        parts.push(format!("\n- Feedback to incorporate:\n{}", feedback));
    }
    push_regeneration_details(&mut parts, brief);
    if let Some(context) = additional_context.filter(|c| !c.trim().is_empty()) {
        parts.push(format!("\n- Additional instructions: {}", context));
    }

    parts.join("\n")
}

/// Single user message for the free-form chat provider
pub fn chat_prompt(brief: &Brief, additional_context: Option<&str>) -> String {
    let mut parts = vec![
        "Please write a blog post with the following details:".to_string(),
        format!("Title: {}", brief.title().unwrap_or("Untitled")),
    ];

    if !brief.keywords().is_empty() {
        parts.push(format!("Keywords: {}", brief.keywords().join(", ")));
    }
    if let Some(focus) = non_blank(&brief.focus) {
        parts.push(format!("Focus: {}", focus));
    }
    if let Some(original) = non_blank(&brief.original_content) {
        parts.push(format!(
            "\nHere is the original content to use as a base:\n{}",
            original
        ));
    }
    if let Some(feedback) = non_blank(&brief.feedback) {
        parts.push(format!("\nFeedback to incorporate:\n{}", feedback));
    }
    push_regeneration_details(&mut parts, brief);
    if let Some(context) = additional_context.filter(|c| !c.trim().is_empty()) {
        parts.push(format!("\nAdditional Instructions: {}", context));
    }

    parts.join("\n")
}

fn push_regeneration_details(parts: &mut Vec<String>, brief: &Brief) {
    if let Some(instructions) = non_blank(&brief.regeneration_instructions) {
        parts.push(format!("\n- Regeneration instructions:\n{}", instructions));
    }
    if let Some(sections) = brief.selected_sections.as_ref().filter(|s| !s.is_empty()) {
        parts.push("\n- Rewrite only these sections, keep the rest:".to_string());
        for section in sections {
            parts.push(format!("  * {}: {}", section.subtitle, section.content));
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
