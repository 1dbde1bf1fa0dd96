use serde::{Deserialize, Serialize};

use super::article::Section;

/// What article to write.
///
/// Every field is optional on the wire: regeneration requests routinely carry
/// only `feedback`, and the rest is filled in from the original post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,

    #[serde(
        default,
        alias = "regeneration_instructions",
        skip_serializing_if = "Option::is_none"
    )]
    pub regeneration_instructions: Option<String>,

    #[serde(
        default,
        alias = "selected_sections",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_sections: Option<Vec<Section>>,

    #[serde(
        default,
        alias = "original_content",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,

    #[serde(
        default,
        alias = "previous_generation",
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_generation: Option<PreviousGeneration>,
}

/// Snapshot of the article a regeneration replaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousGeneration {
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "generated_at")]
    pub generated_at: String,
}

/// The subset of an original post consulted when regenerating
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourcePost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub focus: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

impl Brief {
    /// Title if present and non-blank
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn keywords(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or_default()
    }

    pub fn is_regeneration(&self) -> bool {
        self.previous_generation.is_some()
    }

    /// Overlay title/content/keywords/focus from the original post wherever
    /// this brief leaves them absent (missing, blank, or an empty list).
    pub fn fill_missing_from(&mut self, original: &SourcePost) {
        if is_blank(&self.title) && !is_blank(&original.title) {
            self.title = original.title.clone();
        }
        if is_blank(&self.content) && !is_blank(&original.content) {
            self.content = original.content.clone();
        }
        if self.keywords().is_empty() {
            if let Some(keywords) = original.keywords.as_ref().filter(|k| !k.is_empty()) {
                self.keywords = Some(keywords.clone());
            }
        }
        if is_blank(&self.focus) && !is_blank(&original.focus) {
            self.focus = original.focus.clone();
        }
    }
}
