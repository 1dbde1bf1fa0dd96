use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One subtitle + body pair of a generated article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub subtitle: String,
    pub content: String,
}

/// Shape the schema-constrained provider is asked to return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedArticle {
    /// Article headline
    pub title: String,
    /// Body split into titled sections
    pub sections: Vec<Section>,
}

/// How provider output was interpreted.
///
/// Providers return either a JSON object carrying a `sections` array or free
/// text. Free text is a legitimate result, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleBody {
    Structured(Vec<Section>),
    Unstructured,
}

impl ArticleBody {
    /// Interpret raw provider output.
    ///
    /// Anything that is not a JSON object with a well-formed `sections` array
    /// (including malformed section entries) is unstructured.
    pub fn parse(raw: &str) -> Self {
        #[derive(Deserialize)]
        struct WithSections {
            sections: Vec<Section>,
        }

        let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(_) => return ArticleBody::Unstructured,
        };

        if !value.is_object() {
            return ArticleBody::Unstructured;
        }

        match serde_json::from_value::<WithSections>(value) {
            Ok(parsed) => ArticleBody::Structured(parsed.sections),
            Err(_) => ArticleBody::Unstructured,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ArticleBody::Structured(_))
    }

    /// Sections to persist, `None` for unstructured output
    pub fn sections(&self) -> Option<&[Section]> {
        match self {
            ArticleBody::Structured(sections) => Some(sections),
            ArticleBody::Unstructured => None,
        }
    }

    pub fn into_sections(self) -> Option<Vec<Section>> {
        match self {
            ArticleBody::Structured(sections) => Some(sections),
            ArticleBody::Unstructured => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_with_sections_is_structured() {
        let raw = r#"{"title":"Hello","sections":[{"subtitle":"S1","content":"C1"}]}"#;
        assert_eq!(
            ArticleBody::parse(raw),
            ArticleBody::Structured(vec![Section {
                subtitle: "S1".into(),
                content: "C1".into(),
            }])
        );
    }

    #[test]
    fn title_is_not_required_for_structured_output() {
        let raw = r#"{"sections":[]}"#;
        assert_eq!(ArticleBody::parse(raw), ArticleBody::Structured(vec![]));
    }

    #[test]
    fn plain_text_is_unstructured() {
        assert_eq!(
            ArticleBody::parse("Once upon a time in digital transformation..."),
            ArticleBody::Unstructured
        );
    }

    #[test]
    fn json_without_sections_is_unstructured() {
        assert_eq!(ArticleBody::parse(r#"{"title":"x"}"#), ArticleBody::Unstructured);
        assert_eq!(ArticleBody::parse("[1,2,3]"), ArticleBody::Unstructured);
    }

    #[test]
    fn malformed_section_entries_are_unstructured() {
        let raw = r#"{"sections":[{"subtitle":"only a subtitle"}]}"#;
        assert_eq!(ArticleBody::parse(raw), ArticleBody::Unstructured);
    }
}
