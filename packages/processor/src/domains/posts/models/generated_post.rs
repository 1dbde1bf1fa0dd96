use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::Section;
use super::brief::PreviousGeneration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeneratedPostStatus {
    Generated,
    Error,
}

/// Generated article, one document per original post id.
///
/// A later generation for the same post overwrites the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPostRecord {
    pub id: String,
    pub title: String,
    pub original_content: String,
    pub keywords: Vec<String>,
    pub focus: String,
    pub generated_content: Option<String>,
    pub sections: Option<Vec<Section>>,
    pub generated_at: DateTime<Utc>,
    pub status: GeneratedPostStatus,
    pub previous_generation: Option<PreviousGeneration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_wire_field_names() {
        let record = GeneratedPostRecord {
            id: "p1".into(),
            title: "Hello".into(),
            original_content: String::new(),
            keywords: vec!["a".into()],
            focus: "f".into(),
            generated_content: Some("text".into()),
            sections: None,
            generated_at: Utc::now(),
            status: GeneratedPostStatus::Generated,
            previous_generation: Some(PreviousGeneration {
                content: "v1".into(),
                generated_at: "2024-01-01T00:00:00Z".into(),
            }),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "generated");
        assert_eq!(value["previousGeneration"]["generatedAt"], "2024-01-01T00:00:00Z");
        for field in ["originalContent", "generatedContent", "generatedAt", "sections"] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
    }
}
