// src/domain/note.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{template, Document, DomainError};

/// Note as delivered by the loading boundary; content may still be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub notebook_id: Option<String>,
}

/// A loaded note whose content is always a well-formed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: Document,
    pub notebook_id: Option<String>,
}

impl Note {
    /// Null content is replaced by the default template.
    pub fn from_record(record: NoteRecord) -> Result<Self, DomainError> {
        let content = match record.content {
            None | Some(Value::Null) => template::getting_started(),
            Some(value) => Document::from_value(value)?,
        };
        Ok(Self {
            id: record.id,
            title: record.title,
            content,
            notebook_id: record.notebook_id.filter(|id| !id.is_empty()),
        })
    }

    pub fn into_record(self) -> NoteRecord {
        NoteRecord {
            content: Some(self.content.to_value()),
            id: self.id,
            title: self.title,
            notebook_id: self.notebook_id,
        }
    }
}

/// Body of a replace-note call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    pub title: String,
    pub content: Document,
    pub notebook_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_record_without_content_when_loading_then_seeds_template() {
        let record = NoteRecord {
            id: "n1".into(),
            title: String::new(),
            content: None,
            notebook_id: Some("nb".into()),
        };

        let note = Note::from_record(record).expect("valid note");

        assert_eq!(note.content, template::getting_started());
    }

    #[test]
    fn given_empty_notebook_id_when_loading_then_treated_as_missing() {
        let record = NoteRecord {
            id: "n1".into(),
            title: "t".into(),
            content: Some(json!({"type": "document", "content": []})),
            notebook_id: Some(String::new()),
        };

        let note = Note::from_record(record).expect("valid note");

        assert_eq!(note.notebook_id, None);
    }

    #[test]
    fn given_payload_when_serializing_then_uses_camel_case_fields() {
        let payload = NotePayload {
            title: "Hello".into(),
            content: Document::new(vec![crate::domain::Block::paragraph("x")]),
            notebook_id: "nb-1".into(),
        };

        let value = serde_json::to_value(&payload).expect("serializable");

        assert_eq!(value["notebookId"], "nb-1");
        assert_eq!(value["content"]["type"], "document");
    }
}
