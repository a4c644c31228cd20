//! Transcript message types.
//!
//! A study session transcript is an ordered sequence of [`Message`]s. User
//! entries are immutable once appended; the assistant entry at the tail may
//! grow while `is_streaming` is set and receives its citations/verdict at
//! finalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a transcript entry. Exactly two; the session core never produces
/// system-role entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Interaction mode attached to user turns and echoed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    Answer,
    Summarize,
    DeepDive,
}

impl StudyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StudyMode::Answer => "answer",
            StudyMode::Summarize => "summarize",
            StudyMode::DeepDive => "deep_dive",
        }
    }
}

/// How well an answer was grounded in the user's own documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Ambiguous,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationSource {
    Pdf,
    Web,
}

/// A structured source reference supporting an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source_type: CitationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub snippet: String,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<StudyMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_streaming: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A finalized user entry. User entries are never mutated after creation.
    pub fn user(content: impl Into<String>, mode: StudyMode) -> Self {
        Self {
            id: Some(new_message_id()),
            role: Role::User,
            content: content.into(),
            mode: Some(mode),
            citations: Vec::new(),
            verdict: None,
            follow_up: None,
            is_streaming: false,
            created_at: Utc::now(),
        }
    }

    /// A fresh assistant entry in streaming state, seeded with the first
    /// chunk of content.
    pub fn streaming_assistant(content: impl Into<String>) -> Self {
        Self {
            id: Some(new_message_id()),
            role: Role::Assistant,
            content: content.into(),
            mode: None,
            citations: Vec::new(),
            verdict: None,
            follow_up: None,
            is_streaming: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

fn new_message_id() -> String {
    format!("msg_{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&StudyMode::DeepDive).unwrap(),
            "\"deep_dive\""
        );
        assert_eq!(StudyMode::DeepDive.as_str(), "deep_dive");
    }

    #[test]
    fn citation_optional_fields_default() {
        let c: Citation = serde_json::from_str(
            r#"{"source_type":"pdf","document_name":"calc.pdf","page_number":12,"snippet":"limits"}"#,
        )
        .unwrap();
        assert_eq!(c.source_type, CitationSource::Pdf);
        assert_eq!(c.page_number, Some(12));
        assert!(c.id.is_none());
        assert!(c.url.is_none());
    }

    #[test]
    fn user_message_is_finalized() {
        let m = Message::user("What is a derivative?", StudyMode::Answer);
        assert_eq!(m.role, Role::User);
        assert!(!m.is_streaming);
        assert!(m.citations.is_empty());
        assert!(m.verdict.is_none());
    }

    #[test]
    fn message_serializes_without_empty_metadata() {
        let m = Message::user("hi", StudyMode::Answer);
        let v = serde_json::to_value(&m).unwrap();
        let obj = v.as_object().unwrap();
        assert!(!obj.contains_key("citations"));
        assert!(!obj.contains_key("verdict"));
        assert!(!obj.contains_key("is_streaming"));
    }
}
