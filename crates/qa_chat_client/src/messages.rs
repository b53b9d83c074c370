//! HTTP message types for the chat and Q&A record endpoints. Client ↔ server JSON.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Reply text used when a successful chat body carries no usable field.
pub const NO_RESPONSE: &str = "No response received";

/// Client → server: `POST /chat` body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

/// Server → client: chat reply extracted from a decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
}

impl ChatReply {
    /// Picks the first non-empty string among `response`, then `message`;
    /// anything else yields [`NO_RESPONSE`].
    pub fn from_json(value: &serde_json::Value) -> Self {
        let text = ["response", "message"]
            .iter()
            .filter_map(|field| value.get(field).and_then(|v| v.as_str()))
            .find(|s| !s.is_empty())
            .unwrap_or(NO_RESPONSE);
        Self {
            text: text.to_string(),
        }
    }
}

/// Opaque record identifier. The server uses integers; the client never
/// interprets the value beyond placing it in a request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => RecordId(n.to_string()),
            Raw::Text(s) => RecordId(s),
        })
    }
}

/// A question-answer pair as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub question: String,
    pub answer: String,
}

/// Client → server: create/update body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub question: String,
    pub answer: String,
}

impl RecordDraft {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Merges a partial edit over `current`: blank fields keep the current value.
    pub fn merged(question: &str, answer: &str, current: &Record) -> Self {
        let pick = |edit: &str, existing: &str| {
            let edit = edit.trim();
            if edit.is_empty() {
                existing.to_string()
            } else {
                edit.to_string()
            }
        };
        Self {
            question: pick(question, &current.question),
            answer: pick(answer, &current.answer),
        }
    }
}
