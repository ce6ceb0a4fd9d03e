use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exchange in a chat transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// The question as the user typed it.
    User {
        content: String,
        timestamp: DateTime<Utc>,
    },
    /// Result summary plus the query the service generated.
    Assistant {
        content: String,
        sql_query: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        content: String,
        timestamp: DateTime<Utc>,
    },
}

impl TranscriptEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, sql_query: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            sql_query: sql_query.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::Error {
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::User { content, .. }
            | Self::Assistant { content, .. }
            | Self::Error { content, .. } => content,
        }
    }

    /// Generated query text. Only assistant entries carry one.
    pub fn generated_query(&self) -> Option<&str> {
        match self {
            Self::Assistant { sql_query, .. } => Some(sql_query),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::User { timestamp, .. }
            | Self::Assistant { timestamp, .. }
            | Self::Error { timestamp, .. } => *timestamp,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let entry = TranscriptEntry::assistant("Found 2 results", "SELECT 1");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "assistant");
        assert_eq!(json["content"], "Found 2 results");
        assert_eq!(json["sql_query"], "SELECT 1");
        assert!(json["timestamp"].is_string());

        let json = serde_json::to_value(TranscriptEntry::error("boom")).unwrap();
        assert_eq!(json["type"], "error");
        assert!(json.get("sql_query").is_none());
    }

    #[test]
    fn roundtrip_keeps_variant() {
        let entry = TranscriptEntry::user("hi");
        let text = serde_json::to_string(&entry).unwrap();
        let back: TranscriptEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn only_assistant_has_query() {
        assert_eq!(TranscriptEntry::user("q").generated_query(), None);
        assert_eq!(TranscriptEntry::error("e").generated_query(), None);
        assert_eq!(
            TranscriptEntry::assistant("a", "SELECT 1").generated_query(),
            Some("SELECT 1")
        );
    }
}
