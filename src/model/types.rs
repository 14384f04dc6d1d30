//! Records exchanged with the suggestion service.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One ranked term, as returned by both `suggest` and `top`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    pub term: String,
    pub frequency: u64,
}

impl Suggestion {
    pub fn new(term: impl Into<String>, frequency: u64) -> Self {
        Self {
            term: term.into(),
            frequency,
        }
    }
}

/// Response body of `GET /suggest`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    /// Prefix echoed back by the service.
    pub prefix: String,
    /// Already ranked, most frequent first. Clients never re-sort.
    pub suggestions: Vec<Suggestion>,
    /// Server-side lookup time.
    pub execution_time_ms: u64,
}

/// Request body of `POST /submit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitRequest {
    pub term: String,
}

/// Stored usage record, returned after a successful `submit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TermRecord {
    pub id: i64,
    pub term: String,
    pub frequency: u64,
    #[serde(default)]
    pub last_used: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_response_reads_camel_case() {
        let body = r#"{"prefix":"ja","suggestions":[{"term":"java","frequency":1500},{"term":"jakarta","frequency":200}],"executionTimeMs":3}"#;
        let parsed: SuggestResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.prefix, "ja");
        assert_eq!(parsed.execution_time_ms, 3);
        assert_eq!(parsed.suggestions[1], Suggestion::new("jakarta", 200));
    }

    #[test]
    fn term_record_accepts_local_timestamps() {
        let body = r#"{"id":7,"term":"rust","frequency":12,"lastUsed":"2024-05-01T10:15:30.123","createdAt":"2024-04-01T08:00:00"}"#;
        let parsed: TermRecord = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.frequency, 12);
        assert!(parsed.last_used.is_some());
        assert!(parsed.created_at.is_some());
    }
}
