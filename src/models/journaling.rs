use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Category of an audit record. Rows are append-only: created once, never
/// mutated or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalType {
    ExamStatusChange,
    EventSessionStart,
    EventSessionStatusChange,
    ExamComment,
    BulkExamStatusChange,
}

impl JournalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalType::ExamStatusChange => "exam_status_change",
            JournalType::EventSessionStart => "event_session_start",
            JournalType::EventSessionStatusChange => "event_session_status_change",
            JournalType::ExamComment => "exam_comment",
            JournalType::BulkExamStatusChange => "bulk_exam_status_change",
        }
    }
}

impl fmt::Display for JournalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown journal type: {0}")]
pub struct ParseJournalTypeError(String);

impl FromStr for JournalType {
    type Err = ParseJournalTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exam_status_change" => Ok(JournalType::ExamStatusChange),
            "event_session_start" => Ok(JournalType::EventSessionStart),
            "event_session_status_change" => Ok(JournalType::EventSessionStatusChange),
            "exam_comment" => Ok(JournalType::ExamComment),
            "bulk_exam_status_change" => Ok(JournalType::BulkExamStatusChange),
            other => Err(ParseJournalTypeError(other.to_string())),
        }
    }
}

impl TryFrom<String> for JournalType {
    type Error = ParseJournalTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Journaling {
    pub id: Uuid,
    #[sqlx(try_from = "String")]
    pub journal_type: JournalType,
    pub event_id: Option<Uuid>,
    pub exam_id: Option<Uuid>,
    pub proctor_id: Option<Uuid>,
    pub proctor_name: Option<String>,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub journal_type: JournalType,
    pub event_id: Option<Uuid>,
    pub exam_id: Option<Uuid>,
    pub proctor_id: Option<Uuid>,
    pub proctor_name: Option<String>,
    pub note: Option<String>,
}
