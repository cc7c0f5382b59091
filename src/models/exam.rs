use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Proctoring lifecycle of an exam attempt. `attempt_status` on [`Exam`] is a
/// separate free-text mirror of the upstream state and is not constrained to
/// this sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    New,
    Started,
    Finished,
    Failed,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::New => "new",
            ExamStatus::Started => "started",
            ExamStatus::Finished => "finished",
            ExamStatus::Failed => "failed",
        }
    }

    /// Spelling used in journal notes and upstream-facing text.
    pub fn label(&self) -> &'static str {
        match self {
            ExamStatus::New => "NEW",
            ExamStatus::Started => "STARTED",
            ExamStatus::Finished => "FINISHED",
            ExamStatus::Failed => "FAILED",
        }
    }

    /// Single transition table for proctor-driven status changes.
    pub fn can_transition_to(self, to: ExamStatus) -> bool {
        match (self, to) {
            (ExamStatus::New, ExamStatus::Started) => true,
            (ExamStatus::Started, ExamStatus::Finished) => true,
            (ExamStatus::Started, ExamStatus::Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown exam status: {0}")]
pub struct ParseExamStatusError(String);

impl FromStr for ExamStatus {
    type Err = ParseExamStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ExamStatus::New),
            "started" => Ok(ExamStatus::Started),
            "finished" => Ok(ExamStatus::Finished),
            "failed" => Ok(ExamStatus::Failed),
            other => Err(ParseExamStatusError(other.to_string())),
        }
    }
}

impl TryFrom<String> for ExamStatus {
    type Error = ParseExamStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An exam attempt. Rows are created when the upstream platform registers the
/// attempt; this service only moves them through the lifecycle. `event_hash`
/// is the owning session's hash key, selected alongside via join, and is the
/// push channel for all notifications about this exam.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exam {
    pub id: Uuid,
    pub exam_code: String,
    pub event_id: Uuid,
    pub event_hash: String,
    pub course_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    #[sqlx(try_from = "String")]
    pub exam_status: ExamStatus,
    pub attempt_status: Option<String>,
    pub proctor_id: Option<Uuid>,
    pub proctor_name: Option<String>,
    pub exam_start_date: Option<DateTime<Utc>>,
    pub exam_end_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Exam {
    /// Stable external identifier for this attempt (the upstream
    /// `ssiRecordLocator`). Derived from the exam code so it never leaks the
    /// storage key.
    pub fn generated_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.exam_code.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(code: &str) -> Exam {
        Exam {
            id: Uuid::new_v4(),
            exam_code: code.to_string(),
            event_id: Uuid::new_v4(),
            event_hash: "channel".to_string(),
            course_id: "course-v1:org+num+run".to_string(),
            username: None,
            email: None,
            exam_status: ExamStatus::New,
            attempt_status: None,
            proctor_id: None,
            proctor_name: None,
            exam_start_date: None,
            exam_end_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn transition_table() {
        assert!(ExamStatus::New.can_transition_to(ExamStatus::Started));
        assert!(ExamStatus::Started.can_transition_to(ExamStatus::Finished));
        assert!(ExamStatus::Started.can_transition_to(ExamStatus::Failed));
        assert!(!ExamStatus::New.can_transition_to(ExamStatus::Finished));
        assert!(!ExamStatus::Started.can_transition_to(ExamStatus::New));
        assert!(!ExamStatus::Finished.can_transition_to(ExamStatus::Started));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ExamStatus::New,
            ExamStatus::Started,
            ExamStatus::Finished,
            ExamStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<ExamStatus>().unwrap(), status);
        }
        assert!("submitted".parse::<ExamStatus>().is_err());
    }

    #[test]
    fn generated_key_is_deterministic_and_not_the_row_id() {
        let a = exam("C27DE6D1-39D6-4147-8BE0-9E9440D4A971");
        let b = exam("C27DE6D1-39D6-4147-8BE0-9E9440D4A971");
        assert_eq!(a.generated_key(), b.generated_key());
        assert_ne!(a.generated_key(), a.id.to_string());
        assert_ne!(a.generated_key(), exam("other-code").generated_key());
    }
}
