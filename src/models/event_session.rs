use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Archived,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Archived => "archived",
        }
    }

    /// Spelling used in journal notes.
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "IN_PROGRESS",
            SessionStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown session status: {0}")]
pub struct ParseSessionStatusError(String);

impl FromStr for SessionStatus {
    type Err = ParseSessionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "archived" => Ok(SessionStatus::Archived),
            other => Err(ParseSessionStatusError(other.to_string())),
        }
    }
}

impl TryFrom<String> for SessionStatus {
    type Error = ParseSessionStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A testing session: the group of exam attempts sharing a testing center,
/// course and course event. `hash_key` is the push channel identifier and the
/// only session identifier exposed outside the service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSession {
    pub id: Uuid,
    pub testing_center: String,
    pub course_id: String,
    pub course_event_id: String,
    pub hash_key: String,
    #[sqlx(try_from = "String")]
    pub status: SessionStatus,
    pub notify: bool,
    pub comment: Option<String>,
    pub proctor_id: Uuid,
    pub proctor_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Channel key for a new session, derived from its identity tuple and start
/// time. Stored at creation so it stays stable for the session's lifetime.
pub fn make_hash_key(
    testing_center: &str,
    course_id: &str,
    course_event_id: &str,
    start_date: DateTime<Utc>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(testing_center.as_bytes());
    hasher.update(b":");
    hasher.update(course_id.as_bytes());
    hasher.update(b":");
    hasher.update(course_event_id.as_bytes());
    hasher.update(b":");
    hasher.update(start_date.timestamp_millis().to_be_bytes());
    hex::encode(hasher.finalize())
}
