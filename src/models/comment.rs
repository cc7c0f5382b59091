use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A reviewed incident window on an exam attempt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub comment: String,
    pub event_status: String,
    pub event_start: Option<i64>,
    pub event_finish: Option<i64>,
    pub duration: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert shape for a comment. Uniqueness is enforced at the service layer on
/// `(comment, event_status, exam_id)`.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub exam_id: Uuid,
    pub comment: String,
    pub event_status: String,
    pub event_start: Option<i64>,
    pub event_finish: Option<i64>,
    pub duration: Option<i64>,
}
