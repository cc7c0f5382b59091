use crate::models::event_session::EventSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1))]
    pub testing_center: String,
    #[validate(length(min = 1))]
    pub course_id: String,
    #[validate(length(min = 1))]
    pub course_event_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSessionRequest {
    pub status: Option<String>,
    pub notify: Option<bool>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub hash_key: String,
    pub testing_center: String,
    pub course_id: String,
    pub course_event_id: String,
    pub status: String,
    pub notify: bool,
    pub comment: Option<String>,
    pub proctor: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<EventSession> for SessionResponse {
    fn from(session: EventSession) -> Self {
        Self {
            hash_key: session.hash_key,
            testing_center: session.testing_center,
            course_id: session.course_id,
            course_event_id: session.course_event_id,
            status: session.status.to_string(),
            notify: session.notify,
            comment: session.comment,
            proctor: session.proctor_name,
            start_date: session.start_date,
            end_date: session.end_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchivedSessionFilter {
    pub testing_center: Option<String>,
    pub proctor: Option<String>,
    pub hash_key: Option<String>,
    pub course_id: Option<String>,
    pub course_event_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub count: i64,
    pub page: i64,
    pub results: Vec<T>,
}
