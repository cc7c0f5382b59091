use crate::models::exam::Exam;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StopExamRequest {
    pub action: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopExamsRequest {
    pub attempts: Vec<StopExamItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopExamItem {
    pub attempt_code: String,
    pub action: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExamCodeListRequest {
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartExamResponse {
    pub hash: String,
    pub proctor: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopExamResponse {
    pub hash: String,
    pub status: String,
}

/// Listing shape for archived exams. Exposes the generated key as `hash`;
/// storage ids stay internal.
#[derive(Debug, Clone, Serialize)]
pub struct ArchivedExamResponse {
    pub hash: String,
    pub exam_code: String,
    pub event_hash: String,
    pub course_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub exam_status: String,
    pub attempt_status: Option<String>,
    pub proctor: Option<String>,
    pub exam_start_date: Option<DateTime<Utc>>,
    pub exam_end_date: Option<DateTime<Utc>>,
}

impl From<Exam> for ArchivedExamResponse {
    fn from(exam: Exam) -> Self {
        Self {
            hash: exam.generated_key(),
            exam_code: exam.exam_code,
            event_hash: exam.event_hash,
            course_id: exam.course_id,
            username: exam.username,
            email: exam.email,
            exam_status: exam.exam_status.to_string(),
            attempt_status: exam.attempt_status,
            proctor: exam.proctor_name,
            exam_start_date: exam.exam_start_date,
            exam_end_date: exam.exam_end_date,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchivedExamFilter {
    pub event_hash: Option<String>,
    #[serde(rename = "courseID")]
    pub course_id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "examStartDate")]
    pub exam_start_date: Option<String>,
    #[serde(rename = "examEndDate")]
    pub exam_end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
