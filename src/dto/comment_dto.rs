use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(rename = "examCode")]
    pub exam_code: String,
    pub comment: CommentBody,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentBody {
    #[validate(length(min = 1))]
    pub comment: String,
    #[validate(length(min = 1))]
    pub event_status: String,
    pub event_start: Option<i64>,
    pub event_finish: Option<i64>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentFilter {
    pub exam_code: Option<String>,
    pub event_start: Option<i64>,
    pub event_status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
