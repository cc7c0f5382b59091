use serde::{Deserialize, Serialize};

/// Review submission as the review gateway sends it. All four top-level
/// fields are required; presence is checked by [`ReviewPayload::validated`]
/// so a malformed payload is rejected before any row or upstream call.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPayload {
    #[serde(rename = "examMetaData")]
    pub exam_meta_data: Option<ExamMetaData>,
    #[serde(rename = "reviewStatus")]
    pub review_status: Option<String>,
    #[serde(rename = "videoReviewLink")]
    pub video_review_link: Option<String>,
    #[serde(rename = "desktopComments")]
    pub desktop_comments: Option<Vec<DesktopComment>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamMetaData {
    #[serde(rename = "examCode")]
    pub exam_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesktopComment {
    pub comments: Option<String>,
    #[serde(rename = "eventStatus")]
    pub event_status: Option<String>,
    #[serde(rename = "eventStart")]
    pub event_start: Option<i64>,
    #[serde(rename = "eventFinish")]
    pub event_finish: Option<i64>,
    pub duration: Option<i64>,
}

/// Fully validated review payload handed to the transition engine.
#[derive(Debug, Clone)]
pub struct ValidatedReview {
    pub exam_code: String,
    pub review_status: String,
    pub video_review_link: String,
    pub desktop_comments: Vec<DesktopComment>,
}

impl ReviewPayload {
    pub fn validated(self) -> crate::error::Result<ValidatedReview> {
        let meta = self
            .exam_meta_data
            .ok_or_else(|| crate::error::Error::BadRequest("examMetaData is required".into()))?;
        let exam_code = meta
            .exam_code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| {
                crate::error::Error::BadRequest("examMetaData.examCode is required".into())
            })?;
        let review_status = self
            .review_status
            .ok_or_else(|| crate::error::Error::BadRequest("reviewStatus is required".into()))?;
        let video_review_link = self.video_review_link.ok_or_else(|| {
            crate::error::Error::BadRequest("videoReviewLink is required".into())
        })?;
        let desktop_comments = self.desktop_comments.ok_or_else(|| {
            crate::error::Error::BadRequest("desktopComments is required".into())
        })?;

        Ok(ValidatedReview {
            exam_code,
            review_status,
            video_review_link,
            desktop_comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> ReviewPayload {
        ReviewPayload {
            exam_meta_data: Some(ExamMetaData {
                exam_code: Some("C27DE6D1".to_string()),
            }),
            review_status: Some("Clean".to_string()),
            video_review_link: Some("http://video.url".to_string()),
            desktop_comments: Some(vec![]),
        }
    }

    #[test]
    fn accepts_complete_payload() {
        let review = full_payload().validated().unwrap();
        assert_eq!(review.exam_code, "C27DE6D1");
        assert_eq!(review.review_status, "Clean");
    }

    #[test]
    fn rejects_missing_top_level_fields() {
        let mut p = full_payload();
        p.review_status = None;
        assert!(p.validated().is_err());

        let mut p = full_payload();
        p.video_review_link = None;
        assert!(p.validated().is_err());

        let mut p = full_payload();
        p.desktop_comments = None;
        assert!(p.validated().is_err());

        let mut p = full_payload();
        p.exam_meta_data = None;
        assert!(p.validated().is_err());
    }

    #[test]
    fn rejects_empty_exam_code() {
        let mut p = full_payload();
        p.exam_meta_data = Some(ExamMetaData {
            exam_code: Some(String::new()),
        });
        assert!(p.validated().is_err());
    }
}
