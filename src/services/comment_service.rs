use crate::dto::comment_dto::{CommentFilter, CreateCommentRequest};
use crate::error::Result;
use crate::models::comment::{Comment, NewComment};
use crate::models::journaling::{JournalType, NewJournalEntry};
use crate::models::proctor::{AccessScope, Proctor};
use crate::repository::comment_repository::CommentQuery;
use crate::repository::{CommentRepository, ExamRepository, JournalRepository};
use std::sync::Arc;

const COMMENTS_PER_PAGE: i64 = 25;

#[derive(Clone)]
pub struct CommentService {
    exams: Arc<dyn ExamRepository>,
    comments: Arc<dyn CommentRepository>,
    journal: Arc<dyn JournalRepository>,
}

impl CommentService {
    pub fn new(
        exams: Arc<dyn ExamRepository>,
        comments: Arc<dyn CommentRepository>,
        journal: Arc<dyn JournalRepository>,
    ) -> Self {
        Self {
            exams,
            comments,
            journal,
        }
    }

    pub async fn list(&self, filter: &CommentFilter) -> Result<(Vec<Comment>, i64, i64)> {
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.limit.unwrap_or(COMMENTS_PER_PAGE).clamp(1, 100);
        let query = CommentQuery {
            exam_code: filter.exam_code.clone(),
            event_start: filter.event_start,
            event_status: filter.event_status.clone(),
            page,
            per_page,
        };
        let (rows, total) = self.comments.list(&query).await?;
        Ok((rows, total, page))
    }

    pub async fn add_comment(
        &self,
        request: &CreateCommentRequest,
        proctor: &Proctor,
        scope: &AccessScope,
    ) -> Result<Comment> {
        let exam = self.exams.find_by_code(scope, &request.exam_code).await?;
        let body = &request.comment;

        let created = self
            .comments
            .insert(&NewComment {
                exam_id: exam.id,
                comment: body.comment.clone(),
                event_status: body.event_status.clone(),
                event_start: body.event_start,
                event_finish: body.event_finish,
                duration: body.duration,
            })
            .await?;

        self.journal
            .append(&NewJournalEntry {
                journal_type: JournalType::ExamComment,
                event_id: Some(exam.event_id),
                exam_id: Some(exam.id),
                proctor_id: Some(proctor.id),
                proctor_name: Some(proctor.name.clone()),
                note: Some(format!(
                    "Duration: {:?}\nEvent start: {:?}\nEvent finish: {:?}\nEvent status: {}\nComment:\n{}",
                    created.duration,
                    created.event_start,
                    created.event_finish,
                    created.event_status,
                    created.comment,
                )),
            })
            .await?;

        Ok(created)
    }
}
