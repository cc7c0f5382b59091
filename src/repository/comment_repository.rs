use crate::error::Result;
use crate::models::comment::{Comment, NewComment};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct CommentQuery {
    pub exam_code: Option<String>,
    pub event_start: Option<i64>,
    pub event_status: Option<String>,
    pub page: i64,
    pub per_page: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Idempotency probe: does a comment with this text and category already
    /// exist on the exam?
    async fn exists(&self, exam_id: Uuid, comment: &str, event_status: &str) -> Result<bool>;

    async fn insert(&self, comment: &NewComment) -> Result<Comment>;

    async fn list(&self, query: &CommentQuery) -> Result<(Vec<Comment>, i64)>;
}

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn exists(&self, exam_id: Uuid, comment: &str, event_status: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM comments
               WHERE exam_id = $1 AND comment = $2 AND event_status = $3"#,
        )
        .bind(exam_id)
        .bind(comment)
        .bind(event_status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn insert(&self, comment: &NewComment) -> Result<Comment> {
        let created = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (exam_id, comment, event_status, event_start, event_finish, duration)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, exam_id, comment, event_status, event_start, event_finish, duration, created_at
            "#,
        )
        .bind(comment.exam_id)
        .bind(&comment.comment)
        .bind(&comment.event_status)
        .bind(comment.event_start)
        .bind(comment.event_finish)
        .bind(comment.duration)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list(&self, query: &CommentQuery) -> Result<(Vec<Comment>, i64)> {
        let offset = (query.page - 1) * query.per_page;
        let filter = r#"
            FROM comments c
            JOIN exams e ON e.id = c.exam_id
            WHERE ($1::text IS NULL OR e.exam_code = $1)
              AND ($2::bigint IS NULL OR c.event_start = $2)
              AND ($3::text IS NULL OR c.event_status = $3)
        "#;

        let sql = format!(
            r#"SELECT c.id, c.exam_id, c.comment, c.event_status, c.event_start,
                      c.event_finish, c.duration, c.created_at
               {filter}
               ORDER BY c.created_at DESC LIMIT $4 OFFSET $5"#
        );
        let rows = sqlx::query_as::<_, Comment>(&sql)
            .bind(&query.exam_code)
            .bind(query.event_start)
            .bind(&query.event_status)
            .bind(query.per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) {filter}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&query.exam_code)
            .bind(query.event_start)
            .bind(&query.event_status)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }
}
