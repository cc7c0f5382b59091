use crate::error::{Error, Result};
use crate::models::exam::Exam;
use crate::models::proctor::{AccessScope, Proctor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Listing filters for exams whose owning session is archived. Date bounds
/// are half-open day windows resolved by the caller.
#[derive(Debug, Clone, Default)]
pub struct ArchivedExamQuery {
    pub event_hash: Option<String>,
    pub course_id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub start_from: Option<DateTime<Utc>>,
    pub start_to: Option<DateTime<Utc>>,
    pub end_from: Option<DateTime<Utc>>,
    pub end_to: Option<DateTime<Utc>>,
    /// Non-wildcard proctors only see exams from sessions they proctored.
    pub restrict_proctor_id: Option<Uuid>,
    pub page: i64,
    pub per_page: i64,
}

const EXAM_COLUMNS: &str = r#"
    e.id, e.exam_code, e.event_id, s.hash_key AS event_hash, e.course_id,
    e.username, e.email, e.exam_status, e.attempt_status,
    e.proctor_id, e.proctor_name, e.exam_start_date, e.exam_end_date,
    e.created_at, e.updated_at
"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamRepository: Send + Sync {
    /// Resolve an exam by code within the caller's visibility scope. An exam
    /// outside the scope is indistinguishable from a missing one.
    async fn find_by_code(&self, scope: &AccessScope, exam_code: &str) -> Result<Exam>;

    async fn find_by_codes(&self, exam_codes: &[String]) -> Result<Vec<Exam>>;

    /// Apply the NEW -> STARTED transition: status, "OK" attempt status and
    /// the assigned proctor, in one write.
    async fn mark_started(&self, exam_id: Uuid, proctor: &Proctor) -> Result<()>;

    async fn set_attempt_status(&self, exam_id: Uuid, attempt_status: &str) -> Result<()>;

    async fn list_archived(
        &self,
        scope: &AccessScope,
        query: &ArchivedExamQuery,
    ) -> Result<(Vec<Exam>, i64)>;
}

#[derive(Clone)]
pub struct PgExamRepository {
    pool: PgPool,
}

impl PgExamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExamRepository for PgExamRepository {
    async fn find_by_code(&self, scope: &AccessScope, exam_code: &str) -> Result<Exam> {
        let sql = format!(
            r#"SELECT {EXAM_COLUMNS}
               FROM exams e
               JOIN event_sessions s ON s.id = e.event_id
               WHERE e.exam_code = $1
                 AND ($2::text[] IS NULL OR e.course_id = ANY($2))"#
        );
        let exam = sqlx::query_as::<_, Exam>(&sql)
            .bind(exam_code)
            .bind(scope.course_filter())
            .fetch_optional(&self.pool)
            .await?;

        exam.ok_or_else(|| Error::NotFound(format!("Exam {} not found", exam_code)))
    }

    async fn find_by_codes(&self, exam_codes: &[String]) -> Result<Vec<Exam>> {
        let sql = format!(
            r#"SELECT {EXAM_COLUMNS}
               FROM exams e
               JOIN event_sessions s ON s.id = e.event_id
               WHERE e.exam_code = ANY($1)"#
        );
        let exams = sqlx::query_as::<_, Exam>(&sql)
            .bind(exam_codes)
            .fetch_all(&self.pool)
            .await?;
        Ok(exams)
    }

    async fn mark_started(&self, exam_id: Uuid, proctor: &Proctor) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE exams
            SET exam_status = 'started', attempt_status = 'OK',
                proctor_id = $1, proctor_name = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(proctor.id)
        .bind(&proctor.name)
        .bind(exam_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_attempt_status(&self, exam_id: Uuid, attempt_status: &str) -> Result<()> {
        sqlx::query(
            r#"UPDATE exams SET attempt_status = $1, updated_at = NOW() WHERE id = $2"#,
        )
        .bind(attempt_status)
        .bind(exam_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_archived(
        &self,
        scope: &AccessScope,
        query: &ArchivedExamQuery,
    ) -> Result<(Vec<Exam>, i64)> {
        let offset = (query.page - 1) * query.per_page;
        let filter = r#"
            FROM exams e
            JOIN event_sessions s ON s.id = e.event_id
            WHERE s.status = 'archived'
              AND ($1::text[] IS NULL OR e.course_id = ANY($1))
              AND ($2::text IS NULL OR s.hash_key = $2)
              AND ($3::text IS NULL OR e.course_id = $3)
              AND ($4::text IS NULL OR e.username = $4)
              AND ($5::text IS NULL OR e.email = $5)
              AND ($6::timestamptz IS NULL OR e.exam_start_date >= $6)
              AND ($7::timestamptz IS NULL OR e.exam_start_date < $7)
              AND ($8::timestamptz IS NULL OR e.exam_end_date >= $8)
              AND ($9::timestamptz IS NULL OR e.exam_end_date < $9)
              AND ($10::uuid IS NULL OR s.proctor_id = $10)
        "#;

        let sql = format!(
            "SELECT {EXAM_COLUMNS} {filter} ORDER BY e.created_at DESC LIMIT $11 OFFSET $12"
        );
        let rows = sqlx::query_as::<_, Exam>(&sql)
            .bind(scope.course_filter())
            .bind(&query.event_hash)
            .bind(&query.course_id)
            .bind(&query.username)
            .bind(&query.email)
            .bind(query.start_from)
            .bind(query.start_to)
            .bind(query.end_from)
            .bind(query.end_to)
            .bind(query.restrict_proctor_id)
            .bind(query.per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) {filter}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(scope.course_filter())
            .bind(&query.event_hash)
            .bind(&query.course_id)
            .bind(&query.username)
            .bind(&query.email)
            .bind(query.start_from)
            .bind(query.start_to)
            .bind(query.end_from)
            .bind(query.end_to)
            .bind(query.restrict_proctor_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }
}
