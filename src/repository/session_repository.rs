use crate::error::{Error, Result};
use crate::models::event_session::{EventSession, SessionStatus};
use crate::models::proctor::{AccessScope, Proctor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewSession {
    pub testing_center: String,
    pub course_id: String,
    pub course_event_id: String,
    pub hash_key: String,
    pub start_date: DateTime<Utc>,
}

/// Final field values computed by the session service; the repository writes
/// them verbatim. `end_date` is only ever supplied on archival and is never
/// cleared.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub status: SessionStatus,
    pub notify: bool,
    pub comment: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ArchivedSessionQuery {
    pub testing_center: Option<String>,
    pub proctor: Option<String>,
    pub hash_key: Option<String>,
    pub course_id: Option<String>,
    pub course_event_id: Option<String>,
    pub start_from: Option<DateTime<Utc>>,
    pub start_to: Option<DateTime<Utc>>,
    pub end_from: Option<DateTime<Utc>>,
    pub end_to: Option<DateTime<Utc>>,
    pub page: i64,
    pub per_page: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Most recently started IN_PROGRESS session for the identity tuple, if
    /// any. Drives the idempotent-create rule.
    async fn latest_in_progress(
        &self,
        testing_center: &str,
        course_id: &str,
        course_event_id: &str,
    ) -> Result<Option<EventSession>>;

    async fn insert(&self, session: &NewSession, proctor: &Proctor) -> Result<EventSession>;

    async fn find_by_hash(&self, hash_key: &str) -> Result<EventSession>;

    async fn update(&self, id: Uuid, update: &SessionUpdate) -> Result<EventSession>;

    /// Running sessions visible to the caller, newest first. Backs the
    /// rejoin view of the proctor UI.
    async fn list_in_progress(
        &self,
        scope: &AccessScope,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<EventSession>, i64)>;

    async fn list_archived(
        &self,
        scope: &AccessScope,
        query: &ArchivedSessionQuery,
    ) -> Result<(Vec<EventSession>, i64)>;
}

#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SESSION_COLUMNS: &str = r#"
    id, testing_center, course_id, course_event_id, hash_key, status,
    notify, comment, proctor_id, proctor_name, start_date, end_date,
    created_at, updated_at
"#;

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn latest_in_progress(
        &self,
        testing_center: &str,
        course_id: &str,
        course_event_id: &str,
    ) -> Result<Option<EventSession>> {
        let sql = format!(
            r#"SELECT {SESSION_COLUMNS}
               FROM event_sessions
               WHERE status = 'in_progress'
                 AND testing_center = $1 AND course_id = $2 AND course_event_id = $3
               ORDER BY start_date DESC
               LIMIT 1"#
        );
        let session = sqlx::query_as::<_, EventSession>(&sql)
            .bind(testing_center)
            .bind(course_id)
            .bind(course_event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    async fn insert(&self, session: &NewSession, proctor: &Proctor) -> Result<EventSession> {
        let sql = format!(
            r#"INSERT INTO event_sessions (
                   testing_center, course_id, course_event_id, hash_key,
                   status, notify, proctor_id, proctor_name, start_date
               ) VALUES ($1, $2, $3, $4, 'in_progress', FALSE, $5, $6, $7)
               RETURNING {SESSION_COLUMNS}"#
        );
        let created = sqlx::query_as::<_, EventSession>(&sql)
            .bind(&session.testing_center)
            .bind(&session.course_id)
            .bind(&session.course_event_id)
            .bind(&session.hash_key)
            .bind(proctor.id)
            .bind(&proctor.name)
            .bind(session.start_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_by_hash(&self, hash_key: &str) -> Result<EventSession> {
        let sql = format!(
            r#"SELECT {SESSION_COLUMNS} FROM event_sessions WHERE hash_key = $1"#
        );
        let session = sqlx::query_as::<_, EventSession>(&sql)
            .bind(hash_key)
            .fetch_optional(&self.pool)
            .await?;
        session.ok_or_else(|| Error::NotFound(format!("Session {} not found", hash_key)))
    }

    async fn update(&self, id: Uuid, update: &SessionUpdate) -> Result<EventSession> {
        let sql = format!(
            r#"UPDATE event_sessions
               SET status = $1, notify = $2, comment = $3,
                   end_date = COALESCE($4, end_date), updated_at = NOW()
               WHERE id = $5
               RETURNING {SESSION_COLUMNS}"#
        );
        let updated = sqlx::query_as::<_, EventSession>(&sql)
            .bind(update.status.as_str())
            .bind(update.notify)
            .bind(&update.comment)
            .bind(update.end_date)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn list_in_progress(
        &self,
        scope: &AccessScope,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<EventSession>, i64)> {
        let offset = (page - 1) * per_page;
        let filter = r#"
            FROM event_sessions
            WHERE status = 'in_progress'
              AND ($1::text[] IS NULL OR course_id = ANY($1))
        "#;

        let sql = format!(
            "SELECT {SESSION_COLUMNS} {filter} ORDER BY start_date DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, EventSession>(&sql)
            .bind(scope.course_filter())
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) {filter}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(scope.course_filter())
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn list_archived(
        &self,
        scope: &AccessScope,
        query: &ArchivedSessionQuery,
    ) -> Result<(Vec<EventSession>, i64)> {
        let offset = (query.page - 1) * query.per_page;
        let filter = r#"
            FROM event_sessions
            WHERE status = 'archived'
              AND ($1::text[] IS NULL OR course_id = ANY($1))
              AND ($2::text IS NULL OR testing_center = $2)
              AND ($3::text IS NULL OR proctor_name = $3)
              AND ($4::text IS NULL OR hash_key = $4)
              AND ($5::text IS NULL OR course_id = $5)
              AND ($6::text IS NULL OR course_event_id = $6)
              AND ($7::timestamptz IS NULL OR start_date >= $7)
              AND ($8::timestamptz IS NULL OR start_date < $8)
              AND ($9::timestamptz IS NULL OR end_date >= $9)
              AND ($10::timestamptz IS NULL OR end_date < $10)
        "#;

        let sql = format!(
            "SELECT {SESSION_COLUMNS} {filter} ORDER BY created_at DESC LIMIT $11 OFFSET $12"
        );
        let rows = sqlx::query_as::<_, EventSession>(&sql)
            .bind(scope.course_filter())
            .bind(&query.testing_center)
            .bind(&query.proctor)
            .bind(&query.hash_key)
            .bind(&query.course_id)
            .bind(&query.course_event_id)
            .bind(query.start_from)
            .bind(query.start_to)
            .bind(query.end_from)
            .bind(query.end_to)
            .bind(query.per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) {filter}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(scope.course_filter())
            .bind(&query.testing_center)
            .bind(&query.proctor)
            .bind(&query.hash_key)
            .bind(&query.course_id)
            .bind(&query.course_event_id)
            .bind(query.start_from)
            .bind(query.start_to)
            .bind(query.end_from)
            .bind(query.end_to)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }
}
