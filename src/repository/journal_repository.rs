use crate::error::Result;
use crate::models::journaling::NewJournalEntry;
use async_trait::async_trait;
use sqlx::PgPool;

/// Append-only audit log. There is deliberately no update or delete surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JournalRepository: Send + Sync {
    async fn append(&self, entry: &NewJournalEntry) -> Result<()>;
}

#[derive(Clone)]
pub struct PgJournalRepository {
    pool: PgPool,
}

impl PgJournalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JournalRepository for PgJournalRepository {
    async fn append(&self, entry: &NewJournalEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO journaling (journal_type, event_id, exam_id, proctor_id, proctor_name, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.journal_type.as_str())
        .bind(entry.event_id)
        .bind(entry.exam_id)
        .bind(entry.proctor_id)
        .bind(&entry.proctor_name)
        .bind(&entry.note)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
