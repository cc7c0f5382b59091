use crate::dto::session_dto::{
    ArchivedSessionFilter, CreateSessionRequest, SessionListQuery, UpdateSessionRequest,
};
use crate::error::{Error, Result};
use crate::models::event_session::{make_hash_key, EventSession, SessionStatus};
use crate::models::journaling::{JournalType, NewJournalEntry};
use crate::models::proctor::{AccessScope, Proctor};
use crate::repository::session_repository::{ArchivedSessionQuery, NewSession, SessionUpdate};
use crate::repository::{JournalRepository, SessionRepository};
use crate::utils::time::day_window;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

const SESSIONS_PER_PAGE: i64 = 25;

#[derive(Debug, Clone)]
pub enum CreateSessionOutcome {
    /// A matching IN_PROGRESS session already exists; the proctor joins it.
    Existing(EventSession),
    Created(EventSession),
}

#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    journal: Arc<dyn JournalRepository>,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionRepository>, journal: Arc<dyn JournalRepository>) -> Self {
        Self { sessions, journal }
    }

    /// Idempotent create: at most one canonical IN_PROGRESS session per
    /// (testing_center, course_id, course_event_id).
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
        proctor: &Proctor,
    ) -> Result<CreateSessionOutcome> {
        if let Some(existing) = self
            .sessions
            .latest_in_progress(
                &request.testing_center,
                &request.course_id,
                &request.course_event_id,
            )
            .await?
        {
            info!(
                "Proctor {} joined existing session {}",
                proctor.name, existing.hash_key
            );
            return Ok(CreateSessionOutcome::Existing(existing));
        }

        let start_date = Utc::now();
        let session = NewSession {
            testing_center: request.testing_center.clone(),
            course_id: request.course_id.clone(),
            course_event_id: request.course_event_id.clone(),
            hash_key: make_hash_key(
                &request.testing_center,
                &request.course_id,
                &request.course_event_id,
                start_date,
            ),
            start_date,
        };
        let created = self.sessions.insert(&session, proctor).await?;
        self.journal
            .append(&NewJournalEntry {
                journal_type: JournalType::EventSessionStart,
                event_id: Some(created.id),
                exam_id: None,
                proctor_id: Some(proctor.id),
                proctor_name: Some(proctor.name.clone()),
                note: None,
            })
            .await?;
        Ok(CreateSessionOutcome::Created(created))
    }

    /// Updates status/notify/comment. Status changes are journaled; archival
    /// stamps `end_date` and is one-way.
    pub async fn update_session(
        &self,
        hash_key: &str,
        request: &UpdateSessionRequest,
        proctor: &Proctor,
    ) -> Result<EventSession> {
        let session = self.sessions.find_by_hash(hash_key).await?;

        let new_status = match request.status.as_deref() {
            Some(raw) => raw
                .parse::<SessionStatus>()
                .map_err(|e| Error::BadRequest(e.to_string()))?,
            None => session.status,
        };
        if session.status == SessionStatus::Archived && new_status == SessionStatus::InProgress {
            return Err(Error::BadRequest(
                "Archived sessions cannot be reopened".to_string(),
            ));
        }
        let archiving =
            session.status == SessionStatus::InProgress && new_status == SessionStatus::Archived;

        if new_status != session.status {
            self.journal
                .append(&NewJournalEntry {
                    journal_type: JournalType::EventSessionStatusChange,
                    event_id: Some(session.id),
                    exam_id: None,
                    proctor_id: Some(proctor.id),
                    proctor_name: Some(proctor.name.clone()),
                    note: Some(format!(
                        "{} -> {}",
                        session.status.label(),
                        new_status.label()
                    )),
                })
                .await?;
        }

        let update = SessionUpdate {
            status: new_status,
            notify: request.notify.unwrap_or(session.notify),
            comment: request.comment.clone().or_else(|| session.comment.clone()),
            end_date: archiving.then(Utc::now),
        };
        self.sessions.update(session.id, &update).await
    }

    /// Running sessions the caller may rejoin.
    pub async fn list_in_progress(
        &self,
        scope: &AccessScope,
        query: &SessionListQuery,
    ) -> Result<(Vec<EventSession>, i64, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.limit.unwrap_or(SESSIONS_PER_PAGE).clamp(1, 100);
        let (rows, total) = self.sessions.list_in_progress(scope, page, per_page).await?;
        Ok((rows, total, page))
    }

    /// Single session by hash key. A session outside the caller's scope is
    /// indistinguishable from a missing one.
    pub async fn get_session(&self, hash_key: &str, scope: &AccessScope) -> Result<EventSession> {
        let session = self.sessions.find_by_hash(hash_key).await?;
        if !scope.allows_course(&session.course_id) {
            return Err(Error::NotFound(format!("Session {} not found", hash_key)));
        }
        Ok(session)
    }

    pub async fn list_archived(
        &self,
        scope: &AccessScope,
        filter: &ArchivedSessionFilter,
    ) -> Result<(Vec<EventSession>, i64, i64)> {
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.limit.unwrap_or(SESSIONS_PER_PAGE).clamp(1, 100);

        let start = filter.start_date.as_deref().and_then(day_window);
        let end = filter.end_date.as_deref().and_then(day_window);
        let query = ArchivedSessionQuery {
            testing_center: filter.testing_center.clone(),
            proctor: filter.proctor.clone(),
            hash_key: filter.hash_key.clone(),
            course_id: filter.course_id.clone(),
            course_event_id: filter.course_event_id.clone(),
            start_from: start.map(|(from, _)| from),
            start_to: start.map(|(_, to)| to),
            end_from: end.map(|(from, _)| from),
            end_to: end.map(|(_, to)| to),
            page,
            per_page,
        };
        let (rows, total) = self.sessions.list_archived(scope, &query).await?;
        Ok((rows, total, page))
    }
}
