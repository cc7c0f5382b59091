use crate::dto::exam_dto::{
    ArchivedExamFilter, StartExamResponse, StopExamItem, StopExamResponse,
};
use crate::dto::review_dto::ReviewPayload;
use crate::error::{Error, Result};
use crate::models::comment::NewComment;
use crate::models::exam::ExamStatus;
use crate::models::journaling::{JournalType, NewJournalEntry};
use crate::models::proctor::{AccessScope, Proctor};
use crate::models::exam::Exam;
use crate::repository::exam_repository::ArchivedExamQuery;
use crate::repository::{CommentRepository, ExamRepository, JournalRepository};
use crate::utils::time::day_window;
use crate::services::notifier::{self, Notifier};
use crate::services::platform_client::PlatformClient;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::{info, warn};

/// The status-transition and notification-fanout core. Every mutating
/// operation runs synchronously end-to-end: upstream call, state write,
/// journal append, channel publish. Nothing here retries; upstream failures
/// surface verbatim to the caller.
#[derive(Clone)]
pub struct TransitionEngine {
    exams: Arc<dyn ExamRepository>,
    comments: Arc<dyn CommentRepository>,
    journal: Arc<dyn JournalRepository>,
    platform: Arc<dyn PlatformClient>,
    notifier: Arc<dyn Notifier>,
}

impl TransitionEngine {
    pub fn new(
        exams: Arc<dyn ExamRepository>,
        comments: Arc<dyn CommentRepository>,
        journal: Arc<dyn JournalRepository>,
        platform: Arc<dyn PlatformClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            exams,
            comments,
            journal,
            platform,
            notifier,
        }
    }

    /// The publish primitive is assumed reliable; a gateway hiccup must not
    /// fail an already-committed transition.
    async fn publish(&self, channel: &str, payload: &JsonValue) {
        if let Err(e) = self.notifier.publish(channel, payload).await {
            warn!("Failed to publish on channel {}: {}", channel, e);
        }
    }

    pub async fn start_exam(
        &self,
        exam_code: &str,
        proctor: &Proctor,
        scope: &AccessScope,
    ) -> Result<StartExamResponse> {
        let exam = self.exams.find_by_code(scope, exam_code).await?;
        if !exam.exam_status.can_transition_to(ExamStatus::Started) {
            return Err(Error::BadRequest(format!(
                "Exam {} cannot start from status {}",
                exam_code, exam.exam_status
            )));
        }

        let status = self.platform.start_exam(exam_code).await?;
        if status != 200 {
            return Err(Error::Upstream {
                status,
                message: "Platform response error. See logs".to_string(),
            });
        }

        self.exams.mark_started(exam.id, proctor).await?;
        self.journal
            .append(&NewJournalEntry {
                journal_type: JournalType::ExamStatusChange,
                event_id: Some(exam.event_id),
                exam_id: Some(exam.id),
                proctor_id: Some(proctor.id),
                proctor_name: Some(proctor.name.clone()),
                note: Some(format!(
                    "{} -> {}",
                    exam.exam_status.label(),
                    ExamStatus::Started.label()
                )),
            })
            .await?;

        let hash = exam.generated_key();
        let payload = notifier::start_payload(&hash, &proctor.name);
        self.publish(&exam.event_hash, &payload).await;

        info!("Exam {} started by {}", exam_code, proctor.name);
        Ok(StartExamResponse {
            hash,
            proctor: proctor.name.clone(),
            status: "OK".to_string(),
        })
    }

    /// Stops a single attempt upstream. The local `exam_status` is left to
    /// the poller; only the notification carries "submitted".
    pub async fn stop_exam(
        &self,
        exam_code: &str,
        action: Option<&str>,
        user_id: Option<&str>,
        scope: &AccessScope,
    ) -> Result<StopExamResponse> {
        let (Some(action), Some(user_id)) = (action, user_id) else {
            return Err(Error::BadRequest(
                "action and user_id are required".to_string(),
            ));
        };

        let exam = self.exams.find_by_code(scope, exam_code).await?;
        let status = self.platform.stop_exam(exam_code, action, user_id).await?;
        if !(200..300).contains(&status) {
            return Err(Error::Upstream {
                status,
                message: format!("Platform refused to stop exam {}", exam_code),
            });
        }

        let hash = exam.generated_key();
        let payload = notifier::stop_payload(&hash);
        self.publish(&exam.event_hash, &payload).await;

        Ok(StopExamResponse {
            hash,
            status: "submitted".to_string(),
        })
    }

    /// Batch stop. Malformed items fail the whole batch before any upstream
    /// call; upstream failures do not roll back items that already stopped.
    pub async fn stop_exams(&self, attempts: &[StopExamItem], scope: &AccessScope) -> Result<()> {
        if attempts.is_empty() {
            return Err(Error::BadRequest("attempts must not be empty".to_string()));
        }
        for attempt in attempts {
            if attempt.action.is_none() || attempt.user_id.is_none() {
                return Err(Error::BadRequest(format!(
                    "attempt {} is missing action or user_id",
                    attempt.attempt_code
                )));
            }
        }

        let total = attempts.len();
        let mut failed = 0usize;
        for attempt in attempts {
            let exam = self.exams.find_by_code(scope, &attempt.attempt_code).await?;
            let action = attempt.action.as_deref().unwrap_or_default();
            let user_id = attempt.user_id.as_deref().unwrap_or_default();
            let status = self
                .platform
                .stop_exam(&attempt.attempt_code, action, user_id)
                .await?;
            if (200..300).contains(&status) {
                let payload = notifier::stop_payload(&exam.generated_key());
                self.publish(&exam.event_hash, &payload).await;
            } else {
                warn!(
                    "Platform returned {} stopping exam {}",
                    status, attempt.attempt_code
                );
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(Error::PartialBatch { failed, total });
        }
        Ok(())
    }

    /// Out-of-band status sync: mirrors the upstream attempt status and fans
    /// it out, with no journaling and no transition validation.
    pub async fn poll_statuses(&self, exam_codes: &[String], scope: &AccessScope) -> Result<()> {
        let updates = self.platform.poll_statuses(exam_codes).await?;
        for update in updates {
            let exam = self.exams.find_by_code(scope, &update.attempt_code).await?;
            self.exams.set_attempt_status(exam.id, &update.status).await?;
            let payload = notifier::status_payload(&exam.generated_key(), &update.status);
            self.publish(&exam.event_hash, &payload).await;
        }
        Ok(())
    }

    /// One upstream bulk-start call, one notification per started exam, and a
    /// single aggregated journal record for the whole batch.
    pub async fn bulk_start_exams(&self, exam_codes: &[String], proctor: &Proctor) -> Result<()> {
        let exams = self.exams.find_by_codes(exam_codes).await?;
        let known_codes: Vec<String> = exams.iter().map(|e| e.exam_code.clone()).collect();
        let started = self.platform.bulk_start(&known_codes).await?;

        for exam in exams.iter().filter(|e| started.contains(&e.exam_code)) {
            self.exams.mark_started(exam.id, proctor).await?;
            let payload = notifier::start_payload(&exam.generated_key(), &proctor.name);
            self.publish(&exam.event_hash, &payload).await;
        }

        self.journal
            .append(&NewJournalEntry {
                journal_type: JournalType::BulkExamStatusChange,
                event_id: None,
                exam_id: None,
                proctor_id: Some(proctor.id),
                proctor_name: Some(proctor.name.clone()),
                note: Some(format!(
                    "{}. {} -> {}",
                    exam_codes.join(", "),
                    ExamStatus::New.label(),
                    ExamStatus::Started.label()
                )),
            })
            .await?;
        Ok(())
    }

    /// Accepts a review, upserts its desktop comments idempotently, forwards
    /// the augmented payload upstream and marks the attempt finished on
    /// upstream acceptance.
    pub async fn review_exam(&self, payload: ReviewPayload, scope: &AccessScope) -> Result<()> {
        let review = payload.validated()?;
        let exam = self.exams.find_by_code(scope, &review.exam_code).await?;

        for desktop_comment in &review.desktop_comments {
            let text = desktop_comment.comments.clone().unwrap_or_default();
            let event_status = desktop_comment.event_status.clone().unwrap_or_default();
            if self.comments.exists(exam.id, &text, &event_status).await? {
                continue;
            }
            self.comments
                .insert(&NewComment {
                    exam_id: exam.id,
                    comment: text,
                    event_status,
                    event_start: desktop_comment.event_start,
                    event_finish: desktop_comment.event_finish,
                    duration: desktop_comment.duration,
                })
                .await?;
        }

        let outbound = json!({
            "examMetaData": {
                "examCode": review.exam_code,
                "ssiRecordLocator": exam.generated_key(),
                "reviewerNotes": "",
            },
            "reviewStatus": review.review_status,
            "videoReviewLink": review.video_review_link,
            "desktopComments": review.desktop_comments,
        });

        let status = self.platform.send_review(&outbound).await?;
        if status != 200 && status != 201 {
            return Err(Error::Upstream {
                status,
                message: format!("Platform rejected review for exam {}", review.exam_code),
            });
        }

        self.exams.set_attempt_status(exam.id, "finished").await?;
        Ok(())
    }

    /// Exams whose owning session is archived. Proctors without a wildcard
    /// grant only see exams from sessions they proctored themselves.
    pub async fn list_archived_exams(
        &self,
        scope: &AccessScope,
        proctor: &Proctor,
        filter: &ArchivedExamFilter,
    ) -> Result<(Vec<Exam>, i64, i64)> {
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.limit.unwrap_or(50).clamp(1, 200);
        let start = filter.exam_start_date.as_deref().and_then(day_window);
        let end = filter.exam_end_date.as_deref().and_then(day_window);
        let restrict_proctor_id = match scope {
            AccessScope::All => None,
            AccessScope::Courses(_) => Some(proctor.id),
        };

        let query = ArchivedExamQuery {
            event_hash: filter.event_hash.clone(),
            course_id: filter.course_id.clone(),
            username: filter.username.clone(),
            email: filter.email.clone(),
            start_from: start.map(|(from, _)| from),
            start_to: start.map(|(_, to)| to),
            end_from: end.map(|(from, _)| from),
            end_to: end.map(|(_, to)| to),
            restrict_proctor_id,
            page,
            per_page,
        };
        let (rows, total) = self.exams.list_archived(scope, &query).await?;
        Ok((rows, total, page))
    }

    /// Upstream proctored-exam catalogue, filtered to entries that actually
    /// carry proctored exams and annotated with the caller's course access.
    pub async fn proctored_exams(&self, scope: &AccessScope) -> Result<JsonValue> {
        let content = self.platform.proctored_exams().await?;
        let empty = Vec::new();
        let results = content
            .get("results")
            .and_then(JsonValue::as_array)
            .unwrap_or(&empty);

        let mut accessible = Vec::new();
        for result in results {
            let has_exams = result
                .get("proctored_exams")
                .and_then(JsonValue::as_array)
                .map(|exams| !exams.is_empty())
                .unwrap_or(false);
            if !has_exams {
                continue;
            }
            let course_id = result.get("id").and_then(JsonValue::as_str).unwrap_or("");
            let mut annotated = result.clone();
            annotated["has_access"] = json!(scope.allows_course(course_id));
            accessible.push(annotated);
        }
        Ok(json!({ "results": accessible }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::review_dto::{DesktopComment, ExamMetaData};
    use crate::models::exam::Exam;
    use crate::repository::comment_repository::MockCommentRepository;
    use crate::repository::exam_repository::MockExamRepository;
    use crate::repository::journal_repository::MockJournalRepository;
    use crate::services::notifier::MockNotifier;
    use crate::services::platform_client::{AttemptStatusUpdate, MockPlatformClient};
    use mockall::predicate::{always, eq};
    use uuid::Uuid;

    fn proctor() -> Proctor {
        Proctor {
            id: Uuid::new_v4(),
            name: "proctor1".to_string(),
        }
    }

    fn exam(code: &str, status: ExamStatus) -> Exam {
        Exam {
            id: Uuid::new_v4(),
            exam_code: code.to_string(),
            event_id: Uuid::new_v4(),
            event_hash: format!("channel-{}", code),
            course_id: "course-a".to_string(),
            username: Some("student".to_string()),
            email: None,
            exam_status: status,
            attempt_status: None,
            proctor_id: None,
            proctor_name: None,
            exam_start_date: None,
            exam_end_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    struct Mocks {
        exams: MockExamRepository,
        comments: MockCommentRepository,
        journal: MockJournalRepository,
        platform: MockPlatformClient,
        notifier: MockNotifier,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                exams: MockExamRepository::new(),
                comments: MockCommentRepository::new(),
                journal: MockJournalRepository::new(),
                platform: MockPlatformClient::new(),
                notifier: MockNotifier::new(),
            }
        }

        fn engine(self) -> TransitionEngine {
            TransitionEngine::new(
                Arc::new(self.exams),
                Arc::new(self.comments),
                Arc::new(self.journal),
                Arc::new(self.platform),
                Arc::new(self.notifier),
            )
        }
    }

    #[tokio::test]
    async fn start_exam_journals_and_notifies_once_on_upstream_success() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::New);
        let channel = subject.event_hash.clone();
        let hash = subject.generated_key();

        let found = subject.clone();
        mocks
            .exams
            .expect_find_by_code()
            .with(always(), eq("A1"))
            .times(1)
            .returning(move |_, _| Ok(found.clone()));
        mocks
            .platform
            .expect_start_exam()
            .with(eq("A1"))
            .times(1)
            .returning(|_| Ok(200));
        mocks
            .exams
            .expect_mark_started()
            .with(eq(subject.id), always())
            .times(1)
            .returning(|_, _| Ok(()));
        mocks
            .journal
            .expect_append()
            .withf(|entry| {
                entry.journal_type == JournalType::ExamStatusChange
                    && entry.note.as_deref() == Some("NEW -> STARTED")
            })
            .times(1)
            .returning(|_| Ok(()));
        let expected_hash = hash.clone();
        mocks
            .notifier
            .expect_publish()
            .withf(move |ch, payload| {
                ch == channel
                    && payload["hash"] == expected_hash.as_str()
                    && payload["proctor"] == "proctor1"
                    && payload["status"] == "OK"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let response = mocks
            .engine()
            .start_exam("A1", &proctor(), &AccessScope::All)
            .await
            .unwrap();
        assert_eq!(response.hash, hash);
        assert_eq!(response.status, "OK");
    }

    #[tokio::test]
    async fn start_exam_upstream_failure_mutates_nothing() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::New);
        mocks
            .exams
            .expect_find_by_code()
            .returning(move |_, _| Ok(subject.clone()));
        mocks
            .platform
            .expect_start_exam()
            .times(1)
            .returning(|_| Ok(403));
        mocks.exams.expect_mark_started().times(0);
        mocks.journal.expect_append().times(0);
        mocks.notifier.expect_publish().times(0);

        let err = mocks
            .engine()
            .start_exam("A1", &proctor(), &AccessScope::All)
            .await
            .unwrap_err();
        match err {
            Error::Upstream { status, .. } => assert_eq!(status, 403),
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn start_exam_rejects_invalid_transition_before_upstream_call() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::Finished);
        mocks
            .exams
            .expect_find_by_code()
            .returning(move |_, _| Ok(subject.clone()));
        mocks.platform.expect_start_exam().times(0);
        mocks.journal.expect_append().times(0);

        let err = mocks
            .engine()
            .start_exam("A1", &proctor(), &AccessScope::All)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn start_exam_out_of_scope_is_not_found() {
        let mut mocks = Mocks::new();
        mocks
            .exams
            .expect_find_by_code()
            .returning(|_, code| Err(Error::NotFound(format!("Exam {} not found", code))));
        mocks.platform.expect_start_exam().times(0);

        let scope = AccessScope::Courses(vec!["other-course".to_string()]);
        let err = mocks
            .engine()
            .start_exam("A1", &proctor(), &scope)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn stop_exam_requires_action_and_user_id() {
        let mut mocks = Mocks::new();
        mocks.exams.expect_find_by_code().times(0);
        mocks.platform.expect_stop_exam().times(0);
        mocks.notifier.expect_publish().times(0);

        let engine = mocks.engine();
        let err = engine
            .stop_exam("A1", Some("submit"), None, &AccessScope::All)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let err = engine
            .stop_exam("A1", None, Some("42"), &AccessScope::All)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn stop_exam_notifies_submitted_without_touching_local_status() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::Started);
        let channel = subject.event_hash.clone();
        mocks
            .exams
            .expect_find_by_code()
            .returning(move |_, _| Ok(subject.clone()));
        mocks
            .platform
            .expect_stop_exam()
            .with(eq("A1"), eq("submit"), eq("42"))
            .times(1)
            .returning(|_, _, _| Ok(200));
        mocks.exams.expect_mark_started().times(0);
        mocks.exams.expect_set_attempt_status().times(0);
        mocks.journal.expect_append().times(0);
        mocks
            .notifier
            .expect_publish()
            .withf(move |ch, payload| ch == channel && payload["status"] == "submitted")
            .times(1)
            .returning(|_, _| Ok(()));

        let response = mocks
            .engine()
            .stop_exam("A1", Some("submit"), Some("42"), &AccessScope::All)
            .await
            .unwrap();
        assert_eq!(response.status, "submitted");
    }

    #[tokio::test]
    async fn stop_exams_commits_successes_and_reports_partial_failure() {
        let mut mocks = Mocks::new();
        let ok_exam = exam("A1", ExamStatus::Started);
        let bad_exam = exam("A2", ExamStatus::Started);
        let ok_channel = ok_exam.event_hash.clone();

        mocks.exams.expect_find_by_code().returning(move |_, code| {
            if code == "A1" {
                Ok(ok_exam.clone())
            } else {
                Ok(bad_exam.clone())
            }
        });
        mocks
            .platform
            .expect_stop_exam()
            .times(2)
            .returning(|code, _, _| if code == "A1" { Ok(200) } else { Ok(502) });
        mocks
            .notifier
            .expect_publish()
            .withf(move |ch, _| ch == ok_channel)
            .times(1)
            .returning(|_, _| Ok(()));

        let attempts = vec![
            StopExamItem {
                attempt_code: "A1".to_string(),
                action: Some("submit".to_string()),
                user_id: Some("42".to_string()),
            },
            StopExamItem {
                attempt_code: "A2".to_string(),
                action: Some("submit".to_string()),
                user_id: Some("43".to_string()),
            },
        ];
        let err = mocks
            .engine()
            .stop_exams(&attempts, &AccessScope::All)
            .await
            .unwrap_err();
        match err {
            Error::PartialBatch { failed, total } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 2);
            }
            other => panic!("expected partial batch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn stop_exams_malformed_item_short_circuits_before_any_upstream_call() {
        let mut mocks = Mocks::new();
        mocks.exams.expect_find_by_code().times(0);
        mocks.platform.expect_stop_exam().times(0);
        mocks.notifier.expect_publish().times(0);

        let attempts = vec![
            StopExamItem {
                attempt_code: "A1".to_string(),
                action: Some("submit".to_string()),
                user_id: Some("42".to_string()),
            },
            StopExamItem {
                attempt_code: "A2".to_string(),
                action: Some("submit".to_string()),
                user_id: None,
            },
        ];
        let err = mocks
            .engine()
            .stop_exams(&attempts, &AccessScope::All)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn stop_exams_all_successes_is_ok() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::Started);
        mocks
            .exams
            .expect_find_by_code()
            .returning(move |_, _| Ok(subject.clone()));
        mocks
            .platform
            .expect_stop_exam()
            .times(1)
            .returning(|_, _, _| Ok(200));
        mocks
            .notifier
            .expect_publish()
            .times(1)
            .returning(|_, _| Ok(()));

        let attempts = vec![StopExamItem {
            attempt_code: "A1".to_string(),
            action: Some("submit".to_string()),
            user_id: Some("42".to_string()),
        }];
        mocks
            .engine()
            .stop_exams(&attempts, &AccessScope::All)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn poll_statuses_mirrors_upstream_without_journaling() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::Started);
        let exam_id = subject.id;
        let channel = subject.event_hash.clone();

        mocks
            .platform
            .expect_poll_statuses()
            .times(1)
            .returning(|_| {
                Ok(vec![AttemptStatusUpdate {
                    attempt_code: "A1".to_string(),
                    status: "verified".to_string(),
                }])
            });
        mocks
            .exams
            .expect_find_by_code()
            .returning(move |_, _| Ok(subject.clone()));
        mocks
            .exams
            .expect_set_attempt_status()
            .with(eq(exam_id), eq("verified"))
            .times(1)
            .returning(|_, _| Ok(()));
        mocks.journal.expect_append().times(0);
        mocks
            .notifier
            .expect_publish()
            .withf(move |ch, payload| ch == channel && payload["status"] == "verified")
            .times(1)
            .returning(|_, _| Ok(()));

        mocks
            .engine()
            .poll_statuses(&["A1".to_string()], &AccessScope::All)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bulk_start_two_exams_one_journal_entry_two_notifications() {
        let mut mocks = Mocks::new();
        let exam_a = exam("A", ExamStatus::New);
        let exam_b = exam("B", ExamStatus::New);
        let exams = vec![exam_a, exam_b];

        mocks
            .exams
            .expect_find_by_codes()
            .times(1)
            .returning(move |_| Ok(exams.clone()));
        mocks
            .platform
            .expect_bulk_start()
            .times(1)
            .returning(|codes| Ok(codes.to_vec()));
        mocks
            .exams
            .expect_mark_started()
            .times(2)
            .returning(|_, _| Ok(()));
        mocks
            .notifier
            .expect_publish()
            .times(2)
            .returning(|_, _| Ok(()));
        mocks
            .journal
            .expect_append()
            .withf(|entry| {
                entry.journal_type == JournalType::BulkExamStatusChange
                    && entry.note.as_deref() == Some("A, B. NEW -> STARTED")
            })
            .times(1)
            .returning(|_| Ok(()));

        mocks
            .engine()
            .bulk_start_exams(&["A".to_string(), "B".to_string()], &proctor())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bulk_start_only_commits_exams_the_platform_started() {
        let mut mocks = Mocks::new();
        let exam_a = exam("A", ExamStatus::New);
        let started_id = exam_a.id;
        let exam_b = exam("B", ExamStatus::New);
        let exams = vec![exam_a, exam_b];

        mocks
            .exams
            .expect_find_by_codes()
            .returning(move |_| Ok(exams.clone()));
        mocks
            .platform
            .expect_bulk_start()
            .returning(|_| Ok(vec!["A".to_string()]));
        mocks
            .exams
            .expect_mark_started()
            .with(eq(started_id), always())
            .times(1)
            .returning(|_, _| Ok(()));
        mocks
            .notifier
            .expect_publish()
            .times(1)
            .returning(|_, _| Ok(()));
        mocks.journal.expect_append().times(1).returning(|_| Ok(()));

        mocks
            .engine()
            .bulk_start_exams(&["A".to_string(), "B".to_string()], &proctor())
            .await
            .unwrap();
    }

    fn review_payload(code: &str, comments: Vec<DesktopComment>) -> ReviewPayload {
        ReviewPayload {
            exam_meta_data: Some(ExamMetaData {
                exam_code: Some(code.to_string()),
            }),
            review_status: Some("Clean".to_string()),
            video_review_link: Some("http://video.url".to_string()),
            desktop_comments: Some(comments),
        }
    }

    #[tokio::test]
    async fn review_skips_duplicate_comments_and_finishes_attempt() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::Started);
        let exam_id = subject.id;
        mocks
            .exams
            .expect_find_by_code()
            .returning(move |_, _| Ok(subject.clone()));
        mocks
            .comments
            .expect_exists()
            .with(eq(exam_id), eq("looked away"), eq("Suspicious"))
            .times(1)
            .returning(|_, _, _| Ok(true));
        mocks.comments.expect_insert().times(0);
        let hash = exam("A1", ExamStatus::Started).generated_key();
        mocks
            .platform
            .expect_send_review()
            .withf(move |payload| {
                payload["examMetaData"]["ssiRecordLocator"] == hash.as_str()
                    && payload["examMetaData"]["reviewerNotes"] == ""
            })
            .times(1)
            .returning(|_| Ok(200));
        mocks
            .exams
            .expect_set_attempt_status()
            .with(eq(exam_id), eq("finished"))
            .times(1)
            .returning(|_, _| Ok(()));

        let payload = review_payload(
            "A1",
            vec![DesktopComment {
                comments: Some("looked away".to_string()),
                event_status: Some("Suspicious".to_string()),
                event_start: Some(123),
                event_finish: Some(321),
                duration: Some(198),
            }],
        );
        mocks
            .engine()
            .review_exam(payload, &AccessScope::All)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn review_inserts_new_comments_with_full_window() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::Started);
        let exam_id = subject.id;
        mocks
            .exams
            .expect_find_by_code()
            .returning(move |_, _| Ok(subject.clone()));
        mocks
            .comments
            .expect_exists()
            .returning(|_, _, _| Ok(false));
        mocks
            .comments
            .expect_insert()
            .withf(move |c| {
                c.exam_id == exam_id
                    && c.comment == "looked away"
                    && c.event_status == "Suspicious"
                    && c.event_start == Some(123)
                    && c.event_finish == Some(321)
                    && c.duration == Some(198)
            })
            .times(1)
            .returning(|c| {
                Ok(crate::models::comment::Comment {
                    id: Uuid::new_v4(),
                    exam_id: c.exam_id,
                    comment: c.comment.clone(),
                    event_status: c.event_status.clone(),
                    event_start: c.event_start,
                    event_finish: c.event_finish,
                    duration: c.duration,
                    created_at: None,
                })
            });
        mocks.platform.expect_send_review().returning(|_| Ok(201));
        mocks
            .exams
            .expect_set_attempt_status()
            .times(1)
            .returning(|_, _| Ok(()));

        let payload = review_payload(
            "A1",
            vec![DesktopComment {
                comments: Some("looked away".to_string()),
                event_status: Some("Suspicious".to_string()),
                event_start: Some(123),
                event_finish: Some(321),
                duration: Some(198),
            }],
        );
        mocks
            .engine()
            .review_exam(payload, &AccessScope::All)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn review_missing_required_field_touches_nothing() {
        let mut mocks = Mocks::new();
        mocks.exams.expect_find_by_code().times(0);
        mocks.platform.expect_send_review().times(0);

        let payload = ReviewPayload {
            exam_meta_data: Some(ExamMetaData {
                exam_code: Some("A1".to_string()),
            }),
            review_status: None,
            video_review_link: Some("http://video.url".to_string()),
            desktop_comments: Some(vec![]),
        };
        let err = mocks
            .engine()
            .review_exam(payload, &AccessScope::All)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn review_upstream_rejection_leaves_attempt_status_alone() {
        let mut mocks = Mocks::new();
        let subject = exam("A1", ExamStatus::Started);
        mocks
            .exams
            .expect_find_by_code()
            .returning(move |_, _| Ok(subject.clone()));
        mocks.platform.expect_send_review().returning(|_| Ok(422));
        mocks.exams.expect_set_attempt_status().times(0);

        let payload = review_payload("A1", vec![]);
        let err = mocks
            .engine()
            .review_exam(payload, &AccessScope::All)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { status: 422, .. }));
    }

    #[tokio::test]
    async fn archived_listing_restricts_non_wildcard_proctors_to_own_sessions() {
        let acting = proctor();
        let acting_id = acting.id;

        let mut mocks = Mocks::new();
        mocks
            .exams
            .expect_list_archived()
            .withf(move |_, query| query.restrict_proctor_id == Some(acting_id))
            .times(1)
            .returning(|_, _| Ok((vec![], 0)));
        let scope = AccessScope::Courses(vec!["course-a".to_string()]);
        mocks
            .engine()
            .list_archived_exams(&scope, &acting, &ArchivedExamFilter::default())
            .await
            .unwrap();

        let mut mocks = Mocks::new();
        mocks
            .exams
            .expect_list_archived()
            .withf(|_, query| query.restrict_proctor_id.is_none() && query.per_page == 50)
            .times(1)
            .returning(|_, _| Ok((vec![], 0)));
        mocks
            .engine()
            .list_archived_exams(&AccessScope::All, &acting, &ArchivedExamFilter::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn proctored_exams_filters_and_annotates_access() {
        let mut mocks = Mocks::new();
        mocks.platform.expect_proctored_exams().returning(|| {
            Ok(json!({
                "results": [
                    { "id": "course-a", "proctored_exams": [{ "exam_name": "Final" }] },
                    { "id": "course-b", "proctored_exams": [] },
                    { "id": "course-c", "proctored_exams": [{ "exam_name": "Midterm" }] },
                ]
            }))
        });

        let scope = AccessScope::Courses(vec!["course-a".to_string()]);
        let result = mocks.engine().proctored_exams(&scope).await.unwrap();
        let results = result["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], "course-a");
        assert_eq!(results[0]["has_access"], true);
        assert_eq!(results[1]["id"], "course-c");
        assert_eq!(results[1]["has_access"], false);
    }
}
