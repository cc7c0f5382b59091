pub mod comment_repository;
pub mod exam_repository;
pub mod journal_repository;
pub mod session_repository;

pub use comment_repository::{CommentRepository, PgCommentRepository};
pub use exam_repository::{ExamRepository, PgExamRepository};
pub use journal_repository::{JournalRepository, PgJournalRepository};
pub use session_repository::{PgSessionRepository, SessionRepository};
