use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the proctor acting on a request, resolved by the auth
/// middleware from gateway-provided headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proctor {
    pub id: Uuid,
    pub name: String,
}

/// Visibility scope applied to every exam/session query. Passed explicitly
/// into the repository layer rather than read from ambient request state.
///
/// A wildcard permission grant resolves to `All` and takes precedence over
/// any course-scoped grants the same proctor may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    All,
    Courses(Vec<String>),
}

impl AccessScope {
    pub fn allows_course(&self, course_id: &str) -> bool {
        match self {
            AccessScope::All => true,
            AccessScope::Courses(courses) => courses.iter().any(|c| c == course_id),
        }
    }

    /// Bindable form for SQL filters: `None` means unrestricted.
    pub fn course_filter(&self) -> Option<Vec<String>> {
        match self {
            AccessScope::All => None,
            AccessScope::Courses(courses) => Some(courses.clone()),
        }
    }
}
