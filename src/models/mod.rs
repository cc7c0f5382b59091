pub mod comment;
pub mod event_session;
pub mod exam;
pub mod journaling;
pub mod proctor;
