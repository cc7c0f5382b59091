pub mod comment;
pub mod exam;
pub mod health;
pub mod review;
pub mod session;
