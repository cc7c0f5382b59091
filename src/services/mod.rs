pub mod comment_service;
pub mod notifier;
pub mod platform_client;
pub mod session_service;
pub mod transition_engine;
