pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod utils;

use crate::repository::{
    PgCommentRepository, PgExamRepository, PgJournalRepository, PgSessionRepository,
};
use crate::services::comment_service::CommentService;
use crate::services::notifier::PushGatewayNotifier;
use crate::services::platform_client::HttpPlatformClient;
use crate::services::session_service::SessionService;
use crate::services::transition_engine::TransitionEngine;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub engine: TransitionEngine,
    pub session_service: SessionService,
    pub comment_service: CommentService,
}

impl AppState {
    pub fn new(pool: PgPool) -> crate::error::Result<Self> {
        let config = crate::config::get_config();

        let exams = Arc::new(PgExamRepository::new(pool.clone()));
        let sessions = Arc::new(PgSessionRepository::new(pool.clone()));
        let comments = Arc::new(PgCommentRepository::new(pool.clone()));
        let journal = Arc::new(PgJournalRepository::new(pool.clone()));

        let platform = Arc::new(HttpPlatformClient::new(
            &config.platform_api_url,
            config.platform_api_token.clone(),
        )?);
        let notifier = Arc::new(PushGatewayNotifier::new(config.push_gateway_url.clone()));

        let engine = TransitionEngine::new(
            exams.clone(),
            comments.clone(),
            journal.clone(),
            platform,
            notifier,
        );
        let session_service = SessionService::new(sessions, journal.clone());
        let comment_service = CommentService::new(exams, comments, journal);

        Ok(Self {
            pool,
            engine,
            session_service,
            comment_service,
        })
    }
}
