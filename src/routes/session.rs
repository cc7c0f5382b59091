use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use validator::Validate;

use crate::dto::session_dto::{
    ArchivedSessionFilter, CreateSessionRequest, PaginatedResponse, SessionListQuery,
    SessionResponse, UpdateSessionRequest,
};
use crate::models::proctor::{AccessScope, Proctor};
use crate::services::session_service::CreateSessionOutcome;
use crate::AppState;

pub async fn create_session(
    State(state): State<AppState>,
    Extension(proctor): Extension<Proctor>,
    Json(request): Json<CreateSessionRequest>,
) -> crate::error::Result<Response> {
    request.validate()?;
    let outcome = state
        .session_service
        .create_session(&request, &proctor)
        .await?;
    let response = match outcome {
        CreateSessionOutcome::Existing(session) => (
            StatusCode::OK,
            Json(SessionResponse::from(session)),
        )
            .into_response(),
        CreateSessionOutcome::Created(session) => (
            StatusCode::CREATED,
            Json(SessionResponse::from(session)),
        )
            .into_response(),
    };
    Ok(response)
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Query(query): Query<SessionListQuery>,
) -> crate::error::Result<Json<PaginatedResponse<SessionResponse>>> {
    let (rows, count, page) = state.session_service.list_in_progress(&scope, &query).await?;
    Ok(Json(PaginatedResponse {
        count,
        page,
        results: rows.into_iter().map(SessionResponse::from).collect(),
    }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Path(hash_key): Path<String>,
) -> crate::error::Result<Json<SessionResponse>> {
    let session = state.session_service.get_session(&hash_key, &scope).await?;
    Ok(Json(SessionResponse::from(session)))
}

pub async fn update_session(
    State(state): State<AppState>,
    Extension(proctor): Extension<Proctor>,
    Path(hash_key): Path<String>,
    Json(request): Json<UpdateSessionRequest>,
) -> crate::error::Result<Json<SessionResponse>> {
    let updated = state
        .session_service
        .update_session(&hash_key, &request, &proctor)
        .await?;
    Ok(Json(SessionResponse::from(updated)))
}

pub async fn list_archived_sessions(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Query(filter): Query<ArchivedSessionFilter>,
) -> crate::error::Result<Json<PaginatedResponse<SessionResponse>>> {
    let (rows, count, page) = state.session_service.list_archived(&scope, &filter).await?;
    Ok(Json(PaginatedResponse {
        count,
        page,
        results: rows.into_iter().map(SessionResponse::from).collect(),
    }))
}
