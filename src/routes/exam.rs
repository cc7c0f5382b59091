use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::Value as JsonValue;

use crate::dto::exam_dto::{
    ArchivedExamFilter, ArchivedExamResponse, ExamCodeListRequest, StartExamResponse,
    StopExamRequest, StopExamResponse, StopExamsRequest,
};
use crate::dto::session_dto::PaginatedResponse;
use crate::models::proctor::{AccessScope, Proctor};
use crate::AppState;

pub async fn start_exam(
    State(state): State<AppState>,
    Extension(proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Path(attempt_code): Path<String>,
) -> crate::error::Result<Json<StartExamResponse>> {
    let response = state
        .engine
        .start_exam(&attempt_code, &proctor, &scope)
        .await?;
    Ok(Json(response))
}

pub async fn stop_exam(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Path(attempt_code): Path<String>,
    Json(request): Json<StopExamRequest>,
) -> crate::error::Result<Json<StopExamResponse>> {
    let response = state
        .engine
        .stop_exam(
            &attempt_code,
            request.action.as_deref(),
            request.user_id.as_deref(),
            &scope,
        )
        .await?;
    Ok(Json(response))
}

pub async fn stop_exams(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Json(request): Json<StopExamsRequest>,
) -> crate::error::Result<StatusCode> {
    state.engine.stop_exams(&request.attempts, &scope).await?;
    Ok(StatusCode::OK)
}

pub async fn poll_status(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Json(request): Json<ExamCodeListRequest>,
) -> crate::error::Result<StatusCode> {
    state.engine.poll_statuses(&request.list, &scope).await?;
    Ok(StatusCode::OK)
}

pub async fn bulk_start_exams(
    State(state): State<AppState>,
    Extension(proctor): Extension<Proctor>,
    Json(request): Json<ExamCodeListRequest>,
) -> crate::error::Result<StatusCode> {
    state
        .engine
        .bulk_start_exams(&request.list, &proctor)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn proctored_exams(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
) -> crate::error::Result<Json<JsonValue>> {
    let results = state.engine.proctored_exams(&scope).await?;
    Ok(Json(results))
}

pub async fn list_archived_exams(
    State(state): State<AppState>,
    Extension(proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Query(filter): Query<ArchivedExamFilter>,
) -> crate::error::Result<Json<PaginatedResponse<ArchivedExamResponse>>> {
    let (rows, count, page) = state
        .engine
        .list_archived_exams(&scope, &proctor, &filter)
        .await?;
    Ok(Json(PaginatedResponse {
        count,
        page,
        results: rows.into_iter().map(ArchivedExamResponse::from).collect(),
    }))
}
