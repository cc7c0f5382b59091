use axum::{extract::State, http::StatusCode, response::Json, Extension};

use crate::dto::review_dto::ReviewPayload;
use crate::models::proctor::{AccessScope, Proctor};
use crate::AppState;

pub async fn submit_review(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Json(payload): Json<ReviewPayload>,
) -> crate::error::Result<StatusCode> {
    state.engine.review_exam(payload, &scope).await?;
    Ok(StatusCode::OK)
}
