use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use validator::Validate;

use crate::dto::comment_dto::{CommentFilter, CreateCommentRequest};
use crate::dto::session_dto::PaginatedResponse;
use crate::models::comment::Comment;
use crate::models::proctor::{AccessScope, Proctor};
use crate::AppState;

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(_proctor): Extension<Proctor>,
    Query(filter): Query<CommentFilter>,
) -> crate::error::Result<Json<PaginatedResponse<Comment>>> {
    let (rows, count, page) = state.comment_service.list(&filter).await?;
    Ok(Json(PaginatedResponse {
        count,
        page,
        results: rows,
    }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(proctor): Extension<Proctor>,
    Extension(scope): Extension<AccessScope>,
    Json(request): Json<CreateCommentRequest>,
) -> crate::error::Result<(StatusCode, Json<Comment>)> {
    request.comment.validate()?;
    let created = state
        .comment_service
        .add_comment(&request, &proctor, &scope)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
