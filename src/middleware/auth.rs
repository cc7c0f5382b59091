use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::models::proctor::{AccessScope, Proctor};

/// Requests arrive through the SSO gateway, which authenticates the proctor
/// and forwards identity and permission grants as headers. This middleware
/// verifies the gateway's shared secret and turns those headers into the
/// `Proctor` and `AccessScope` extensions every handler consumes.
pub async fn require_proctor(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response();
    };

    let config = crate::config::get_config();
    if token != config.gateway_shared_secret {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"invalid_token"})),
        )
            .into_response();
    }

    let proctor_id = req
        .headers()
        .get("x-proctor-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok());
    let proctor_name = req
        .headers()
        .get("x-proctor-name")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let (Some(id), Some(name)) = (proctor_id, proctor_name) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_proctor_identity"})),
        )
            .into_response();
    };

    // A wildcard grant supersedes any course-scoped grants.
    let wildcard = req
        .headers()
        .get("x-proctor-wildcard")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true" || v == "*");
    let scope = if wildcard {
        AccessScope::All
    } else {
        let courses = req
            .headers()
            .get("x-proctor-courses")
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        AccessScope::Courses(courses)
    };

    req.extensions_mut().insert(Proctor { id, name });
    req.extensions_mut().insert(scope);
    next.run(req).await
}
