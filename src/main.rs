use axum::{
    routing::{get, post, put},
    Router,
};
use proctoring_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool)?;

    let api = Router::new()
        .route("/api/exams/proctored", get(routes::exam::proctored_exams))
        .route("/api/exams/archived", get(routes::exam::list_archived_exams))
        .route("/api/exams/stop_all", put(routes::exam::stop_exams))
        .route("/api/exams/poll_status", post(routes::exam::poll_status))
        .route("/api/exams/bulk_start", post(routes::exam::bulk_start_exams))
        .route("/api/exams/:attempt_code/start", get(routes::exam::start_exam))
        .route("/api/exams/:attempt_code/stop", put(routes::exam::stop_exam))
        .route("/api/review", post(routes::review::submit_review))
        .route(
            "/api/sessions",
            post(routes::session::create_session).get(routes::session::list_sessions),
        )
        .route(
            "/api/sessions/archived",
            get(routes::session::list_archived_sessions),
        )
        .route(
            "/api/sessions/:hash_key",
            get(routes::session::get_session).patch(routes::session::update_session),
        )
        .route(
            "/api/comments",
            get(routes::comment::list_comments).post(routes::comment::create_comment),
        )
        .layer(axum::middleware::from_fn(
            proctoring_backend::middleware::auth::require_proctor,
        ));

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .merge(api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
