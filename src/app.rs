use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/summary", get(handlers::get_summary))
        .route("/health", get(handlers::health))
        .with_state(state)
}
