pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/matches/score", post(handlers::handle_score))
        .route("/api/v1/matches/batch", post(handlers::handle_score_batch))
        .route("/api/v1/matches/compare", post(handlers::handle_compare))
        .route(
            "/api/v1/matches/suggestions",
            post(handlers::handle_suggestions),
        )
        .route(
            "/api/v1/jobs/candidates",
            post(handlers::handle_score_candidates),
        )
        .with_state(state)
}
