use std::sync::Arc;

use axum::{routing::get, Router};

use shared_utils::AppState;

use crate::handlers;

pub fn rating_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_ratings))
        .route("/{doctor}", get(handlers::get_rating))
        .with_state(state)
}

pub fn statistics_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::get_statistics))
        .with_state(state)
}
