use std::sync::Arc;

use axum::{routing::get, Router};

use shared_utils::AppState;

use crate::handlers;

pub fn review_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_reviews))
        .with_state(state)
}
