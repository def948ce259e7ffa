use std::sync::Arc;

use axum::{routing::post, Router};

use shared_utils::AppState;

use crate::handlers;

/// The only routes that write.
pub fn dispatch_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::submit_action))
        .route("/form", post(handlers::submit_legacy_form))
        .with_state(state)
}
