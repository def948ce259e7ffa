use std::sync::Arc;

use axum::{routing::get, Router};

use shared_utils::AppState;

use crate::handlers;

/// Read-only routes. Mutations go through the action dispatcher.
pub fn appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .with_state(state)
}
