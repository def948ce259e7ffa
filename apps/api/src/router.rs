use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use dispatch_cell::router::dispatch_routes;
use doctor_cell::router::doctor_routes;
use review_cell::router::review_routes;
use shared_utils::AppState;
use statistics_cell::router::{rating_routes, statistics_routes};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/reviews", review_routes(state.clone()))
        .nest("/ratings", rating_routes(state.clone()))
        .nest("/statistics", statistics_routes(state.clone()))
        .nest("/actions", dispatch_routes(state))
}
