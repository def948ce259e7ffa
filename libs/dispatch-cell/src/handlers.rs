use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Form, Json,
};
use tracing::warn;

use shared_models::{ActionOutcome, AppError};
use shared_utils::AppState;

use crate::models::{ClinicAction, LegacyActionForm};
use crate::services::ActionDispatcher;

#[axum::debug_handler]
pub async fn submit_action(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClinicAction>, JsonRejection>,
) -> (StatusCode, Json<ActionOutcome>) {
    let action = match payload {
        Ok(Json(action)) => action,
        Err(rejection) => {
            warn!("Undecodable action: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(ActionOutcome::error(rejection.body_text())),
            );
        }
    };

    let (status, outcome) = ActionDispatcher::new(&state).dispatch(action).await;
    (status, Json(outcome))
}

#[axum::debug_handler]
pub async fn submit_legacy_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LegacyActionForm>,
) -> (StatusCode, Json<ActionOutcome>) {
    let action = match form.into_action() {
        Ok(action) => action,
        Err(err) => return reject(err),
    };

    let (status, outcome) = ActionDispatcher::new(&state).dispatch(action).await;
    (status, Json(outcome))
}

fn reject(err: AppError) -> (StatusCode, Json<ActionOutcome>) {
    (err.status_code(), Json(ActionDispatcher::failure(&err)))
}
