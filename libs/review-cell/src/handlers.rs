use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use shared_models::AppError;
use shared_utils::AppState;

use crate::models::{ReviewError, ReviewListQuery, ReviewListResponse};
use crate::services::ReviewService;

#[axum::debug_handler]
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ReviewListResponse>, AppError> {
    let service = ReviewService::new(state.store.clone(), state.directory.clone());

    let reviews = service.list(query.doctor.as_deref()).await.map_err(|e| match e {
        // A bad filter is a malformed query, not a rejected submission.
        ReviewError::UnknownDoctor(msg) => AppError::BadRequest(msg),
        other => other.into(),
    })?;

    Ok(Json(ReviewListResponse {
        total: reviews.len(),
        reviews,
    }))
}
