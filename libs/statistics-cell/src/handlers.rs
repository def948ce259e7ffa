use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use shared_models::AppError;
use shared_utils::AppState;

use crate::models::{ClinicStatistics, DoctorRating, RatingsResponse};
use crate::services::{RatingAggregator, StatisticsAggregator};

#[axum::debug_handler]
pub async fn list_ratings(State(state): State<Arc<AppState>>) -> Result<Json<RatingsResponse>, AppError> {
    let ratings = RatingAggregator::new(state.store.clone(), state.directory.clone())
        .ratings()
        .await?;

    Ok(Json(RatingsResponse {
        total: ratings.len(),
        ratings,
    }))
}

#[axum::debug_handler]
pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    Path(doctor): Path<String>,
) -> Result<Json<DoctorRating>, AppError> {
    let listed = state
        .directory
        .resolve(&doctor)
        .ok_or_else(|| AppError::NotFound(format!("Doctor {} not found", doctor)))?;

    RatingAggregator::new(state.store.clone(), state.directory.clone())
        .rating_for(listed)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} has no reviews yet", listed.name)))
}

#[axum::debug_handler]
pub async fn get_statistics(State(state): State<Arc<AppState>>) -> Result<Json<ClinicStatistics>, AppError> {
    let stats = StatisticsAggregator::new(state.store.clone(), state.directory.clone())
        .compute()
        .await?;
    Ok(Json(stats))
}
