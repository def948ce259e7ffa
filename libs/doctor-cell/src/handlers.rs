use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use shared_models::{AppError, Doctor};
use shared_utils::AppState;

use crate::models::{DoctorListQuery, DoctorListResponse};

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorListQuery>,
) -> Json<DoctorListResponse> {
    let wanted = query
        .specialization
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let doctors: Vec<Doctor> = state
        .directory
        .doctors()
        .iter()
        .filter(|d| wanted.map_or(true, |w| d.specialization.eq_ignore_ascii_case(w)))
        .cloned()
        .collect();

    Json(DoctorListResponse {
        total: doctors.len(),
        doctors,
    })
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor): Path<String>,
) -> Result<Json<Doctor>, AppError> {
    state
        .directory
        .resolve(&doctor)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Doctor {} not found", doctor)))
}
