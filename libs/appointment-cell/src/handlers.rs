use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::debug;

use shared_models::{AppError, AppointmentId};
use shared_utils::validation::resolve_doctor;
use shared_utils::AppState;

use crate::models::{AppointmentError, AppointmentListQuery, AppointmentListResponse, AppointmentView};

/// Every stored appointment, cancelled ones included and labelled.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<AppointmentListResponse>, AppError> {
    let doctor = match query.doctor.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(reference) => Some(
            resolve_doctor(&state.directory, reference)
                .map_err(AppError::BadRequest)?
                .id
                .clone(),
        ),
        None => None,
    };

    let records = state.store.list_appointments().await?;
    debug!("Loaded {} appointments", records.len());

    let appointments: Vec<AppointmentView> = records
        .into_iter()
        .filter(|r| doctor.as_ref().map_or(true, |d| &r.doctor_id == d))
        .map(|r| AppointmentView::from_record(r, &state.directory))
        .filter(|v| query.status.map_or(true, |s| v.status == s))
        .collect();

    Ok(Json(AppointmentListResponse {
        total: appointments.len(),
        appointments,
    }))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<AppointmentView>, AppError> {
    let id = AppointmentId::from(appointment_id);

    let record = state
        .store
        .get_appointment(id)
        .await?
        .ok_or(AppointmentError::NotFound(id))?;

    Ok(Json(AppointmentView::from_record(record, &state.directory)))
}
