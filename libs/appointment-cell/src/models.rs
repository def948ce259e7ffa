use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::{AppointmentRecord, DatabaseError};
use shared_models::{AppError, AppointmentId, DoctorDirectory, DoctorId, PatientId, TimeSlot};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Raw booking submission. Fields stay as typed by the visitor so a rejected
/// form can be handed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub doctor: Option<String>,
    pub status: Option<AppointmentState>,
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentState {
    Active,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Update,
    Cancel,
    Delete,
}

impl AppointmentState {
    pub fn from_active(active: bool) -> Self {
        if active {
            AppointmentState::Active
        } else {
            AppointmentState::Cancelled
        }
    }

    /// Actions the presentation layer offers for a row in this state.
    pub fn allowed_actions(self) -> &'static [LifecycleAction] {
        match self {
            AppointmentState::Active => &[
                LifecycleAction::Update,
                LifecycleAction::Cancel,
                LifecycleAction::Delete,
            ],
            AppointmentState::Cancelled => &[LifecycleAction::Delete],
        }
    }

    /// State after `action`. `None` means the row is gone.
    pub fn apply(self, action: LifecycleAction) -> Option<AppointmentState> {
        match action {
            LifecycleAction::Update => Some(self),
            LifecycleAction::Cancel => Some(AppointmentState::Cancelled),
            LifecycleAction::Delete => None,
        }
    }
}

impl fmt::Display for AppointmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentState::Active => write!(f, "active"),
            AppointmentState::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleAction::Update => write!(f, "update"),
            LifecycleAction::Cancel => write!(f, "cancel"),
            LifecycleAction::Delete => write!(f, "delete"),
        }
    }
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub appointment_id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub time: TimeSlot,
    pub message: String,
}

/// Rows touched by a single-statement transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionReport {
    pub appointment_id: AppointmentId,
    pub action: LifecycleAction,
    pub rows_affected: u64,
}

/// An appointment as the listing renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: AppointmentId,
    pub name: String,
    pub phone: String,
    pub time: TimeSlot,
    pub time_range: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub patient_id: PatientId,
    pub status: AppointmentState,
    pub allowed_actions: Vec<LifecycleAction>,
    pub created_at: DateTime<Utc>,
}

impl AppointmentView {
    pub fn from_record(record: AppointmentRecord, directory: &DoctorDirectory) -> Self {
        let status = AppointmentState::from_active(record.active);
        let doctor_name = directory.display_name(&record.doctor_id).to_string();

        Self {
            id: record.id,
            name: record.name,
            phone: record.phone,
            time: record.time,
            time_range: record.time.range_label().to_string(),
            doctor_name,
            doctor_id: record.doctor_id,
            patient_id: record.patient_id,
            status,
            allowed_actions: status.allowed_actions().to_vec(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentView>,
    pub total: usize,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("{0}")]
    Validation(String),

    #[error("Appointment {0} not found")]
    NotFound(AppointmentId),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation(msg) => AppError::ValidationFailed(msg),
            AppointmentError::NotFound(id) => AppError::NotFound(format!("Appointment {} not found", id)),
            AppointmentError::Storage(db) => db.into(),
        }
    }
}
