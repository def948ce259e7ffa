use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::{AppointmentId, DoctorId, PatientId, ReviewId, TimeSlot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub phone: String,
    pub notes: Option<String>,
}

/// Appointment fields known before the owning patient row exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub name: String,
    pub phone: String,
    pub time: TimeSlot,
    pub doctor_id: DoctorId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: AppointmentId,
    pub name: String,
    pub phone: String,
    pub time: TimeSlot,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub patient_id: PatientId,
    pub appointment_id: AppointmentId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub doctor_id: DoctorId,
    pub patient_name: String,
    pub rating: u8,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: ReviewId,
    pub doctor_id: DoctorId,
    pub patient_name: String,
    pub rating: u8,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-doctor review totals, grouped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewTally {
    pub doctor_id: DoctorId,
    pub review_count: i64,
    pub rating_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppointmentTally {
    pub doctor_id: DoctorId,
    pub total: i64,
    pub active: i64,
}
