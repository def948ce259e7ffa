use serde::{Deserialize, Serialize};

use shared_models::DoctorId;

/// Mean rating of one doctor over every review on file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRating {
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub specialization: String,
    pub average_rating: f64,
    pub review_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsResponse {
    pub ratings: Vec<DoctorRating>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorAppointmentCount {
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub total: i64,
    pub active: i64,
    pub cancelled: i64,
}

/// Clinic-wide counts. Cancelled appointments stay in every total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicStatistics {
    pub total_appointments: i64,
    pub active_appointments: i64,
    pub cancelled_appointments: i64,
    pub total_patients: i64,
    pub per_doctor: Vec<DoctorAppointmentCount>,
}
