use async_trait::async_trait;

use shared_models::{AppointmentId, DoctorId, TimeSlot};

use crate::error::DatabaseError;
use crate::rows::{
    AppointmentRecord, AppointmentTally, BookingReceipt, NewAppointment, NewPatient, NewReview,
    ReviewRecord, ReviewTally,
};

/// The relational store behind the clinic core.
///
/// `book_appointment` is the only multi-statement unit: the patient row and
/// the appointment row referencing it are committed together or not at all.
/// Every other mutation is a single statement and reports how many rows it
/// touched; zero is not an error.
#[async_trait]
pub trait ClinicStore: Send + Sync {
    async fn book_appointment(
        &self,
        patient: &NewPatient,
        appointment: &NewAppointment,
    ) -> Result<BookingReceipt, DatabaseError>;

    async fn update_appointment_time(
        &self,
        id: AppointmentId,
        time: TimeSlot,
    ) -> Result<u64, DatabaseError>;

    async fn cancel_appointment(&self, id: AppointmentId) -> Result<u64, DatabaseError>;

    async fn delete_appointment(&self, id: AppointmentId) -> Result<u64, DatabaseError>;

    async fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<AppointmentRecord>, DatabaseError>;

    /// Every stored appointment, active or cancelled, oldest first.
    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, DatabaseError>;

    async fn insert_review(&self, review: &NewReview) -> Result<ReviewRecord, DatabaseError>;

    /// Reviews newest first, optionally for a single doctor.
    async fn list_reviews(
        &self,
        doctor: Option<&DoctorId>,
    ) -> Result<Vec<ReviewRecord>, DatabaseError>;

    async fn review_tallies(&self) -> Result<Vec<ReviewTally>, DatabaseError>;

    async fn appointment_tallies(&self) -> Result<Vec<AppointmentTally>, DatabaseError>;

    async fn count_patients(&self) -> Result<i64, DatabaseError>;
}
