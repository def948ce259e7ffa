pub mod doctor;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod time_slot;

pub use doctor::{Doctor, DoctorDirectory, DoctorId, DirectoryError};
pub use error::AppError;
pub use ids::{AppointmentId, PatientId, ReviewId};
pub use outcome::{ActionOutcome, OutcomeStatus};
pub use time_slot::{TimeSlot, InvalidTimeSlot};
