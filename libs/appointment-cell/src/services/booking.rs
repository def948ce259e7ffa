use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use patient_cell::models::PatientIntake;
use patient_cell::services::PatientRegistry;
use shared_database::{ClinicStore, NewAppointment, NewPatient};
use shared_models::{Doctor, DoctorDirectory, InvalidTimeSlot, TimeSlot};
use shared_utils::validation::{required, resolve_doctor};

use crate::models::{AppointmentError, BookingConfirmation, BookingForm};

/// A booking form that passed every field check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub patient: NewPatient,
    pub appointment: NewAppointment,
    pub doctor: Doctor,
}

pub struct AppointmentBookingService {
    store: Arc<dyn ClinicStore>,
    directory: Arc<DoctorDirectory>,
}

impl AppointmentBookingService {
    pub fn new(store: Arc<dyn ClinicStore>, directory: Arc<DoctorDirectory>) -> Self {
        Self { store, directory }
    }

    /// Checks the form without touching storage. Empty fields are reported
    /// before malformed ones.
    pub fn validate(&self, form: &BookingForm) -> Result<ValidatedBooking, AppointmentError> {
        required(&form.name, "Name").map_err(AppointmentError::Validation)?;
        required(&form.phone, "Phone number").map_err(AppointmentError::Validation)?;
        let raw_time = required(&form.time, "Time slot").map_err(AppointmentError::Validation)?;
        required(&form.doctor, "Doctor").map_err(AppointmentError::Validation)?;

        let patient = PatientRegistry::register(&PatientIntake {
            name: form.name.clone(),
            phone: form.phone.clone(),
            notes: form.notes.clone(),
        })
        .map_err(|e| AppointmentError::Validation(e.to_string()))?;

        let time: TimeSlot = raw_time
            .parse()
            .map_err(|e: InvalidTimeSlot| AppointmentError::Validation(e.to_string()))?;

        let doctor = resolve_doctor(&self.directory, &form.doctor)
            .map_err(AppointmentError::Validation)?
            .clone();

        let appointment = NewAppointment {
            name: patient.name.clone(),
            phone: patient.phone.clone(),
            time,
            doctor_id: doctor.id.clone(),
        };

        Ok(ValidatedBooking {
            patient,
            appointment,
            doctor,
        })
    }

    /// Validates, then writes the patient and appointment rows as one unit.
    #[instrument(skip(self, form), fields(doctor = %form.doctor))]
    pub async fn book(&self, form: &BookingForm) -> Result<BookingConfirmation, AppointmentError> {
        debug!("Booking appointment");

        let booking = self.validate(form).map_err(|e| {
            warn!("Booking rejected: {}", e);
            e
        })?;

        let receipt = self
            .store
            .book_appointment(&booking.patient, &booking.appointment)
            .await
            .map_err(|e| {
                error!("Booking transaction rolled back: {}", e);
                AppointmentError::Storage(e)
            })?;

        info!(
            "Booked appointment {} (patient {}) with {} at {}",
            receipt.appointment_id, receipt.patient_id, booking.doctor.id, booking.appointment.time
        );

        Ok(BookingConfirmation {
            appointment_id: receipt.appointment_id,
            patient_id: receipt.patient_id,
            message: format!(
                "Appointment booked with {} at {}",
                booking.doctor.name,
                booking.appointment.time.range_label()
            ),
            doctor_id: booking.doctor.id,
            doctor_name: booking.doctor.name,
            time: booking.appointment.time,
        })
    }
}
