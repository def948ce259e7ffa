use std::sync::Arc;

use tracing::{debug, instrument, warn};

use shared_database::{ClinicStore, DatabaseError, NewPatient};
use shared_utils::validation::{optional_text, required};

use crate::models::{PatientError, PatientIntake, PhoneNumber};

/// Creates patient contact rows. Rows are only ever written as part of a
/// booking, so the registry validates and shapes the record and leaves the
/// insert to the booking transaction.
pub struct PatientRegistry {
    store: Arc<dyn ClinicStore>,
}

impl PatientRegistry {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Validates an intake. Every booking yields a new record, even for a
    /// phone number that is already on file.
    #[instrument(skip(intake))]
    pub fn register(intake: &PatientIntake) -> Result<NewPatient, PatientError> {
        let name = required(&intake.name, "Name").map_err(PatientError::MissingField)?;
        required(&intake.phone, "Phone number").map_err(PatientError::MissingField)?;

        // Matched untrimmed: surrounding whitespace is not a digit.
        let phone = PhoneNumber::parse(&intake.phone).map_err(|e| {
            warn!("Rejected patient intake with malformed phone");
            e
        })?;

        debug!("Patient intake accepted");

        Ok(NewPatient {
            name: name.to_string(),
            phone: phone.into_inner(),
            notes: optional_text(intake.notes.as_deref()),
        })
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        self.store.count_patients().await
    }
}
