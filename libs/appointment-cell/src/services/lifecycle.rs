use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use shared_database::ClinicStore;
use shared_models::{AppointmentId, InvalidTimeSlot, TimeSlot};
use shared_utils::validation::required;

use crate::models::{AppointmentError, LifecycleAction, TransitionReport};

/// Single-statement transitions on an existing appointment. None of them
/// read the row first; a missing id touches zero rows and is not an error.
pub struct AppointmentLifecycleService {
    store: Arc<dyn ClinicStore>,
}

impl AppointmentLifecycleService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    pub fn parse_time(raw: &str) -> Result<TimeSlot, AppointmentError> {
        let raw = required(raw, "New time slot").map_err(AppointmentError::Validation)?;
        raw.parse()
            .map_err(|e: InvalidTimeSlot| AppointmentError::Validation(e.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_time(
        &self,
        appointment_id: AppointmentId,
        raw_time: &str,
    ) -> Result<TransitionReport, AppointmentError> {
        debug!("Updating appointment time");
        let time = Self::parse_time(raw_time).map_err(|e| {
            warn!("Update rejected: {}", e);
            e
        })?;

        let rows = self.store.update_appointment_time(appointment_id, time).await?;
        Ok(Self::report(appointment_id, LifecycleAction::Update, rows))
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, appointment_id: AppointmentId) -> Result<TransitionReport, AppointmentError> {
        debug!("Cancelling appointment");
        let rows = self.store.cancel_appointment(appointment_id).await?;
        Ok(Self::report(appointment_id, LifecycleAction::Cancel, rows))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, appointment_id: AppointmentId) -> Result<TransitionReport, AppointmentError> {
        debug!("Deleting appointment");
        let rows = self.store.delete_appointment(appointment_id).await?;
        Ok(Self::report(appointment_id, LifecycleAction::Delete, rows))
    }

    fn report(appointment_id: AppointmentId, action: LifecycleAction, rows_affected: u64) -> TransitionReport {
        if rows_affected == 0 {
            info!("{} on appointment {} matched no rows", action, appointment_id);
        } else {
            info!("{} on appointment {} applied", action, appointment_id);
        }

        TransitionReport {
            appointment_id,
            action,
            rows_affected,
        }
    }
}
