use axum::http::StatusCode;
use tracing::{error, info, instrument, warn};

use appointment_cell::services::{AppointmentBookingService, AppointmentLifecycleService};
use review_cell::services::ReviewService;
use shared_models::{ActionOutcome, AppError};
use shared_utils::AppState;

use crate::models::ClinicAction;

/// Runs exactly one mutation per request and reports the result in the
/// same response.
pub struct ActionDispatcher {
    booking: AppointmentBookingService,
    lifecycle: AppointmentLifecycleService,
    reviews: ReviewService,
}

impl ActionDispatcher {
    pub fn new(state: &AppState) -> Self {
        Self {
            booking: AppointmentBookingService::new(state.store.clone(), state.directory.clone()),
            lifecycle: AppointmentLifecycleService::new(state.store.clone()),
            reviews: ReviewService::new(state.store.clone(), state.directory.clone()),
        }
    }

    #[instrument(skip(self, action), fields(action = action.name()))]
    pub async fn dispatch(&self, action: ClinicAction) -> (StatusCode, ActionOutcome) {
        let preserved = action.preserved_input();

        match self.execute(action).await {
            Ok(message) => {
                info!("{}", message);
                (StatusCode::OK, ActionOutcome::success(message))
            }
            Err(err) => {
                let outcome = Self::failure(&err);
                match (err.is_validation(), preserved) {
                    (true, Some(input)) => (err.status_code(), outcome.with_preserved_input(input)),
                    _ => (err.status_code(), outcome),
                }
            }
        }
    }

    /// Logs `err` and converts it into a visitor-facing outcome.
    pub fn failure(err: &AppError) -> ActionOutcome {
        match err {
            AppError::Conflict(_) | AppError::Unavailable(_) => error!("Action failed: {}", err),
            _ => warn!("Action rejected: {}", err),
        }
        ActionOutcome::error(err.user_message())
    }

    async fn execute(&self, action: ClinicAction) -> Result<String, AppError> {
        match action {
            ClinicAction::Book(form) => {
                let confirmation = self.booking.book(&form).await?;
                Ok(confirmation.message)
            }
            ClinicAction::Update { appointment_id, time } => {
                let report = self.lifecycle.update_time(appointment_id, &time).await?;
                Ok(format!("Appointment {} updated", report.appointment_id))
            }
            ClinicAction::Cancel { appointment_id } => {
                let report = self.lifecycle.cancel(appointment_id).await?;
                Ok(format!("Appointment {} cancelled", report.appointment_id))
            }
            ClinicAction::Delete { appointment_id } => {
                let report = self.lifecycle.delete(appointment_id).await?;
                Ok(format!("Appointment {} deleted", report.appointment_id))
            }
            ClinicAction::Review(form) => {
                let review = self.reviews.submit(&form).await?;
                Ok(format!("Thank you for reviewing {}", review.doctor_name))
            }
        }
    }
}
