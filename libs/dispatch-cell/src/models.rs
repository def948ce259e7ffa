use serde::{Deserialize, Serialize};
use serde_json::Value;

use appointment_cell::models::BookingForm;
use review_cell::models::{RatingInput, ReviewForm};
use shared_models::{AppError, AppointmentId};

/// One mutation request, decoded once at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClinicAction {
    Book(BookingForm),
    Update {
        appointment_id: AppointmentId,
        #[serde(default)]
        time: String,
    },
    Cancel {
        appointment_id: AppointmentId,
    },
    Delete {
        appointment_id: AppointmentId,
    },
    Review(ReviewForm),
}

impl ClinicAction {
    pub fn name(&self) -> &'static str {
        match self {
            ClinicAction::Book(_) => "book",
            ClinicAction::Update { .. } => "update",
            ClinicAction::Cancel { .. } => "cancel",
            ClinicAction::Delete { .. } => "delete",
            ClinicAction::Review(_) => "review",
        }
    }

    /// Form contents handed back when a submission has to be corrected.
    pub fn preserved_input(&self) -> Option<Value> {
        match self {
            ClinicAction::Book(form) => serde_json::to_value(form).ok(),
            ClinicAction::Review(form) => serde_json::to_value(form).ok(),
            _ => None,
        }
    }
}

/// The original form-encoded submission. Which action it carries is decided
/// by which marker fields are present; all values arrive as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyActionForm {
    pub submit_review: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
    pub cancel: Option<String>,

    pub appointment_id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub time: Option<String>,
    pub doctor: Option<String>,
    pub notes: Option<String>,
    pub reviewer: Option<String>,
    pub rating: Option<String>,
    pub comment: Option<String>,
}

impl LegacyActionForm {
    fn markers(&self) -> Vec<&'static str> {
        [
            ("submit_review", self.submit_review.is_some()),
            ("update", self.update.is_some()),
            ("delete", self.delete.is_some()),
            ("cancel", self.cancel.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    fn appointment_id(&self) -> Result<AppointmentId, AppError> {
        let raw = self
            .appointment_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::ValidationFailed("Appointment id is required".to_string()))?;

        raw.parse::<i64>()
            .map(AppointmentId::from)
            .map_err(|_| AppError::ValidationFailed(format!("'{}' is not a valid appointment id", raw)))
    }

    /// More than one marker is rejected rather than resolved by precedence.
    /// No marker at all is a booking.
    pub fn into_action(self) -> Result<ClinicAction, AppError> {
        let markers = self.markers();

        match markers.as_slice() {
            [] => Ok(ClinicAction::Book(BookingForm {
                name: self.name.unwrap_or_default(),
                phone: self.phone.unwrap_or_default(),
                time: self.time.unwrap_or_default(),
                doctor: self.doctor.unwrap_or_default(),
                notes: self.notes,
            })),
            ["submit_review"] => Ok(ClinicAction::Review(ReviewForm {
                doctor: self.doctor.unwrap_or_default(),
                reviewer: self.reviewer.unwrap_or_default(),
                rating: self.rating.map(RatingInput::Text),
                comment: self.comment,
            })),
            ["update"] => Ok(ClinicAction::Update {
                appointment_id: self.appointment_id()?,
                time: self.time.unwrap_or_default(),
            }),
            ["delete"] => Ok(ClinicAction::Delete {
                appointment_id: self.appointment_id()?,
            }),
            ["cancel"] => Ok(ClinicAction::Cancel {
                appointment_id: self.appointment_id()?,
            }),
            _ => Err(AppError::ValidationFailed(format!(
                "Only one action can be submitted at a time (got {})",
                markers.join(", ")
            ))),
        }
    }
}
