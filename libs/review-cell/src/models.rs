use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::{DatabaseError, ReviewRecord};
use shared_models::{AppError, DoctorDirectory, DoctorId, ReviewId};

/// Star rating, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ReviewError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ReviewError::InvalidRating)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rating as submitted: JSON clients send numbers, form posts send text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingInput {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

impl RatingInput {
    pub fn to_rating(&self) -> Result<Rating, ReviewError> {
        match self {
            RatingInput::Whole(value) => Rating::new(*value),
            RatingInput::Fractional(_) => Err(ReviewError::InvalidRating),
            RatingInput::Text(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err(ReviewError::MissingField("Rating is required".to_string()));
                }
                raw.parse::<i64>()
                    .map_err(|_| ReviewError::InvalidRating)
                    .and_then(Rating::new)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub reviewer: String,
    #[serde(default)]
    pub rating: Option<RatingInput>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewListQuery {
    pub doctor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
    pub id: ReviewId,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub reviewer: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReviewView {
    pub fn from_record(record: ReviewRecord, directory: &DoctorDirectory) -> Self {
        Self {
            doctor_name: directory.display_name(&record.doctor_id).to_string(),
            id: record.id,
            doctor_id: record.doctor_id,
            reviewer: record.patient_name,
            rating: record.rating,
            comment: record.text,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewView>,
    pub total: usize,
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("{0}")]
    MissingField(String),

    #[error("Rating must be a whole number between 1 and 5")]
    InvalidRating,

    #[error("{0}")]
    UnknownDoctor(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Storage(db) => db.into(),
            other => AppError::ValidationFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn rating_bounds_are_inclusive() {
        assert_eq!(Rating::new(1).unwrap().value(), 1);
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert_matches!(Rating::new(0), Err(ReviewError::InvalidRating));
        assert_matches!(Rating::new(6), Err(ReviewError::InvalidRating));
    }

    #[test]
    fn rating_input_accepts_numbers_and_digit_text() {
        let json: ReviewForm = serde_json::from_str(r#"{"doctor":"x","reviewer":"y","rating":4}"#).unwrap();
        assert_eq!(json.rating.unwrap().to_rating().unwrap().value(), 4);

        assert_eq!(RatingInput::Text(" 3 ".into()).to_rating().unwrap().value(), 3);
        assert_matches!(RatingInput::Text("five".into()).to_rating(), Err(ReviewError::InvalidRating));
        assert_matches!(RatingInput::Fractional(4.5).to_rating(), Err(ReviewError::InvalidRating));
        assert_matches!(RatingInput::Text("".into()).to_rating(), Err(ReviewError::MissingField(_)));
    }
}
