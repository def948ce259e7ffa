use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use shared_database::{ClinicStore, NewReview};
use shared_models::DoctorDirectory;
use shared_utils::validation::{optional_text, required, resolve_doctor};

use crate::models::{ReviewError, ReviewForm, ReviewView};

pub struct ReviewService {
    store: Arc<dyn ClinicStore>,
    directory: Arc<DoctorDirectory>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn ClinicStore>, directory: Arc<DoctorDirectory>) -> Self {
        Self { store, directory }
    }

    /// Any failing field rejects the whole submission.
    pub fn validate(&self, form: &ReviewForm) -> Result<NewReview, ReviewError> {
        required(&form.doctor, "Doctor").map_err(ReviewError::MissingField)?;
        let reviewer = required(&form.reviewer, "Your name").map_err(ReviewError::MissingField)?;

        let rating = form
            .rating
            .as_ref()
            .ok_or_else(|| ReviewError::MissingField("Rating is required".to_string()))?
            .to_rating()?;

        let doctor = resolve_doctor(&self.directory, &form.doctor).map_err(ReviewError::UnknownDoctor)?;

        Ok(NewReview {
            doctor_id: doctor.id.clone(),
            patient_name: reviewer.to_string(),
            rating: rating.value(),
            text: optional_text(form.comment.as_deref()),
        })
    }

    #[instrument(skip(self, form), fields(doctor = %form.doctor))]
    pub async fn submit(&self, form: &ReviewForm) -> Result<ReviewView, ReviewError> {
        debug!("Submitting review");

        let review = self.validate(form).map_err(|e| {
            warn!("Review rejected: {}", e);
            e
        })?;

        let record = self.store.insert_review(&review).await.map_err(|e| {
            error!("Failed to store review: {}", e);
            ReviewError::Storage(e)
        })?;

        info!("Stored review {} for {} ({} stars)", record.id, record.doctor_id, record.rating);
        Ok(ReviewView::from_record(record, &self.directory))
    }

    /// Newest first. `doctor` narrows the list to one doctor by id or name.
    pub async fn list(&self, doctor: Option<&str>) -> Result<Vec<ReviewView>, ReviewError> {
        let doctor_id = match doctor.map(str::trim).filter(|d| !d.is_empty()) {
            Some(reference) => Some(
                resolve_doctor(&self.directory, reference)
                    .map_err(ReviewError::UnknownDoctor)?
                    .id
                    .clone(),
            ),
            None => None,
        };

        let records = self.store.list_reviews(doctor_id.as_ref()).await?;
        debug!("Loaded {} reviews", records.len());

        Ok(records
            .into_iter()
            .map(|r| ReviewView::from_record(r, &self.directory))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_database::SqliteStore;

    use crate::models::RatingInput;

    fn service() -> ReviewService {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        ReviewService::new(store, Arc::new(DoctorDirectory::builtin()))
    }

    fn form(doctor: &str, reviewer: &str, rating: i64) -> ReviewForm {
        ReviewForm {
            doctor: doctor.to_string(),
            reviewer: reviewer.to_string(),
            rating: Some(RatingInput::Whole(rating)),
            comment: None,
        }
    }

    #[test]
    fn validates_doctor_reviewer_and_rating() {
        let service = service();

        let review = service.validate(&form("Dr. Sara Malik", " Bob ", 5)).unwrap();
        assert_eq!(review.doctor_id.as_str(), "sara-malik");
        assert_eq!(review.patient_name, "Bob");

        assert_matches!(service.validate(&form("", "Bob", 5)), Err(ReviewError::MissingField(_)));
        assert_matches!(service.validate(&form("sara-malik", "", 5)), Err(ReviewError::MissingField(_)));
        assert_matches!(service.validate(&form("Dr. Who", "Bob", 5)), Err(ReviewError::UnknownDoctor(_)));
        assert_matches!(service.validate(&form("sara-malik", "Bob", 0)), Err(ReviewError::InvalidRating));
        assert_matches!(service.validate(&form("sara-malik", "Bob", 6)), Err(ReviewError::InvalidRating));
    }

    #[test]
    fn missing_rating_is_a_missing_field() {
        let mut review = form("sara-malik", "Bob", 3);
        review.rating = None;
        assert_matches!(
            service().validate(&review),
            Err(ReviewError::MissingField(msg)) if msg == "Rating is required"
        );
    }

    #[tokio::test]
    async fn rejected_reviews_are_not_stored() {
        let service = service();

        assert!(service.submit(&form("sara-malik", "Bob", 6)).await.is_err());
        assert!(service.list(None).await.unwrap().is_empty());
    }
}
