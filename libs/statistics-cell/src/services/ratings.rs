use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use shared_database::{ClinicStore, DatabaseError, ReviewTally};
use shared_models::{Doctor, DoctorDirectory, DoctorId};

use crate::models::DoctorRating;

/// Per-doctor mean ratings, recomputed from the review store on every call.
pub struct RatingAggregator {
    store: Arc<dyn ClinicStore>,
    directory: Arc<DoctorDirectory>,
}

impl RatingAggregator {
    pub fn new(store: Arc<dyn ClinicStore>, directory: Arc<DoctorDirectory>) -> Self {
        Self { store, directory }
    }

    /// Reviewed doctors, best rated first.
    pub async fn ratings(&self) -> Result<Vec<DoctorRating>, DatabaseError> {
        let tallies = self.store.review_tallies().await?;
        let ratings = rank(&self.directory, &tallies);
        debug!("Ranked {} reviewed doctors", ratings.len());
        Ok(ratings)
    }

    /// `None` when the doctor has no reviews.
    pub async fn rating_for(&self, doctor: &Doctor) -> Result<Option<DoctorRating>, DatabaseError> {
        let tallies = self.store.review_tallies().await?;
        Ok(tallies
            .iter()
            .find(|t| t.doctor_id == doctor.id)
            .and_then(|t| rate(doctor, t)))
    }
}

fn rate(doctor: &Doctor, tally: &ReviewTally) -> Option<DoctorRating> {
    if tally.review_count <= 0 {
        return None;
    }

    Some(DoctorRating {
        doctor_id: doctor.id.clone(),
        doctor_name: doctor.name.clone(),
        specialization: doctor.specialization.clone(),
        average_rating: tally.rating_total as f64 / tally.review_count as f64,
        review_count: tally.review_count,
    })
}

/// Joins tallies onto the directory. Doctors without reviews and tallies
/// for ids the directory no longer lists are left out.
pub fn rank(directory: &DoctorDirectory, tallies: &[ReviewTally]) -> Vec<DoctorRating> {
    let by_doctor: HashMap<&DoctorId, &ReviewTally> =
        tallies.iter().map(|t| (&t.doctor_id, t)).collect();

    let mut ratings: Vec<DoctorRating> = directory
        .doctors()
        .iter()
        .filter_map(|doctor| by_doctor.get(&doctor.id).and_then(|t| rate(doctor, t)))
        .collect();

    ratings.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then(b.review_count.cmp(&a.review_count))
            .then_with(|| a.doctor_name.cmp(&b.doctor_name))
    });

    ratings
}
