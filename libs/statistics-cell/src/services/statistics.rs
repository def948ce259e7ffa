use std::sync::Arc;

use tracing::debug;

use shared_database::{AppointmentTally, ClinicStore, DatabaseError};
use shared_models::DoctorDirectory;

use crate::models::{ClinicStatistics, DoctorAppointmentCount};

pub struct StatisticsAggregator {
    store: Arc<dyn ClinicStore>,
    directory: Arc<DoctorDirectory>,
}

impl StatisticsAggregator {
    pub fn new(store: Arc<dyn ClinicStore>, directory: Arc<DoctorDirectory>) -> Self {
        Self { store, directory }
    }

    pub async fn compute(&self) -> Result<ClinicStatistics, DatabaseError> {
        let tallies = self.store.appointment_tallies().await?;
        let patients = self.store.count_patients().await?;

        let stats = summarize(&self.directory, &tallies, patients);
        debug!(
            "Computed statistics: {} appointments across {} doctors",
            stats.total_appointments,
            stats.per_doctor.len()
        );
        Ok(stats)
    }
}

/// Per-doctor counts, busiest first. Rows for a doctor missing from the
/// directory are kept under the stored id so totals still add up.
pub fn summarize(
    directory: &DoctorDirectory,
    tallies: &[AppointmentTally],
    total_patients: i64,
) -> ClinicStatistics {
    let mut per_doctor: Vec<DoctorAppointmentCount> = tallies
        .iter()
        .filter(|t| t.total > 0)
        .map(|t| DoctorAppointmentCount {
            doctor_id: t.doctor_id.clone(),
            doctor_name: directory.display_name(&t.doctor_id).to_string(),
            total: t.total,
            active: t.active,
            cancelled: t.total - t.active,
        })
        .collect();

    per_doctor.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.doctor_name.cmp(&b.doctor_name))
    });

    let total_appointments: i64 = per_doctor.iter().map(|d| d.total).sum();
    let active_appointments: i64 = per_doctor.iter().map(|d| d.active).sum();

    ClinicStatistics {
        total_appointments,
        active_appointments,
        cancelled_appointments: total_appointments - active_appointments,
        total_patients,
        per_doctor,
    }
}
