use std::sync::Arc;

use shared_database::ClinicStore;
use shared_models::DoctorDirectory;

/// Shared router state: the store handle and the doctor roster.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClinicStore>,
    pub directory: Arc<DoctorDirectory>,
}

impl AppState {
    pub fn new(store: Arc<dyn ClinicStore>, directory: Arc<DoctorDirectory>) -> Self {
        Self { store, directory }
    }
}
