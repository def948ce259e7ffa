use serde::{Deserialize, Serialize};

use shared_models::Doctor;

/// One entry of a directory file. `id` is derived from the name when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(alias = "specialty")]
    pub specialization: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorListQuery {
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorListResponse {
    pub doctors: Vec<Doctor>,
    pub total: usize,
}
