use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::{Doctor, DoctorDirectory, DoctorId};

use crate::models::DirectoryEntry;

pub struct DirectoryService;

impl DirectoryService {
    /// Loads the roster named by `DOCTOR_DIRECTORY_PATH`, or the built-in one.
    pub fn load(config: &AppConfig) -> Result<DoctorDirectory> {
        match &config.doctor_directory_path {
            Some(path) => Self::from_file(path),
            None => {
                let directory = DoctorDirectory::builtin();
                info!("Using built-in doctor directory ({} doctors)", directory.len());
                Ok(directory)
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<DoctorDirectory> {
        let path = path.as_ref();
        debug!("Reading doctor directory from {}", path.display());

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read doctor directory {}", path.display()))?;
        let entries: Vec<DirectoryEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse doctor directory {}", path.display()))?;

        let directory = Self::from_entries(entries)?;
        info!("Loaded {} doctors from {}", directory.len(), path.display());
        Ok(directory)
    }

    pub fn from_entries(entries: Vec<DirectoryEntry>) -> Result<DoctorDirectory> {
        let doctors = entries
            .into_iter()
            .map(|entry| -> Result<Doctor> {
                let name = entry.name.trim().to_string();
                let id = match entry.id {
                    Some(id) => DoctorId::new(id.trim())?,
                    None => DoctorId::slugify(&name)?,
                };
                Ok(Doctor {
                    id,
                    name,
                    specialization: entry.specialization.trim().to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DoctorDirectory::new(doctors)?)
    }
}
