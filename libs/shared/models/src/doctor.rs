use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable key of a directory entry, e.g. `ahsan-khan`.
///
/// Appointment and review rows store this key; the display name is looked up
/// in the [`DoctorDirectory`] when rendering, so renaming a doctor in the
/// directory never splits their ratings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DoctorId(String);

impl DoctorId {
    pub fn new(raw: impl Into<String>) -> Result<Self, DirectoryError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if valid {
            Ok(Self(raw))
        } else {
            Err(DirectoryError::InvalidId(raw))
        }
    }

    /// Derives a key from a display name: "Dr. Sara Malik" becomes `sara-malik`.
    pub fn slugify(name: &str) -> Result<Self, DirectoryError> {
        let words: Vec<String> = name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_ascii_lowercase())
            .collect();

        let words: Vec<&str> = match words.first().map(String::as_str) {
            Some("dr") if words.len() > 1 => words[1..].iter().map(String::as_str).collect(),
            _ => words.iter().map(String::as_str).collect(),
        };

        Self::new(words.join("-"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DoctorId {
    type Error = DirectoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DoctorId> for String {
    fn from(id: DoctorId) -> Self {
        id.0
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub specialization: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("'{0}' is not a valid doctor identifier")]
    InvalidId(String),

    #[error("duplicate doctor in directory: {0}")]
    Duplicate(String),

    #[error("doctor directory is empty")]
    Empty,
}

/// Read-only roster of doctors supplied by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorDirectory {
    doctors: Vec<Doctor>,
}

impl DoctorDirectory {
    pub fn new(doctors: Vec<Doctor>) -> Result<Self, DirectoryError> {
        if doctors.is_empty() {
            return Err(DirectoryError::Empty);
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for doctor in &doctors {
            if !ids.insert(doctor.id.clone()) {
                return Err(DirectoryError::Duplicate(doctor.id.to_string()));
            }
            if !names.insert(doctor.name.trim().to_string()) {
                return Err(DirectoryError::Duplicate(doctor.name.clone()));
            }
        }

        Ok(Self { doctors })
    }

    /// Resolves a client-supplied reference, either an id or an exact display name.
    pub fn resolve(&self, reference: &str) -> Option<&Doctor> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        self.doctors
            .iter()
            .find(|d| d.id.as_str() == reference)
            .or_else(|| self.doctors.iter().find(|d| d.name == reference))
    }

    pub fn get(&self, id: &DoctorId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| &d.id == id)
    }

    /// Display name for rendering; rows left behind by a removed doctor show their raw key.
    pub fn display_name<'a>(&'a self, id: &'a DoctorId) -> &'a str {
        self.get(id).map(|d| d.name.as_str()).unwrap_or(id.as_str())
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }

    /// The clinic's listed doctors, used when no directory file is configured.
    pub fn builtin() -> Self {
        let roster = [
            ("ahsan-khan", "Dr. Ahsan Khan", "Cardiologist"),
            ("sara-malik", "Dr. Sara Malik", "Dermatologist"),
            ("bilal-ahmed", "Dr. Bilal Ahmed", "Neurologist"),
            ("ayesha-siddiqui", "Dr. Ayesha Siddiqui", "Pediatrician"),
            ("usman-tariq", "Dr. Usman Tariq", "Orthopedic Surgeon"),
            ("fatima-noor", "Dr. Fatima Noor", "Gynecologist"),
            ("hamza-raza", "Dr. Hamza Raza", "General Physician"),
            ("zainab-ali", "Dr. Zainab Ali", "ENT Specialist"),
        ];

        Self {
            doctors: roster
                .into_iter()
                .map(|(id, name, specialization)| Doctor {
                    id: DoctorId(id.to_string()),
                    name: name.to_string(),
                    specialization: specialization.to_string(),
                })
                .collect(),
        }
    }
}
