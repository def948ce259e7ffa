use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{11}$").expect("phone pattern compiles"));

/// Contact number, exactly eleven ASCII digits with no separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, PatientError> {
        if PHONE_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(PatientError::InvalidPhone)
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact details taken from a booking form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientIntake {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatientError {
    #[error("{0}")]
    MissingField(String),

    #[error("Phone number must be exactly 11 digits")]
    InvalidPhone,
}
