//! Field-level checks shared by the booking and review forms.

use shared_models::{Doctor, DoctorDirectory};

/// Returns the trimmed value, or a message naming the missing field.
pub fn required<'a>(value: &'a str, label: &str) -> Result<&'a str, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{} is required", label))
    } else {
        Ok(trimmed)
    }
}

/// Blank optional text is stored as absent.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn resolve_doctor<'a>(directory: &'a DoctorDirectory, reference: &str) -> Result<&'a Doctor, String> {
    let reference = required(reference, "Doctor")?;
    directory
        .resolve(reference)
        .ok_or_else(|| format!("{} is not listed in the clinic directory", reference))
}
