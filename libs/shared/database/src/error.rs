use rusqlite::ErrorCode;
use thiserror::Error;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("sqlite error: {0}")]
    Sqlite(String),

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to decode {column}: {reason}")]
    Decode { column: &'static str, reason: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => DatabaseError::Constraint(e.to_string()),
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                DatabaseError::Unavailable(e.to_string())
            }
            _ => DatabaseError::Sqlite(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for DatabaseError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DatabaseError::Decode {
                column: "response body",
                reason: e.to_string(),
            }
        } else {
            DatabaseError::Unavailable(e.to_string())
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::Constraint(detail) => AppError::Conflict(detail),
            other => AppError::Unavailable(other.to_string()),
        }
    }
}
