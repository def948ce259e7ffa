use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use shared_models::{AppointmentId, DoctorId, PatientId, ReviewId, TimeSlot};

use crate::error::DatabaseError;
use crate::rows::{
    AppointmentRecord, AppointmentTally, BookingReceipt, NewAppointment, NewPatient, NewReview,
    ReviewRecord, ReviewTally,
};
use crate::store::ClinicStore;

pub const SCHEMA: &str = include_str!("../sql/sqlite_schema.sql");

/// Creates the clinic tables if they are missing.
pub fn apply_schema(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Embedded store. A single connection is shared behind a mutex and every
/// call runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        info!("Opening sqlite store at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        apply_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| DatabaseError::Unavailable("sqlite connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| DatabaseError::Unavailable(format!("sqlite task failed: {}", e)))?
    }
}

fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<PatientId, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, phone, notes) VALUES (?1, ?2, ?3)",
        params![patient.name, patient.phone, patient.notes],
    )?;
    Ok(PatientId(conn.last_insert_rowid()))
}

fn insert_appointment(
    conn: &Connection,
    patient_id: PatientId,
    appointment: &NewAppointment,
) -> Result<AppointmentId, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (name, phone, time, doctor_id, patient_id, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        params![
            appointment.name,
            appointment.phone,
            appointment.time.label(),
            appointment.doctor_id.as_str(),
            patient_id.value(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(AppointmentId(conn.last_insert_rowid()))
}

fn book_in_transaction(
    conn: &mut Connection,
    patient: &NewPatient,
    appointment: &NewAppointment,
) -> Result<BookingReceipt, DatabaseError> {
    // Dropping `tx` before commit rolls back, so an early `?` discards the patient row too.
    let tx = conn.transaction()?;
    let patient_id = insert_patient(&tx, patient)?;

    match insert_appointment(&tx, patient_id, appointment) {
        Ok(appointment_id) => {
            tx.commit()?;
            Ok(BookingReceipt {
                patient_id,
                appointment_id,
            })
        }
        Err(e) => {
            warn!("Appointment insert failed, rolling back patient {}: {}", patient_id, e);
            if let Err(rollback_err) = tx.rollback() {
                warn!("Rollback of patient {} also failed: {}", patient_id, rollback_err);
            }
            Err(e)
        }
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Decode {
            column: "created_at",
            reason: e.to_string(),
        })
}

fn parse_doctor_id(raw: String) -> Result<DoctorId, DatabaseError> {
    DoctorId::new(raw).map_err(|e| DatabaseError::Decode {
        column: "doctor_id",
        reason: e.to_string(),
    })
}

// Internal row type; text columns are decoded into domain types after the
// rusqlite borrow ends.
struct AppointmentRow {
    id: i64,
    name: String,
    phone: String,
    time: String,
    doctor_id: String,
    patient_id: i64,
    active: i64,
    created_at: String,
}

const APPOINTMENT_COLUMNS: &str =
    "id, name, phone, time, doctor_id, patient_id, active, created_at";

fn read_appointment_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        time: row.get(3)?,
        doctor_id: row.get(4)?,
        patient_id: row.get(5)?,
        active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<AppointmentRecord, DatabaseError> {
    Ok(AppointmentRecord {
        id: AppointmentId(row.id),
        name: row.name,
        phone: row.phone,
        time: row.time.parse::<TimeSlot>().map_err(|e| DatabaseError::Decode {
            column: "time",
            reason: e.to_string(),
        })?,
        doctor_id: parse_doctor_id(row.doctor_id)?,
        patient_id: PatientId(row.patient_id),
        active: row.active != 0,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

struct ReviewRow {
    id: i64,
    doctor_id: String,
    patient_name: String,
    rating: i64,
    text: Option<String>,
    created_at: String,
}

const REVIEW_COLUMNS: &str = "id, doctor_id, patient_name, rating, text, created_at";

fn read_review_row(row: &Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient_name: row.get(2)?,
        rating: row.get(3)?,
        text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn review_from_row(row: ReviewRow) -> Result<ReviewRecord, DatabaseError> {
    Ok(ReviewRecord {
        id: ReviewId(row.id),
        doctor_id: parse_doctor_id(row.doctor_id)?,
        patient_name: row.patient_name,
        rating: u8::try_from(row.rating).map_err(|e| DatabaseError::Decode {
            column: "rating",
            reason: e.to_string(),
        })?,
        text: row.text,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

#[async_trait]
impl ClinicStore for SqliteStore {
    async fn book_appointment(
        &self,
        patient: &NewPatient,
        appointment: &NewAppointment,
    ) -> Result<BookingReceipt, DatabaseError> {
        let patient = patient.clone();
        let appointment = appointment.clone();
        self.with_conn(move |conn| book_in_transaction(conn, &patient, &appointment))
            .await
    }

    async fn update_appointment_time(
        &self,
        id: AppointmentId,
        time: TimeSlot,
    ) -> Result<u64, DatabaseError> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE appointments SET time = ?1 WHERE id = ?2",
                params![time.label(), id.value()],
            )?;
            Ok(changed as u64)
        })
        .await
    }

    async fn cancel_appointment(&self, id: AppointmentId) -> Result<u64, DatabaseError> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE appointments SET active = 0 WHERE id = ?1",
                params![id.value()],
            )?;
            Ok(changed as u64)
        })
        .await
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<u64, DatabaseError> {
        self.with_conn(move |conn| {
            let changed =
                conn.execute("DELETE FROM appointments WHERE id = ?1", params![id.value()])?;
            Ok(changed as u64)
        })
        .await
    }

    async fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<AppointmentRecord>, DatabaseError> {
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM appointments WHERE id = ?1", APPOINTMENT_COLUMNS),
                    params![id.value()],
                    read_appointment_row,
                )
                .optional()?;
            row.map(appointment_from_row).transpose()
        })
        .await
    }

    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, DatabaseError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM appointments ORDER BY id ASC",
                APPOINTMENT_COLUMNS
            ))?;
            let rows = stmt
                .query_map([], read_appointment_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(appointment_from_row).collect()
        })
        .await
    }

    async fn insert_review(&self, review: &NewReview) -> Result<ReviewRecord, DatabaseError> {
        let review = review.clone();
        self.with_conn(move |conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO reviews (doctor_id, patient_name, rating, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    review.doctor_id.as_str(),
                    review.patient_name,
                    review.rating,
                    review.text,
                    created_at.to_rfc3339(),
                ],
            )?;
            let id = ReviewId(conn.last_insert_rowid());
            debug!("Stored review {} for {}", id, review.doctor_id);

            Ok(ReviewRecord {
                id,
                doctor_id: review.doctor_id,
                patient_name: review.patient_name,
                rating: review.rating,
                text: review.text,
                created_at,
            })
        })
        .await
    }

    async fn list_reviews(
        &self,
        doctor: Option<&DoctorId>,
    ) -> Result<Vec<ReviewRecord>, DatabaseError> {
        let doctor = doctor.cloned();
        self.with_conn(move |conn| {
            let rows = match &doctor {
                Some(doctor_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM reviews WHERE doctor_id = ?1 ORDER BY id DESC",
                        REVIEW_COLUMNS
                    ))?;
                    let rows = stmt
                        .query_map(params![doctor_id.as_str()], read_review_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM reviews ORDER BY id DESC",
                        REVIEW_COLUMNS
                    ))?;
                    let rows = stmt
                        .query_map([], read_review_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
            };
            rows.into_iter().map(review_from_row).collect()
        })
        .await
    }

    async fn review_tallies(&self) -> Result<Vec<ReviewTally>, DatabaseError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT doctor_id, COUNT(*), SUM(rating) FROM reviews GROUP BY doctor_id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(doctor_id, review_count, rating_total)| {
                    Ok(ReviewTally {
                        doctor_id: parse_doctor_id(doctor_id)?,
                        review_count,
                        rating_total,
                    })
                })
                .collect()
        })
        .await
    }

    async fn appointment_tallies(&self) -> Result<Vec<AppointmentTally>, DatabaseError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT doctor_id, COUNT(*), SUM(CASE WHEN active <> 0 THEN 1 ELSE 0 END)
                 FROM appointments GROUP BY doctor_id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(doctor_id, total, active)| {
                    Ok(AppointmentTally {
                        doctor_id: parse_doctor_id(doctor_id)?,
                        total,
                        active,
                    })
                })
                .collect()
        })
        .await
    }

    async fn count_patients(&self) -> Result<i64, DatabaseError> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn patient(name: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            phone: "03001234567".to_string(),
            notes: None,
        }
    }

    fn appointment(name: &str, doctor: &str) -> NewAppointment {
        NewAppointment {
            name: name.to_string(),
            phone: "03001234567".to_string(),
            time: TimeSlot::NineToTen,
            doctor_id: DoctorId::new(doctor).unwrap(),
        }
    }

    #[tokio::test]
    async fn booking_commits_patient_and_appointment_together() {
        let store = SqliteStore::open_in_memory().unwrap();

        let receipt = store
            .book_appointment(&patient("Ali"), &appointment("Ali", "ahsan-khan"))
            .await
            .unwrap();

        let stored = store.get_appointment(receipt.appointment_id).await.unwrap().unwrap();
        assert_eq!(stored.patient_id, receipt.patient_id);
        assert!(stored.active);
        assert_eq!(store.count_patients().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_appointment_insert_rolls_back_patient() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_appointments BEFORE INSERT ON appointments
             BEGIN SELECT RAISE(ABORT, 'appointments are read-only'); END;",
        )
        .unwrap();
        let store = SqliteStore::from_connection(conn).unwrap();

        let result = store
            .book_appointment(&patient("Ali"), &appointment("Ali", "ahsan-khan"))
            .await;

        assert_matches!(
            result,
            Err(DatabaseError::Constraint(msg)) if msg.contains("appointments are read-only")
        );
        assert_eq!(store.count_patients().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn single_statement_transitions_report_rows_touched() {
        let store = SqliteStore::open_in_memory().unwrap();
        let receipt = store
            .book_appointment(&patient("Ali"), &appointment("Ali", "ahsan-khan"))
            .await
            .unwrap();
        let id = receipt.appointment_id;

        assert_eq!(store.update_appointment_time(id, TimeSlot::TwoToThree).await.unwrap(), 1);
        assert_eq!(store.cancel_appointment(id).await.unwrap(), 1);

        let stored = store.get_appointment(id).await.unwrap().unwrap();
        assert_eq!(stored.time, TimeSlot::TwoToThree);
        assert!(!stored.active);

        assert_eq!(store.delete_appointment(id).await.unwrap(), 1);
        assert_eq!(store.delete_appointment(id).await.unwrap(), 0);
        assert!(store.get_appointment(id).await.unwrap().is_none());
        // the patient row stays behind
        assert_eq!(store.count_patients().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn tallies_group_by_doctor() {
        let store = SqliteStore::open_in_memory().unwrap();
        for rating in [3u8, 4, 5] {
            store
                .insert_review(&NewReview {
                    doctor_id: DoctorId::new("sara-malik").unwrap(),
                    patient_name: "Bob".to_string(),
                    rating,
                    text: None,
                })
                .await
                .unwrap();
        }

        let tallies = store.review_tallies().await.unwrap();
        assert_eq!(
            tallies,
            vec![ReviewTally {
                doctor_id: DoctorId::new("sara-malik").unwrap(),
                review_count: 3,
                rating_total: 12,
            }]
        );
    }

    #[tokio::test]
    async fn rating_outside_range_is_a_constraint_violation() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store
            .insert_review(&NewReview {
                doctor_id: DoctorId::new("sara-malik").unwrap(),
                patient_name: "Bob".to_string(),
                rating: 6,
                text: None,
            })
            .await;

        assert_matches!(result, Err(DatabaseError::Constraint(_)));
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .book_appointment(&patient("Ali"), &appointment("Ali", "ahsan-khan"))
                .await
                .unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.list_appointments().await.unwrap().len(), 1);
    }
}
