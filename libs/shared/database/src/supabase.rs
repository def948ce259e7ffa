use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE, RANGE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::{AppointmentId, DoctorId, TimeSlot};

use crate::error::DatabaseError;
use crate::rows::{
    AppointmentRecord, AppointmentTally, BookingReceipt, NewAppointment, NewPatient, NewReview,
    ReviewRecord, ReviewTally,
};
use crate::store::ClinicStore;

/// Rows asked for per request. PostgREST may return fewer when its
/// `max-rows` cap is lower; paging follows the reported total either way.
pub const PAGE_SIZE: u64 = 1000;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| DatabaseError::Unavailable(format!("invalid api key header: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|e| DatabaseError::Unavailable(format!("invalid api key header: {}", e)))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: HeaderMap,
    ) -> Result<reqwest::Response, DatabaseError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers()?;
        headers.extend(extra_headers);

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                409 => DatabaseError::Constraint(error_text),
                502..=504 => DatabaseError::Unavailable(format!("({}) {}", status, error_text)),
                _ => DatabaseError::Remote(format!("({}) {}", status, error_text)),
            });
        }

        Ok(response)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body, HeaderMap::new()).await?;
        Ok(response.json::<T>().await?)
    }

    /// Like [`request`](Self::request) but asks PostgREST to echo the written rows.
    pub async fn request_returning<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let mut prefer = HeaderMap::new();
        prefer.insert("Prefer", HeaderValue::from_static("return=representation"));

        let response = self.send(method, path, body, prefer).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Every row a GET matches, fetched page by page with `Range` until the
    /// `Content-Range` total is reached.
    pub async fn request_all<T>(&self, path: &str) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let mut rows: Vec<T> = Vec::new();

        loop {
            let offset = rows.len() as u64;
            let response = self
                .send(Method::GET, path, None, page_headers(offset)?)
                .await?;
            let total = content_range_total(response.headers());
            let page: Vec<T> = response.json().await?;
            let fetched = page.len() as u64;
            rows.extend(page);

            debug!("Fetched {} rows from {} (total {:?})", rows.len(), path, total);

            let more = match total {
                Some(total) => fetched > 0 && (rows.len() as u64) < total,
                None => fetched == PAGE_SIZE,
            };
            if !more {
                return Ok(rows);
            }
        }
    }

    /// Exact row count from a `HEAD` request; no rows are transferred.
    pub async fn count(&self, path: &str) -> Result<i64, DatabaseError> {
        let mut prefer = HeaderMap::new();
        prefer.insert("Prefer", HeaderValue::from_static("count=exact"));

        let response = self.send(Method::HEAD, path, None, prefer).await?;
        let total = content_range_total(response.headers()).ok_or_else(|| {
            DatabaseError::Remote(format!("count for {} carried no Content-Range total", path))
        })?;

        i64::try_from(total).map_err(|e| DatabaseError::Decode {
            column: "count",
            reason: e.to_string(),
        })
    }
}

fn page_headers(offset: u64) -> Result<HeaderMap, DatabaseError> {
    let range = HeaderValue::from_str(&format!("{}-{}", offset, offset + PAGE_SIZE - 1))
        .map_err(|e| DatabaseError::Remote(format!("invalid range header: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert("Range-Unit", HeaderValue::from_static("items"));
    headers.insert(RANGE, range);
    headers.insert("Prefer", HeaderValue::from_static("count=exact"));
    Ok(headers)
}

/// Total from a `Content-Range` value such as `0-999/1500` or `*/1500`.
/// `None` when the header is missing or the total is `*`.
pub fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)?
        .to_str()
        .ok()?
        .split_once('/')?
        .1
        .trim()
        .parse()
        .ok()
}

/// PostgREST-backed store. Booking goes through the `book_appointment` RPC so
/// both inserts share one server-side transaction.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

#[derive(Deserialize)]
struct IdOnly {
    #[allow(dead_code)]
    id: i64,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn touch_appointment(
        &self,
        method: Method,
        id: AppointmentId,
        body: Option<Value>,
    ) -> Result<u64, DatabaseError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let touched: Vec<IdOnly> = self.supabase.request_returning(method, &path, body).await?;
        Ok(touched.len() as u64)
    }
}

#[async_trait]
impl ClinicStore for SupabaseStore {
    async fn book_appointment(
        &self,
        patient: &NewPatient,
        appointment: &NewAppointment,
    ) -> Result<BookingReceipt, DatabaseError> {
        let body = json!({
            "p_name": patient.name,
            "p_phone": patient.phone,
            "p_notes": patient.notes,
            "p_time": appointment.time.label(),
            "p_doctor_id": appointment.doctor_id,
        });

        self.supabase
            .request(Method::POST, "/rest/v1/rpc/book_appointment", Some(body))
            .await
    }

    async fn update_appointment_time(
        &self,
        id: AppointmentId,
        time: TimeSlot,
    ) -> Result<u64, DatabaseError> {
        self.touch_appointment(Method::PATCH, id, Some(json!({ "time": time.label() })))
            .await
    }

    async fn cancel_appointment(&self, id: AppointmentId) -> Result<u64, DatabaseError> {
        self.touch_appointment(Method::PATCH, id, Some(json!({ "active": false })))
            .await
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<u64, DatabaseError> {
        self.touch_appointment(Method::DELETE, id, None).await
    }

    async fn get_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<AppointmentRecord>, DatabaseError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&select=*", id);
        let rows: Vec<AppointmentRecord> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_appointments(&self) -> Result<Vec<AppointmentRecord>, DatabaseError> {
        self.supabase
            .request_all("/rest/v1/appointments?select=*&order=id.asc")
            .await
    }

    async fn insert_review(&self, review: &NewReview) -> Result<ReviewRecord, DatabaseError> {
        let body = json!({
            "doctor_id": review.doctor_id,
            "patient_name": review.patient_name,
            "rating": review.rating,
            "text": review.text,
        });

        let rows: Vec<ReviewRecord> = self
            .supabase
            .request_returning(Method::POST, "/rest/v1/reviews", Some(body))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DatabaseError::Remote("review insert returned no row".to_string()))
    }

    async fn list_reviews(
        &self,
        doctor: Option<&DoctorId>,
    ) -> Result<Vec<ReviewRecord>, DatabaseError> {
        let path = match doctor {
            Some(doctor_id) => format!(
                "/rest/v1/reviews?select=*&doctor_id=eq.{}&order=id.desc",
                doctor_id
            ),
            None => "/rest/v1/reviews?select=*&order=id.desc".to_string(),
        };

        self.supabase.request_all(&path).await
    }

    async fn review_tallies(&self) -> Result<Vec<ReviewTally>, DatabaseError> {
        self.supabase.request_all("/rest/v1/rpc/review_tallies").await
    }

    async fn appointment_tallies(&self) -> Result<Vec<AppointmentTally>, DatabaseError> {
        self.supabase.request_all("/rest/v1/rpc/appointment_tallies").await
    }

    async fn count_patients(&self) -> Result<i64, DatabaseError> {
        self.supabase.count("/rest/v1/patients?select=id").await
    }
}
