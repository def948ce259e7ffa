use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
};
use serde_json::{json, Value};

use shared_config::{AppConfig, DatabaseBackend};
use shared_database::ClinicStore;
use shared_models::DoctorDirectory;

use crate::state::AppState;

pub struct TestConfig {
    pub database_path: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            database_path: ":memory:".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_backend: DatabaseBackend::Sqlite,
            database_path: self.database_path.clone(),
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            doctor_directory_path: None,
            bind_address: "127.0.0.1:0".to_string(),
        }
    }
}

/// Fresh in-memory store with the built-in doctor roster.
pub fn test_state() -> Arc<AppState> {
    let store = shared_database::connect(&TestConfig::default().to_app_config())
        .expect("in-memory sqlite store");
    test_state_with_store(store)
}

pub fn test_state_with_store(store: Arc<dyn ClinicStore>) -> Arc<AppState> {
    Arc::new(AppState::new(store, Arc::new(DoctorDirectory::builtin())))
}

pub struct TestForms;

impl TestForms {
    pub fn booking(name: &str, phone: &str, time: &str, doctor: &str) -> Value {
        json!({
            "name": name,
            "phone": phone,
            "time": time,
            "doctor": doctor,
        })
    }

    pub fn review(doctor: &str, reviewer: &str, rating: i64) -> Value {
        json!({
            "doctor": doctor,
            "reviewer": reviewer,
            "rating": rating,
        })
    }
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid test request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("valid test request")
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable response body");
    serde_json::from_slice(&bytes).expect("json response body")
}
