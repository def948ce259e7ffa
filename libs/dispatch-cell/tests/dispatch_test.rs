use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use rusqlite::Connection;
use serde_json::json;
use tower::ServiceExt;

use dispatch_cell::router::dispatch_routes;
use shared_database::sqlite::apply_schema;
use shared_database::SqliteStore;
use shared_models::DoctorId;
use shared_utils::test_utils::{json_request, read_json, test_state, test_state_with_store, TestForms};
use statistics_cell::services::RatingAggregator;

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/form")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn booking(phone: &str) -> serde_json::Value {
    let mut form = TestForms::booking("Ali", phone, "9\u{2013}10", "Dr. Ahsan Khan");
    form["action"] = json!("book");
    form
}

#[tokio::test]
async fn test_booking_creates_patient_and_active_appointment() {
    let state = test_state();
    let app = dispatch_routes(state.clone());

    let response = app
        .oneshot(json_request(Method::POST, "/", &booking("03001234567")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "success");
    assert!(body["message"].as_str().unwrap().contains("Dr. Ahsan Khan"));

    assert_eq!(state.store.count_patients().await.unwrap(), 1);
    let appointments = state.store.list_appointments().await.unwrap();
    assert_eq!(appointments.len(), 1);
    assert!(appointments[0].active);
    assert_eq!(appointments[0].doctor_id.as_str(), "ahsan-khan");
    assert_eq!(appointments[0].time.short_label(), "9-10");
}

#[tokio::test]
async fn test_invalid_phone_preserves_input_and_writes_nothing() {
    let state = test_state();
    let app = dispatch_routes(state.clone());

    let response = app
        .oneshot(json_request(Method::POST, "/", &booking("12345")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["preserved_input"]["phone"], "12345");
    assert_eq!(body["preserved_input"]["name"], "Ali");

    assert_eq!(state.store.count_patients().await.unwrap(), 0);
    assert!(state.store.list_appointments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_review_updates_the_doctor_rating() {
    let state = test_state();
    let app = dispatch_routes(state.clone());
    let ratings = RatingAggregator::new(state.store.clone(), state.directory.clone());
    let sara = state.directory.get(&DoctorId::new("sara-malik").unwrap()).unwrap().clone();

    let mut first = TestForms::review("Dr. Sara Malik", "Hina", 3);
    first["action"] = json!("review");
    app.clone()
        .oneshot(json_request(Method::POST, "/", &first))
        .await
        .unwrap();
    let before = ratings.rating_for(&sara).await.unwrap().unwrap();

    let mut review = TestForms::review("Dr. Sara Malik", "Bob", 5);
    review["action"] = json!("review");
    let response = app
        .oneshot(json_request(Method::POST, "/", &review))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let after = ratings.rating_for(&sara).await.unwrap().unwrap();
    assert_eq!(after.review_count, before.review_count + 1);
    assert_eq!(after.average_rating, 4.0);
}

#[tokio::test]
async fn test_out_of_range_rating_is_rejected() {
    let state = test_state();
    let mut review = TestForms::review("sara-malik", "Bob", 6);
    review["action"] = json!("review");

    let response = dispatch_routes(state.clone())
        .oneshot(json_request(Method::POST, "/", &review))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.store.review_tallies().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_twice_succeeds_and_stays_cancelled() {
    let state = test_state();
    let app = dispatch_routes(state.clone());
    app.clone()
        .oneshot(json_request(Method::POST, "/", &booking("03001234567")))
        .await
        .unwrap();
    let id = state.store.list_appointments().await.unwrap()[0].id;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/",
                &json!({"action": "cancel", "appointment_id": id.value()}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert!(!state.store.get_appointment(id).await.unwrap().unwrap().active);
}

#[tokio::test]
async fn test_update_with_unknown_slot_is_rejected() {
    let state = test_state();
    let app = dispatch_routes(state.clone());
    app.clone()
        .oneshot(json_request(Method::POST, "/", &booking("03001234567")))
        .await
        .unwrap();
    let id = state.store.list_appointments().await.unwrap()[0].id;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/",
            &json!({"action": "update", "appointment_id": id.value(), "time": "12-1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert!(body.get("preserved_input").is_none());
}

#[tokio::test]
async fn test_failed_booking_leaves_no_orphan_patient() {
    let conn = Connection::open_in_memory().unwrap();
    apply_schema(&conn).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_appointments BEFORE INSERT ON appointments
         BEGIN SELECT RAISE(ABORT, 'no appointments today'); END;",
    )
    .unwrap();
    let state = test_state_with_store(Arc::new(SqliteStore::from_connection(conn).unwrap()));

    let response = dispatch_routes(state.clone())
        .oneshot(json_request(Method::POST, "/", &booking("03001234567")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert!(!body["message"].as_str().unwrap().contains("no appointments today"));
    assert_eq!(state.store.count_patients().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_action_is_reported_as_outcome() {
    let response = dispatch_routes(test_state())
        .oneshot(json_request(Method::POST, "/", &json!({"action": "reschedule"})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    let body = read_json(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_legacy_form_books_when_no_marker_is_set() {
    let state = test_state();

    let response = dispatch_routes(state.clone())
        .oneshot(form_request(
            "name=Ali&phone=03001234567&time=3-4&doctor=zainab-ali&notes=",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let appointments = state.store.list_appointments().await.unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].doctor_id.as_str(), "zainab-ali");
}

#[tokio::test]
async fn test_legacy_form_rejects_two_markers() {
    let state = test_state();
    let app = dispatch_routes(state.clone());
    app.clone()
        .oneshot(json_request(Method::POST, "/", &booking("03001234567")))
        .await
        .unwrap();
    let id = state.store.list_appointments().await.unwrap()[0].id;

    let response = app
        .oneshot(form_request(&format!(
            "delete=1&cancel=1&appointment_id={}",
            id
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let stored = state.store.get_appointment(id).await.unwrap().unwrap();
    assert!(stored.active);
}

#[tokio::test]
async fn test_legacy_review_marker_submits_review() {
    let state = test_state();

    let response = dispatch_routes(state.clone())
        .oneshot(form_request(
            "submit_review=1&doctor=Dr.+Sara+Malik&reviewer=Bob&rating=5&comment=Great",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let tallies = state.store.review_tallies().await.unwrap();
    assert_eq!(tallies.len(), 1);
    assert_eq!(tallies[0].rating_total, 5);
}
