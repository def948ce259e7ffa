use std::sync::Arc;

use axum::http::StatusCode;
use tower::ServiceExt;

use appointment_cell::models::BookingForm;
use appointment_cell::router::appointment_routes;
use appointment_cell::services::{AppointmentBookingService, AppointmentLifecycleService};
use shared_models::AppointmentId;
use shared_utils::test_utils::{get_request, read_json, test_state};
use shared_utils::AppState;

async fn book(state: &Arc<AppState>, name: &str, time: &str, doctor: &str) -> AppointmentId {
    let service = AppointmentBookingService::new(state.store.clone(), state.directory.clone());
    let form = BookingForm {
        name: name.to_string(),
        phone: "03001234567".to_string(),
        time: time.to_string(),
        doctor: doctor.to_string(),
        notes: None,
    };
    service.book(&form).await.unwrap().appointment_id
}

#[tokio::test]
async fn test_list_includes_cancelled_rows_with_labels() {
    let state = test_state();
    let kept = book(&state, "Ali", "9-10", "ahsan-khan").await;
    let cancelled = book(&state, "Sana", "2:00 PM", "sara-malik").await;
    AppointmentLifecycleService::new(state.store.clone())
        .cancel(cancelled)
        .await
        .unwrap();

    let response = appointment_routes(state).oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["appointments"][0]["id"], kept.value());
    assert_eq!(body["appointments"][0]["status"], "active");
    assert_eq!(body["appointments"][0]["doctor_name"], "Dr. Ahsan Khan");
    assert_eq!(body["appointments"][0]["time_range"], "9:00 AM - 10:00 AM");
    assert_eq!(body["appointments"][1]["status"], "cancelled");
    assert_eq!(body["appointments"][1]["allowed_actions"][0], "delete");
}

#[tokio::test]
async fn test_list_filters_by_doctor_and_status() {
    let state = test_state();
    book(&state, "Ali", "9-10", "ahsan-khan").await;
    let second = book(&state, "Sana", "10-11", "ahsan-khan").await;
    book(&state, "Omar", "11-12", "sara-malik").await;
    AppointmentLifecycleService::new(state.store.clone())
        .cancel(second)
        .await
        .unwrap();

    let app = appointment_routes(state);

    let body = read_json(
        app.clone()
            .oneshot(get_request("/?doctor=Dr.%20Ahsan%20Khan"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["total"], 2);

    let body = read_json(
        app.clone()
            .oneshot(get_request("/?doctor=ahsan-khan&status=active"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["appointments"][0]["name"], "Ali");

    let response = app.oneshot(get_request("/?doctor=nobody")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_appointment_by_id() {
    let state = test_state();
    let id = book(&state, "Ali", "3-4", "zainab-ali").await;

    let app = appointment_routes(state);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["time"], "3:00 PM");
    assert_eq!(body["doctor_id"], "zainab-ali");

    let response = app.oneshot(get_request("/9999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
