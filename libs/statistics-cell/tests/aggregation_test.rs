use std::sync::Arc;

use axum::http::StatusCode;
use tower::ServiceExt;

use appointment_cell::models::BookingForm;
use appointment_cell::services::{AppointmentBookingService, AppointmentLifecycleService};
use review_cell::models::{RatingInput, ReviewForm};
use review_cell::services::ReviewService;
use shared_models::AppointmentId;
use shared_utils::test_utils::{get_request, read_json, test_state};
use shared_utils::AppState;
use statistics_cell::router::{rating_routes, statistics_routes};

async fn book(state: &Arc<AppState>, name: &str, doctor: &str) -> AppointmentId {
    let form = BookingForm {
        name: name.to_string(),
        phone: "03001234567".to_string(),
        time: "10-11".to_string(),
        doctor: doctor.to_string(),
        notes: None,
    };
    AppointmentBookingService::new(state.store.clone(), state.directory.clone())
        .book(&form)
        .await
        .unwrap()
        .appointment_id
}

async fn review(state: &Arc<AppState>, doctor: &str, rating: i64) {
    let form = ReviewForm {
        doctor: doctor.to_string(),
        reviewer: "Visitor".to_string(),
        rating: Some(RatingInput::Whole(rating)),
        comment: None,
    };
    ReviewService::new(state.store.clone(), state.directory.clone())
        .submit(&form)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_ratings_are_ranked_by_mean() {
    let state = test_state();
    for rating in [3, 4, 5] {
        review(&state, "ahsan-khan", rating).await;
    }
    review(&state, "sara-malik", 5).await;

    let response = rating_routes(state).oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["ratings"][0]["doctor_id"], "sara-malik");
    assert_eq!(body["ratings"][1]["average_rating"], 4.0);
    assert_eq!(body["ratings"][1]["review_count"], 3);
}

#[tokio::test]
async fn test_single_doctor_rating_lookup() {
    let state = test_state();
    review(&state, "hamza-raza", 2).await;

    let app = rating_routes(state);

    let body = read_json(
        app.clone()
            .oneshot(get_request("/hamza-raza"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["average_rating"], 2.0);

    let response = app.clone().oneshot(get_request("/zainab-ali")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get_request("/nobody")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_statistics_count_cancelled_but_not_deleted() {
    let state = test_state();
    let lifecycle = AppointmentLifecycleService::new(state.store.clone());
    book(&state, "Ali", "ahsan-khan").await;
    let cancelled = book(&state, "Sana", "ahsan-khan").await;
    let deleted = book(&state, "Omar", "sara-malik").await;
    lifecycle.cancel(cancelled).await.unwrap();
    lifecycle.delete(deleted).await.unwrap();

    let response = statistics_routes(state).oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total_appointments"], 2);
    assert_eq!(body["active_appointments"], 1);
    assert_eq!(body["cancelled_appointments"], 1);
    assert_eq!(body["total_patients"], 3);
    assert_eq!(body["per_doctor"].as_array().unwrap().len(), 1);
    assert_eq!(body["per_doctor"][0]["doctor_name"], "Dr. Ahsan Khan");
}
