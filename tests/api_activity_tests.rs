// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity recording, feed, dashboard and leaderboard tests.

use axum::http::StatusCode;
use serde_json::json;
use stride::error::AppError;

mod common;
use common::{request, send};

fn morning_run() -> serde_json::Value {
    json!({
        "type": "run",
        "title": "Morning Run",
        "distance": 5.0,
        "minutes": 25,
        "elevation_gain": 30,
    })
}

#[tokio::test]
async fn test_recorded_activity_appears_in_feed() {
    let (app, _state, _backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;

    let created = common::record(&app, morning_run()).await;
    assert_eq!(created["duration"], "00:25:00");

    let (status, feed) = send(&app, request("GET", "/api/feed", None)).await;
    assert_eq!(status, StatusCode::OK);

    let card = &feed["activities"][0];
    assert_eq!(card["id"], created["id"]);
    assert_eq!(card["user"]["name"], "Ann Lee");
    assert_eq!(card["duration"], "25:00");
    assert_eq!(card["pace"], "5:00/km");
    assert_eq!(card["timestamp"], "Just now");
    assert!(feed["empty_message"].is_null());
}

#[tokio::test]
async fn test_empty_feed_message() {
    let (app, _state, _backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;

    let (_, feed) = send(&app, request("GET", "/api/feed", None)).await;

    assert_eq!(feed["activities"].as_array().unwrap().len(), 0);
    assert_eq!(
        feed["empty_message"],
        "No activities yet. Be the first to record an activity!"
    );
}

#[tokio::test]
async fn test_private_activity_not_in_feed() {
    let (app, _state, _backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;

    let mut form = morning_run();
    form["privacy_level"] = json!("private");
    common::record(&app, form).await;

    let (_, feed) = send(&app, request("GET", "/api/feed", None)).await;
    assert_eq!(feed["activities"].as_array().unwrap().len(), 0);

    let (_, own) = send(&app, request("GET", "/api/activities", None)).await;
    assert_eq!(own.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_title_never_reaches_backend() {
    let (app, _state, backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;

    let mut form = morning_run();
    form["title"] = json!("   ");
    let (status, body) = send(&app, request("POST", "/api/activities", Some(form))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Activity title is required");
    assert_eq!(backend.activity_count(), 0);
}

#[tokio::test]
async fn test_missing_duration_rejected() {
    let (app, _state, backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/activities",
            Some(json!({"title": "Stretching", "type": "yoga"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Duration is required");
    assert_eq!(backend.activity_count(), 0);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (app, _state, _backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;

    common::record(&app, json!({"title": "Tempo", "distance": 5.0, "minutes": 20})).await;
    common::record(&app, json!({"title": "Easy", "distance": 3.0, "minutes": 15})).await;
    common::record(
        &app,
        json!({"title": "Loop", "type": "ride", "distance": 10.0, "minutes": 30}),
    )
    .await;

    let (status, dashboard) = send(&app, request("GET", "/api/dashboard", None)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(dashboard["stats"]["week_distance"], 18.0);
    assert_eq!(dashboard["stats"]["monthly_activities"], 3);
    assert_eq!(dashboard["stats"]["personal_best"], "4:00/km");
    assert_eq!(dashboard["cards"][1]["value"], "18/100 km");
    assert_eq!(dashboard["recent"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_and_delete_reload_collections() {
    let (app, state, backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;
    let created = common::record(&app, morning_run()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let mut form = morning_run();
    form["title"] = json!("Evening Run");
    let (status, updated) = send(
        &app,
        request("PUT", &format!("/api/activities/{}", id), Some(form)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Evening Run");

    let cached = state.activities.snapshot().await;
    assert_eq!(cached.user_activities[0].title, "Evening Run");
    assert_eq!(cached.public_activities[0].activity.title, "Evening Run");

    let (status, _) = send(&app, request("DELETE", &format!("/api/activities/{}", id), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(backend.activity_count(), 0);

    let cached = state.activities.snapshot().await;
    assert!(cached.user_activities.is_empty());
    assert!(cached.public_activities.is_empty());
}

#[tokio::test]
async fn test_cannot_delete_another_users_activity() {
    let (app, _state, backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;
    let created = common::record(&app, morning_run()).await;
    let id = created["id"].as_str().unwrap().to_string();

    send(&app, request("POST", "/auth/signout", None)).await;
    common::sign_up(&app, "bob@example.com", "Bob", "Ray").await;

    let (status, _) = send(&app, request("DELETE", &format!("/api/activities/{}", id), None)).await;

    // Matches no row of Bob's; Ann's activity survives.
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(backend.activity_count(), 1);
}

#[tokio::test]
async fn test_backend_failure_maps_to_generic_message() {
    let (app, state, backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;

    backend.fail_next(AppError::Network("connection reset".to_string()));
    let (status, body) = send(&app, request("GET", "/api/feed", None)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "request_failed");
    assert_eq!(body["details"], "Failed to load public activities");
    assert_eq!(
        state.activities.snapshot().await.error.as_deref(),
        Some("Failed to load public activities")
    );
}

#[tokio::test]
async fn test_leaderboard_ranks_and_filters() {
    let (app, _state, _backend) = common::create_test_app().await;
    common::sign_up(&app, "ann@example.com", "Ann", "Lee").await;
    common::record(&app, morning_run()).await;
    send(&app, request("POST", "/auth/signout", None)).await;

    common::sign_up(&app, "bob@example.com", "Bob", "Ray").await;
    common::record(
        &app,
        json!({"title": "Long Ride", "type": "ride", "distance": 40.0, "hours": 2}),
    )
    .await;

    let (_, board) = send(&app, request("GET", "/api/leaderboard", None)).await;
    assert_eq!(board["entries"][0]["name"], "Bob Ray");
    assert_eq!(board["entries"][1]["name"], "Ann Lee");

    let (_, runs) = send(&app, request("GET", "/api/leaderboard?type=run", None)).await;
    let entries = runs["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Ann Lee");
    assert_eq!(entries[0]["rank"], 1);
}
