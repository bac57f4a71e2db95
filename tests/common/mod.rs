// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use stride::config::Config;
use stride::db::MemoryBackend;
use stride::routes::create_router;
use stride::AppState;
use tower::ServiceExt;

/// Create a test app over an in-memory backend, with the initial session
/// lookup already done. Returns the router, the shared state and the backend.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let state = Arc::new(AppState::new(Config::test_default(), backend.clone()));
    state.session.wait_resolved().await;
    (create_router(state.clone()), state, backend)
}

/// Build a request, with a JSON body when `body` is given.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and return the status and decoded JSON body
/// (`Value::Null` for empty bodies).
#[allow(dead_code)]
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Register (and thereby sign in) an account through the API.
#[allow(dead_code)]
pub async fn sign_up(app: &Router, email: &str, first_name: &str, last_name: &str) -> Value {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/auth/signup",
            Some(json!({
                "email": email,
                "password": "secret123",
                "first_name": first_name,
                "last_name": last_name,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);
    body
}

/// Record an activity through the API.
#[allow(dead_code)]
pub async fn record(app: &Router, form: Value) -> Value {
    let (status, body) = send(app, request("POST", "/api/activities", Some(form))).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}
