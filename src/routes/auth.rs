// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::ValidJson;
use crate::models::Identity;
use crate::views::{SignInForm, SignUpForm};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", get(get_session))
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signout", post(sign_out))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            email: identity.email.clone(),
            first_name: identity.user_metadata.first_name.clone(),
            last_name: identity.user_metadata.last_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    /// False while the initial session lookup is still running.
    pub resolved: bool,
    pub authenticated: bool,
    pub user: Option<UserResponse>,
}

/// Current session. Never blocks; the shell polls until `resolved`.
async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let session = state.session.snapshot();
    Json(SessionResponse {
        resolved: session.resolved,
        authenticated: session.is_authenticated(),
        user: session.identity.as_ref().map(UserResponse::from),
    })
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidJson(form): ValidJson<SignUpForm>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let identity = state.session.sign_up(&form).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&identity))))
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    ValidJson(form): ValidJson<SignInForm>,
) -> Result<Json<UserResponse>> {
    let identity = state.session.sign_in(&form).await?;
    Ok(Json(UserResponse::from(&identity)))
}

/// End the session and drop the signed-in user's cached rows.
async fn sign_out(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    let result = state.session.sign_out().await;

    state.activities.clear_user().await;
    state.profiles.clear().await;

    result?;
    Ok(StatusCode::NO_CONTENT)
}
