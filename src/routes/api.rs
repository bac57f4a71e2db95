// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for signed-in users.

use crate::error::{AppError, Result};
use crate::middleware::{SessionUser, ValidJson};
use crate::models::profile::GOAL_OPTIONS;
use crate::models::{Activity, ActivityType, Profile, Visibility};
use crate::views::{
    build_athletes, build_dashboard, build_feed, build_leaderboard, build_profile, AthletesView,
    DashboardView, EditProfileForm, FeedView, LeaderboardView, ProfileView, RecordActivityForm,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// API routes (require a signed-in session).
/// The session middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/feed", get(get_feed))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/athletes", get(get_athletes))
        .route("/api/options", get(get_options))
        .route("/api/profile", get(get_own_profile).put(update_profile))
        .route("/api/profile/{id}", get(get_profile))
        .route(
            "/api/activities",
            get(get_activities).post(create_activity),
        )
        .route(
            "/api/activities/{id}",
            put(update_activity).delete(delete_activity),
        )
}

// ─── Feed & Dashboard ────────────────────────────────────────

async fn get_feed(State(state): State<Arc<AppState>>) -> Result<Json<FeedView>> {
    let rows = state.activities.load_public_activities().await?;
    Ok(Json(build_feed(&rows, Utc::now())))
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardView>> {
    let rows = state.activities.load_user_activities().await?;
    Ok(Json(build_dashboard(&rows, Utc::now())))
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    /// Only count activities of this type
    #[serde(rename = "type")]
    activity_type: Option<ActivityType>,
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardView>> {
    let rows = state.activities.load_public_activities().await?;
    Ok(Json(build_leaderboard(&rows, params.activity_type)))
}

// ─── Athletes & Profiles ─────────────────────────────────────

#[derive(Deserialize)]
struct AthletesQuery {
    search: Option<String>,
}

async fn get_athletes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AthletesQuery>,
) -> Result<Json<AthletesView>> {
    let profiles = state.profiles.load_public_profiles().await?;
    Ok(Json(build_athletes(&profiles, params.search.as_deref())))
}

async fn get_own_profile(
    State(state): State<Arc<AppState>>,
    Extension(SessionUser(user)): Extension<SessionUser>,
) -> Result<Json<ProfileView>> {
    let (profile, activities) = tokio::try_join!(
        state.profiles.load_profile(),
        state.activities.load_user_activities()
    )?;
    Ok(Json(build_profile(
        &profile,
        &activities,
        Some(&user),
        Utc::now(),
    )))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>> {
    let profile = state.profiles.fetch_profile(id).await?;
    if profile.id != user.id
        && profile.privacy_settings.profile_visibility == Visibility::Private
    {
        return Err(AppError::NotFound(format!("Profile {}", id)));
    }

    let activities = state.activities.fetch_user_activities(id).await?;
    Ok(Json(build_profile(
        &profile,
        &activities,
        Some(&user),
        Utc::now(),
    )))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    ValidJson(form): ValidJson<EditProfileForm>,
) -> Result<Json<Profile>> {
    let update = form.into_update()?;
    let profile = state.profiles.update_profile(&update).await?;
    Ok(Json(profile))
}

/// Choices offered by the record-activity and edit-profile forms.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OptionsResponse {
    pub activity_types: Vec<ActivityTypeOption>,
    pub goals: Vec<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityTypeOption {
    pub value: String,
    pub label: String,
}

async fn get_options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        activity_types: ActivityType::ALL
            .iter()
            .map(|t| ActivityTypeOption {
                value: t.as_str().to_string(),
                label: t.label().to_string(),
            })
            .collect(),
        goals: GOAL_OPTIONS.iter().map(|g| g.to_string()).collect(),
    })
}

// ─── Activities ──────────────────────────────────────────────

async fn get_activities(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Activity>>> {
    Ok(Json(state.activities.load_user_activities().await?))
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    ValidJson(form): ValidJson<RecordActivityForm>,
) -> Result<(StatusCode, Json<Activity>)> {
    let draft = form.into_draft()?;
    let activity = state.activities.create(draft).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidJson(form): ValidJson<RecordActivityForm>,
) -> Result<Json<Activity>> {
    let update = form.into_update()?;
    Ok(Json(state.activities.update(id, &update).await?))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.activities.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
