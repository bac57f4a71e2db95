// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the hosted backend (Supabase auth + PostgREST tables).
//!
//! Handles:
//! - Email/password sign-up, sign-in and sign-out against `/auth/v1`
//! - Access token refresh shortly before expiry
//! - Typed table reads and writes against `/rest/v1`
//! - Mapping service error bodies to a single human-readable message

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{tables, Backend, SessionChannel, SessionSubscription};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    Activity, ActivityUpdate, AuthSession, AuthTokens, Identity, NewActivity, Profile,
    ProfileUpdate, PublicActivity, PublicProfile, UserMetadata,
};

/// Margin before token expiration when we proactively refresh (60 seconds).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Embedded owner columns for the public feed.
const PUBLIC_ACTIVITY_SELECT: &str =
    "*,user_profiles!activities_user_id_fkey(display_name,first_name,last_name,avatar_url)";

/// Columns exposed by the public athlete listing.
const PUBLIC_PROFILE_SELECT: &str =
    "id,first_name,last_name,display_name,avatar_url,location,bio,fitness_level";

/// PostgREST media type that returns a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Backend client bound to one project.
pub struct SupabaseBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    /// Current client-side session, if signed in.
    session: RwLock<Option<AuthSession>>,
    /// Serializes token refreshes.
    refresh_lock: Mutex<()>,
    notify: SessionChannel,
}

impl SupabaseBackend {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            notify: SessionChannel::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.supabase_url, &config.supabase_anon_key)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    // ─── Session Management ──────────────────────────────────────────────────

    async fn store_session(&self, session: Option<AuthSession>) {
        let identity = session.as_ref().map(|s| s.identity.clone());
        *self.session.write().await = session;
        self.notify.publish(identity);
    }

    /// Bearer token for table calls: the user's access token when signed in,
    /// otherwise the anon key.
    ///
    /// Refreshes the access token when it is about to expire.
    async fn bearer(&self) -> Result<String> {
        let now = Utc::now();
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);

        let tokens = match self.session.read().await.as_ref() {
            Some(session) => session.tokens.clone(),
            None => return Ok(self.anon_key.clone()),
        };

        if !needs_refresh(&tokens, now, margin) {
            return Ok(tokens.access_token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed while we were waiting.
        let tokens = match self.session.read().await.as_ref() {
            Some(session) => session.tokens.clone(),
            None => return Ok(self.anon_key.clone()),
        };
        if !needs_refresh(&tokens, now, margin) {
            return Ok(tokens.access_token);
        }

        tracing::info!("Access token expiring, refreshing");
        match self.refresh(&tokens.refresh_token).await {
            Ok(session) => {
                let access_token = session.tokens.access_token.clone();
                self.store_session(Some(session)).await;
                Ok(access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.store_session(None).await;
                Err(e)
            }
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let token: TokenResponse = check_response_json(response).await?;
        Ok(token.into_session())
    }

    // ─── Table Helpers ───────────────────────────────────────────────────────

    /// GET rows from a table with PostgREST query parameters.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(params)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer().await?)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        check_response_json(response).await
    }

    /// GET exactly one row.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.table_url(table))
            .query(params)
            .header("apikey", &self.anon_key)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .bearer_auth(self.bearer().await?)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        check_response_json(response).await
    }

    /// Send a write and return the affected row.
    async fn write_returning<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        table: &str,
        params: &[(&str, String)],
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .request(method, self.table_url(table))
            .query(params)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=representation")
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .bearer_auth(self.bearer().await?)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        check_response_json(response).await
    }
}

fn needs_refresh(tokens: &AuthTokens, now: DateTime<Utc>, margin: Duration) -> bool {
    tokens
        .expires_at
        .is_some_and(|expires_at| now + margin >= expires_at)
}

fn pg_eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<Identity> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": metadata,
        });

        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        match check_auth_response_json::<SignUpResponse>(response).await? {
            SignUpResponse::Session(token) => {
                let session = token.into_session();
                let identity = session.identity.clone();
                self.store_session(Some(session)).await;
                tracing::info!(user_id = %identity.id, "Signed up and signed in");
                Ok(identity)
            }
            SignUpResponse::Pending(identity) => {
                // Email confirmation required; no session yet.
                tracing::info!(user_id = %identity.id, "Signed up, awaiting confirmation");
                Ok(identity)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        let session = check_auth_response_json::<TokenResponse>(response)
            .await?
            .into_session();
        let identity = session.identity.clone();
        self.store_session(Some(session)).await;

        tracing::info!(user_id = %identity.id, "Signed in");
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        let access_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.tokens.access_token.clone());

        // Local session is cleared regardless of what the service says.
        self.store_session(None).await;

        let Some(access_token) = access_token else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        check_response(response).await
    }

    async fn current_identity(&self) -> Result<Option<Identity>> {
        if self.session.read().await.is_none() {
            return Ok(None);
        }

        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::info!("Stored session rejected by auth service");
            self.store_session(None).await;
            return Ok(None);
        }

        check_response_json(response).await.map(Some)
    }

    fn subscribe_session(&self) -> SessionSubscription {
        self.notify.subscribe()
    }

    async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        self.select_one(
            tables::USER_PROFILES,
            &[("select", "*".to_string()), ("id", pg_eq(id))],
        )
        .await
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile> {
        self.write_returning(
            reqwest::Method::PATCH,
            tables::USER_PROFILES,
            &[("id", pg_eq(id))],
            update,
        )
        .await
    }

    async fn public_profiles(&self, limit: u32) -> Result<Vec<PublicProfile>> {
        self.select(
            tables::USER_PROFILES,
            &[
                ("select", PUBLIC_PROFILE_SELECT.to_string()),
                ("privacy_settings->>profile_visibility", pg_eq("public")),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn insert_activity(&self, activity: &NewActivity) -> Result<Activity> {
        self.write_returning(reqwest::Method::POST, tables::ACTIVITIES, &[], activity)
            .await
    }

    async fn user_activities(&self, user_id: Uuid, limit: u32) -> Result<Vec<Activity>> {
        self.select(
            tables::ACTIVITIES,
            &[
                ("select", "*".to_string()),
                ("user_id", pg_eq(user_id)),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn public_activities(&self, limit: u32) -> Result<Vec<PublicActivity>> {
        self.select(
            tables::ACTIVITIES,
            &[
                ("select", PUBLIC_ACTIVITY_SELECT.to_string()),
                ("privacy_level", pg_eq("public")),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn update_activity(&self, id: Uuid, update: &ActivityUpdate) -> Result<Activity> {
        self.write_returning(
            reqwest::Method::PATCH,
            tables::ACTIVITIES,
            &[("id", pg_eq(id))],
            update,
        )
        .await
    }

    async fn delete_activity(&self, id: Uuid) -> Result<()> {
        let response = self
            .http
            .delete(self.table_url(tables::ACTIVITIES))
            .query(&[("id", pg_eq(id))])
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer().await?)
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        check_response(response).await
    }
}

// ─── Wire Types ──────────────────────────────────────────────────────────────

/// Session issued by `/auth/v1/token` (and `/signup` when no confirmation
/// is required).
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: Identity,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + Duration::seconds(secs))
            });

        AuthSession {
            identity: self.user,
            tokens: AuthTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
                expires_at,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Pending(Identity),
}

/// Error body shapes used by the auth service and PostgREST.
#[derive(Debug, Default, Deserialize)]
struct ServiceError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ServiceError {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Extract the human-readable message from an error response body.
fn service_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ServiceError>(body)
        .ok()
        .and_then(ServiceError::into_message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, "Backend request failed");
    Err(AppError::Backend(service_error_message(status, &body)))
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "Backend request failed");
        return Err(AppError::Backend(service_error_message(status, &body)));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;
    decode_body(&body)
}

/// Check an auth-service response. Client errors there (wrong password,
/// email already taken) are the user's to fix, not a backend failure.
async fn check_auth_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, "Auth request rejected");
        return Err(AppError::Rejected(service_error_message(status, &body)));
    }
    check_response_json(response).await
}

/// Decode a successful response body. A row that does not match the model
/// (e.g. a duration that is not `HH:MM:SS`) fails the whole response.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JSON parse error: {}", e)))
}
