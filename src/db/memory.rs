// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process backend used by tests and offline runs.
//!
//! Mirrors the hosted service closely enough for the stores: sign-up creates
//! the profile row, table reads are ordered newest first, rows can only be
//! changed by their owner, and public queries honour the privacy columns.
//! Failures and per-call latency can be injected to exercise error paths
//! and overlapping loads.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use super::{Backend, SessionChannel, SessionSubscription};
use crate::error::{AppError, Result};
use crate::models::{
    Activity, ActivityAuthor, ActivityUpdate, Identity, NewActivity, PrivacyLevel,
    PrivacySettings, Profile, ProfileUpdate, PublicActivity, PublicProfile, UserMetadata,
    Visibility,
};

/// Registered account: password and the identity it resolves to.
struct Account {
    password: String,
    identity: Identity,
}

/// In-memory backend.
#[derive(Default)]
pub struct MemoryBackend {
    accounts: DashMap<String, Account>,
    profiles: DashMap<Uuid, Profile>,
    activities: DashMap<Uuid, Activity>,
    session: SessionChannel,
    /// Errors returned by the next calls, in order.
    failures: Mutex<VecDeque<AppError>>,
    /// Delays applied to the next `user_activities` calls, after the read.
    user_activity_delays: Mutex<VecDeque<Duration>>,
    /// Delays applied to the next `get_profile` calls, after the read.
    profile_delays: Mutex<VecDeque<Duration>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next backend call fail with `error`.
    pub fn fail_next(&self, error: AppError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back(error);
        }
    }

    /// Delay the response of the next `user_activities` call.
    ///
    /// The rows are read before sleeping, so a delayed call returns the
    /// state as of when it was issued.
    pub fn delay_next_user_activities(&self, delay: Duration) {
        if let Ok(mut delays) = self.user_activity_delays.lock() {
            delays.push_back(delay);
        }
    }

    /// Delay the response of the next `get_profile` call. The row is read
    /// before sleeping.
    pub fn delay_next_get_profile(&self, delay: Duration) {
        if let Ok(mut delays) = self.profile_delays.lock() {
            delays.push_back(delay);
        }
    }

    /// Insert a profile row directly, bypassing auth.
    pub fn seed_profile(&self, profile: Profile) {
        self.profiles.insert(profile.id, profile);
    }

    /// Insert an activity row directly, bypassing auth.
    pub fn seed_activity(&self, activity: Activity) {
        self.activities.insert(activity.id, activity);
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    /// Number of live session subscriptions.
    pub fn session_subscribers(&self) -> usize {
        self.session.subscriber_count()
    }

    fn take_failure(&self) -> Result<()> {
        let next = self
            .failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.pop_front());
        match next {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn signed_in(&self) -> Result<Identity> {
        self.session.current().ok_or(AppError::Unauthorized)
    }

    fn author_of(&self, user_id: Uuid) -> Option<ActivityAuthor> {
        self.profiles.get(&user_id).map(|p| ActivityAuthor {
            display_name: p.display_name.clone(),
            first_name: Some(p.first_name.clone()),
            last_name: Some(p.last_name.clone()),
            avatar_url: p.avatar_url.clone(),
        })
    }
}

fn pop_delay(delays: &Mutex<VecDeque<Duration>>) -> Option<Duration> {
    delays.lock().ok().and_then(|mut delays| delays.pop_front())
}

fn newest_first(rows: &mut [Activity]) {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<Identity> {
        self.take_failure()?;

        let key = email.trim().to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(AppError::Rejected("User already registered".to_string()));
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            email: Some(key.clone()),
            user_metadata: metadata.clone(),
        };

        let now = Utc::now();
        self.profiles.insert(
            identity.id,
            Profile {
                id: identity.id,
                first_name: metadata.first_name.clone(),
                last_name: metadata.last_name.clone(),
                display_name: None,
                bio: None,
                location: None,
                avatar_url: None,
                date_of_birth: None,
                gender: None,
                height: None,
                weight: None,
                fitness_level: None,
                goals: Vec::new(),
                privacy_settings: PrivacySettings::default(),
                created_at: now,
                updated_at: now,
            },
        );
        self.accounts.insert(
            key,
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );

        tracing::debug!(user_id = %identity.id, "Registered account");
        self.session.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        self.take_failure()?;

        let identity = self
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|account| account.password == password)
            .map(|account| account.identity.clone())
            .ok_or_else(|| AppError::Rejected("Invalid login credentials".to_string()))?;

        self.session.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        // The session ends locally even when the call fails.
        self.session.publish(None);
        self.take_failure()
    }

    async fn current_identity(&self) -> Result<Option<Identity>> {
        self.take_failure()?;
        Ok(self.session.current())
    }

    fn subscribe_session(&self) -> SessionSubscription {
        self.session.subscribe()
    }

    async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        self.take_failure()?;
        let row = self
            .profiles
            .get(&id)
            .map(|p| p.clone())
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", id)));

        if let Some(delay) = pop_delay(&self.profile_delays) {
            tokio::time::sleep(delay).await;
        }
        row
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile> {
        self.take_failure()?;
        let who = self.signed_in()?;
        if who.id != id {
            return Err(AppError::NotFound(format!("Profile {}", id)));
        }

        let mut profile = self
            .profiles
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", id)))?;
        update.apply_to(&mut profile);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn public_profiles(&self, limit: u32) -> Result<Vec<PublicProfile>> {
        self.take_failure()?;
        let mut rows: Vec<Profile> = self
            .profiles
            .iter()
            .filter(|p| p.privacy_settings.profile_visibility == Visibility::Public)
            .map(|p| p.clone())
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(rows
            .iter()
            .take(limit as usize)
            .map(PublicProfile::from)
            .collect())
    }

    async fn insert_activity(&self, activity: &NewActivity) -> Result<Activity> {
        self.take_failure()?;
        let who = self.signed_in()?;
        if who.id != activity.user_id {
            return Err(AppError::Backend(
                "new row violates row-level security policy for table \"activities\"".to_string(),
            ));
        }

        let now = Utc::now();
        let row = Activity {
            id: Uuid::new_v4(),
            user_id: activity.user_id,
            activity_type: activity.activity_type,
            title: activity.title.clone(),
            description: activity.description.clone(),
            distance: activity.distance,
            duration: activity.duration,
            elevation_gain: activity.elevation_gain,
            calories_burned: activity.calories_burned,
            average_heart_rate: activity.average_heart_rate,
            max_heart_rate: activity.max_heart_rate,
            route_data: None,
            weather_conditions: None,
            privacy_level: activity.privacy_level,
            created_at: now,
            updated_at: now,
        };
        self.activities.insert(row.id, row.clone());
        Ok(row)
    }

    async fn user_activities(&self, user_id: Uuid, limit: u32) -> Result<Vec<Activity>> {
        self.take_failure()?;
        let mut rows: Vec<Activity> = self
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.clone())
            .collect();
        newest_first(&mut rows);
        rows.truncate(limit as usize);

        if let Some(delay) = pop_delay(&self.user_activity_delays) {
            tokio::time::sleep(delay).await;
        }

        Ok(rows)
    }

    async fn public_activities(&self, limit: u32) -> Result<Vec<PublicActivity>> {
        self.take_failure()?;
        let mut rows: Vec<Activity> = self
            .activities
            .iter()
            .filter(|a| a.privacy_level == PrivacyLevel::Public)
            .map(|a| a.clone())
            .collect();
        newest_first(&mut rows);
        rows.truncate(limit as usize);

        Ok(rows
            .into_iter()
            .map(|activity| PublicActivity {
                author: self.author_of(activity.user_id),
                activity,
            })
            .collect())
    }

    async fn update_activity(&self, id: Uuid, update: &ActivityUpdate) -> Result<Activity> {
        self.take_failure()?;
        let who = self.signed_in()?;

        let mut row = self
            .activities
            .get_mut(&id)
            .filter(|a| a.user_id == who.id)
            .ok_or_else(|| AppError::NotFound(format!("Activity {}", id)))?;
        update.apply_to(&mut row);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_activity(&self, id: Uuid) -> Result<()> {
        self.take_failure()?;
        let who = self.signed_in()?;

        // Deleting a row that is missing or not ours matches nothing.
        self.activities.remove_if(&id, |_, a| a.user_id == who.id);
        Ok(())
    }
}
