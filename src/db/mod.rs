// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hosted backend access.
//!
//! Everything the front end needs from the backend-as-a-service goes through
//! the [`Backend`] trait: auth, the `user_profiles` table and the
//! `activities` table. [`SupabaseBackend`] talks to the real service;
//! [`MemoryBackend`] is an in-process stand-in for tests and offline use.

pub mod memory;
pub mod notify;
pub mod supabase;

pub use memory::MemoryBackend;
pub use notify::{SessionChannel, SessionSubscription};
pub use supabase::SupabaseBackend;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Activity, ActivityUpdate, Identity, NewActivity, Profile, ProfileUpdate, PublicActivity,
    PublicProfile, UserMetadata,
};

/// Table names as constants.
pub mod tables {
    pub const ACTIVITIES: &str = "activities";
    pub const USER_PROFILES: &str = "user_profiles";
}

/// Default row limits used by the stores.
pub mod limits {
    pub const USER_ACTIVITIES: u32 = 10;
    pub const PUBLIC_ACTIVITIES: u32 = 20;
    pub const PUBLIC_PROFILES: u32 = 10;
}

/// Operations the front end performs against the hosted backend.
///
/// Implementations keep the client-side auth session: table calls made
/// after `sign_in` run as the signed-in user.
#[async_trait]
pub trait Backend: Send + Sync {
    // ─── Auth ────────────────────────────────────────────────────

    /// Register a new account with first/last name metadata.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<Identity>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    /// End the current session.
    async fn sign_out(&self) -> Result<()>;

    /// Identity of the current session, if any.
    async fn current_identity(&self) -> Result<Option<Identity>>;

    /// Watch session changes. Dropping the handle unsubscribes.
    fn subscribe_session(&self) -> SessionSubscription;

    // ─── Profiles ────────────────────────────────────────────────

    async fn get_profile(&self, id: Uuid) -> Result<Profile>;

    /// Apply a partial update and return the stored row.
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<Profile>;

    /// Profiles whose `profile_visibility` is public.
    async fn public_profiles(&self, limit: u32) -> Result<Vec<PublicProfile>>;

    // ─── Activities ──────────────────────────────────────────────

    async fn insert_activity(&self, activity: &NewActivity) -> Result<Activity>;

    /// A user's activities, newest first.
    async fn user_activities(&self, user_id: Uuid, limit: u32) -> Result<Vec<Activity>>;

    /// Public activities joined with their owner's display fields, newest first.
    async fn public_activities(&self, limit: u32) -> Result<Vec<PublicActivity>>;

    async fn update_activity(&self, id: Uuid, update: &ActivityUpdate) -> Result<Activity>;

    async fn delete_activity(&self, id: Uuid) -> Result<()>;
}
