// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod duration;
pub mod profile;
pub mod session;
pub mod stats;

pub use activity::{
    Activity, ActivityAuthor, ActivityDraft, ActivityType, ActivityUpdate, NewActivity,
    PrivacyLevel, PublicActivity,
};
pub use duration::{DurationError, WorkoutDuration};
pub use profile::{
    FitnessLevel, Gender, PrivacySettings, Profile, ProfileUpdate, PublicProfile, Visibility,
};
pub use session::{AuthSession, AuthTokens, Identity, UserMetadata};
pub use stats::DashboardStats;

/// Deserialize a present field (including an explicit `null`) as `Some(..)`.
///
/// Paired with `#[serde(default)]` this distinguishes "absent" from "set to
/// null" in partial updates.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
