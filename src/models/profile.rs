// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile stored in the backend `user_profiles` table.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use super::double_option;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
    Elite,
}

impl FitnessLevel {
    pub fn label(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "Beginner",
            FitnessLevel::Intermediate => "Intermediate",
            FitnessLevel::Advanced => "Advanced",
            FitnessLevel::Elite => "Elite",
        }
    }
}

/// Per-aspect visibility setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Stored as a JSON column; missing keys default to public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PrivacySettings {
    #[serde(default)]
    pub profile_visibility: Visibility,
    #[serde(default)]
    pub stats_visibility: Visibility,
    #[serde(default)]
    pub activity_visibility: Visibility,
}

/// Suggested goal labels offered by the edit form.
pub const GOAL_OPTIONS: [&str; 8] = [
    "Lose Weight",
    "Build Muscle",
    "Improve Endurance",
    "Get Stronger",
    "Run a Marathon",
    "Stay Active",
    "Improve Health",
    "Train for Competition",
];

/// User profile row. `id` equals the auth identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    /// Height in centimeters
    pub height: Option<u32>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    pub fitness_level: Option<FitnessLevel>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub goals: Vec<String>,
    #[serde(default)]
    pub privacy_settings: PrivacySettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shown when a user has neither a display name nor a first/last name.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Display name, else "first last", else [`UNKNOWN_USER`]. Blank parts are
/// skipped.
pub fn display_name(display: Option<&str>, first: Option<&str>, last: Option<&str>) -> String {
    if let Some(display) = display.map(str::trim).filter(|d| !d.is_empty()) {
        return display.to_string();
    }

    let full = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if full.is_empty() {
        UNKNOWN_USER.to_string()
    } else {
        full
    }
}

impl Profile {
    pub fn name(&self) -> String {
        display_name(
            self.display_name.as_deref(),
            Some(&self.first_name),
            Some(&self.last_name),
        )
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Columns returned by the public athlete listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub fitness_level: Option<FitnessLevel>,
}

impl PublicProfile {
    pub fn name(&self) -> String {
        display_name(
            self.display_name.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

impl From<&Profile> for PublicProfile {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            first_name: Some(profile.first_name.clone()),
            last_name: Some(profile.last_name.clone()),
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            location: profile.location.clone(),
            bio: profile.bio.clone(),
            fitness_level: profile.fitness_level,
        }
    }
}

/// Partial profile update; only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub bio: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<Option<Gender>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<Option<u32>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub fitness_level: Option<Option<FitnessLevel>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub goals: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_settings: Option<PrivacySettings>,
}

impl ProfileUpdate {
    /// Apply this update to a stored profile.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(v) = &self.first_name {
            profile.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            profile.last_name = v.clone();
        }
        if let Some(v) = &self.display_name {
            profile.display_name = v.clone();
        }
        if let Some(v) = &self.bio {
            profile.bio = v.clone();
        }
        if let Some(v) = &self.location {
            profile.location = v.clone();
        }
        if let Some(v) = &self.avatar_url {
            profile.avatar_url = v.clone();
        }
        if let Some(v) = self.date_of_birth {
            profile.date_of_birth = v;
        }
        if let Some(v) = self.gender {
            profile.gender = v;
        }
        if let Some(v) = self.height {
            profile.height = v;
        }
        if let Some(v) = self.weight {
            profile.weight = v;
        }
        if let Some(v) = self.fitness_level {
            profile.fitness_level = v;
        }
        if let Some(v) = &self.goals {
            profile.goals = v.clone().unwrap_or_default();
        }
        if let Some(v) = self.privacy_settings {
            profile.privacy_settings = v;
        }
    }
}
