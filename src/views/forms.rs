// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Form payloads and their conversion into store inputs.
//!
//! Every form is validated before anything is sent to the backend. Blank
//! optional text fields become `null`; blank numeric fields fall back to
//! their column defaults.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::models::{
    ActivityDraft, ActivityType, ActivityUpdate, FitnessLevel, Gender, PrivacyLevel,
    PrivacySettings, Profile, ProfileUpdate, WorkoutDuration,
};

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// `None` for missing or whitespace-only text, trimmed otherwise.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ─── Auth ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(
        custom(function = "not_blank", message = "Email is required"),
        email(message = "Invalid email address")
    )]
    #[serde(default)]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "Password is required"))]
    #[serde(default)]
    pub password: String,
    #[validate(custom(function = "not_blank", message = "First name is required"))]
    #[serde(default)]
    pub first_name: String,
    #[validate(custom(function = "not_blank", message = "Last name is required"))]
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(custom(function = "not_blank", message = "Email is required"))]
    #[serde(default)]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "Password is required"))]
    #[serde(default)]
    pub password: String,
}

// ─── Record activity ─────────────────────────────────────────

/// Record (or edit) an activity.
///
/// Duration comes in as separate hour/minute/second inputs. At least one of
/// them must be filled in; an explicit `0` counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "duration_present"))]
pub struct RecordActivityForm {
    #[serde(rename = "type", default)]
    pub activity_type: ActivityType,
    #[validate(custom(function = "not_blank", message = "Activity title is required"))]
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Distance cannot be negative"))]
    pub distance: Option<f64>,
    pub hours: Option<u32>,
    #[validate(range(max = 59, message = "Minutes must be between 0 and 59"))]
    pub minutes: Option<u32>,
    #[validate(range(max = 59, message = "Seconds must be between 0 and 59"))]
    pub seconds: Option<u32>,
    pub elevation_gain: Option<u32>,
    pub calories_burned: Option<u32>,
    pub average_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u32>,
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
}

fn duration_present(form: &RecordActivityForm) -> std::result::Result<(), ValidationError> {
    if form.hours.is_none() && form.minutes.is_none() && form.seconds.is_none() {
        let mut err = ValidationError::new("duration_required");
        err.message = Some("Duration is required".into());
        return Err(err);
    }
    Ok(())
}

impl RecordActivityForm {
    fn duration(&self) -> Result<WorkoutDuration> {
        Ok(WorkoutDuration::new(
            self.hours.unwrap_or(0),
            self.minutes.unwrap_or(0),
            self.seconds.unwrap_or(0),
        )?)
    }

    /// Validate and convert into a new activity.
    pub fn into_draft(self) -> Result<ActivityDraft> {
        self.validate()?;
        let duration = self.duration()?;

        Ok(ActivityDraft {
            activity_type: self.activity_type,
            title: self.title.trim().to_string(),
            description: blank_to_none(self.description),
            distance: self.distance.unwrap_or(0.0),
            duration,
            elevation_gain: self.elevation_gain.unwrap_or(0),
            calories_burned: self.calories_burned,
            average_heart_rate: self.average_heart_rate,
            max_heart_rate: self.max_heart_rate,
            privacy_level: self.privacy_level,
        })
    }

    /// Validate and convert into an update that rewrites every editable field.
    pub fn into_update(self) -> Result<ActivityUpdate> {
        let draft = self.into_draft()?;

        Ok(ActivityUpdate {
            activity_type: Some(draft.activity_type),
            title: Some(draft.title),
            description: Some(draft.description),
            distance: Some(draft.distance),
            duration: Some(draft.duration),
            elevation_gain: Some(draft.elevation_gain),
            calories_burned: Some(draft.calories_burned),
            average_heart_rate: Some(draft.average_heart_rate),
            max_heart_rate: Some(draft.max_heart_rate),
            privacy_level: Some(draft.privacy_level),
        })
    }
}

// ─── Edit profile ────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EditProfileForm {
    #[validate(custom(function = "not_blank", message = "First name is required"))]
    #[serde(default)]
    pub first_name: String,
    #[validate(custom(function = "not_blank", message = "Last name is required"))]
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub height: Option<u32>,
    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub fitness_level: Option<FitnessLevel>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub privacy_settings: PrivacySettings,
}

impl From<&Profile> for EditProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            display_name: profile.display_name.clone(),
            bio: profile.bio.clone(),
            location: profile.location.clone(),
            avatar_url: profile.avatar_url.clone(),
            date_of_birth: profile.date_of_birth,
            gender: profile.gender,
            height: profile.height,
            weight: profile.weight,
            fitness_level: profile.fitness_level,
            goals: profile.goals.clone(),
            privacy_settings: profile.privacy_settings,
        }
    }
}

impl EditProfileForm {
    /// Validate and convert into an update that rewrites every field.
    pub fn into_update(self) -> Result<ProfileUpdate> {
        self.validate()?;

        let goals: Vec<String> = self
            .goals
            .into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();

        Ok(ProfileUpdate {
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            display_name: Some(blank_to_none(self.display_name)),
            bio: Some(blank_to_none(self.bio)),
            location: Some(blank_to_none(self.location)),
            avatar_url: Some(blank_to_none(self.avatar_url)),
            date_of_birth: Some(self.date_of_birth),
            gender: Some(self.gender),
            height: Some(self.height),
            weight: Some(self.weight),
            fitness_level: Some(self.fitness_level),
            goals: Some((!goals.is_empty()).then_some(goals)),
            privacy_settings: Some(self.privacy_settings),
        })
    }
}
