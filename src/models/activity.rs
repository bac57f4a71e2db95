// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity model as stored in the backend `activities` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use super::{double_option, WorkoutDuration};

/// Kind of workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    #[default]
    Run,
    Ride,
    Swim,
    Walk,
    Hike,
    Workout,
    Yoga,
    Crossfit,
    Other,
}

impl ActivityType {
    pub const ALL: [ActivityType; 9] = [
        ActivityType::Run,
        ActivityType::Ride,
        ActivityType::Swim,
        ActivityType::Walk,
        ActivityType::Hike,
        ActivityType::Workout,
        ActivityType::Yoga,
        ActivityType::Crossfit,
        ActivityType::Other,
    ];

    /// Stored value, e.g. `"run"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Run => "run",
            ActivityType::Ride => "ride",
            ActivityType::Swim => "swim",
            ActivityType::Walk => "walk",
            ActivityType::Hike => "hike",
            ActivityType::Workout => "workout",
            ActivityType::Yoga => "yoga",
            ActivityType::Crossfit => "crossfit",
            ActivityType::Other => "other",
        }
    }

    /// Human label shown in the activity picker.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityType::Run => "Run",
            ActivityType::Ride => "Bike Ride",
            ActivityType::Swim => "Swim",
            ActivityType::Walk => "Walk",
            ActivityType::Hike => "Hike",
            ActivityType::Workout => "Workout",
            ActivityType::Yoga => "Yoga",
            ActivityType::Crossfit => "CrossFit",
            ActivityType::Other => "Other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    #[default]
    Public,
    Private,
    Followers,
}

impl PrivacyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyLevel::Public => "public",
            PrivacyLevel::Private => "private",
            PrivacyLevel::Followers => "followers",
        }
    }
}

/// Stored activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    /// Owning profile / auth identity
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    /// Distance in kilometers
    pub distance: f64,
    pub duration: WorkoutDuration,
    /// Elevation gain in meters
    pub elevation_gain: u32,
    pub calories_burned: Option<u32>,
    pub average_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u32>,
    #[serde(default)]
    pub route_data: Option<serde_json::Value>,
    #[serde(default)]
    pub weather_conditions: Option<serde_json::Value>,
    pub privacy_level: PrivacyLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new activity. The backend assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub distance: f64,
    pub duration: WorkoutDuration,
    pub elevation_gain: u32,
    pub calories_burned: Option<u32>,
    pub average_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u32>,
    pub privacy_level: PrivacyLevel,
}

/// New activity before it is attached to the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDraft {
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub distance: f64,
    pub duration: WorkoutDuration,
    pub elevation_gain: u32,
    pub calories_burned: Option<u32>,
    pub average_heart_rate: Option<u32>,
    pub max_heart_rate: Option<u32>,
    pub privacy_level: PrivacyLevel,
}

impl ActivityDraft {
    pub fn into_new_activity(self, user_id: Uuid) -> NewActivity {
        NewActivity {
            user_id,
            activity_type: self.activity_type,
            title: self.title,
            description: self.description,
            distance: self.distance,
            duration: self.duration,
            elevation_gain: self.elevation_gain,
            calories_burned: self.calories_burned,
            average_heart_rate: self.average_heart_rate,
            max_heart_rate: self.max_heart_rate,
            privacy_level: self.privacy_level,
        }
    }
}

/// Partial update; only `Some` fields are sent.
///
/// Nullable columns use `Option<Option<_>>` so a field can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityUpdate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<ActivityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<WorkoutDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<u32>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub calories_burned: Option<Option<u32>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub average_heart_rate: Option<Option<u32>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_heart_rate: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_level: Option<PrivacyLevel>,
}

impl ActivityUpdate {
    /// Apply this update to a stored record.
    pub fn apply_to(&self, activity: &mut Activity) {
        if let Some(t) = self.activity_type {
            activity.activity_type = t;
        }
        if let Some(title) = &self.title {
            activity.title = title.clone();
        }
        if let Some(description) = &self.description {
            activity.description = description.clone();
        }
        if let Some(distance) = self.distance {
            activity.distance = distance;
        }
        if let Some(duration) = self.duration {
            activity.duration = duration;
        }
        if let Some(elevation) = self.elevation_gain {
            activity.elevation_gain = elevation;
        }
        if let Some(calories) = self.calories_burned {
            activity.calories_burned = calories;
        }
        if let Some(avg) = self.average_heart_rate {
            activity.average_heart_rate = avg;
        }
        if let Some(max) = self.max_heart_rate {
            activity.max_heart_rate = max;
        }
        if let Some(privacy) = self.privacy_level {
            activity.privacy_level = privacy;
        }
    }
}

/// Owner display fields joined onto public feed rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityAuthor {
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ActivityAuthor {
    pub fn name(&self) -> String {
        super::profile::display_name(
            self.display_name.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

/// A public feed row: the activity plus its owner's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicActivity {
    #[serde(flatten)]
    pub activity: Activity,
    #[serde(rename = "user_profiles", default)]
    pub author: Option<ActivityAuthor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_deserializes_backend_row() {
        let row = serde_json::json!({
            "id": "6f1c1a2e-0000-4000-8000-000000000001",
            "user_id": "6f1c1a2e-0000-4000-8000-0000000000aa",
            "type": "run",
            "title": "Morning Run",
            "description": null,
            "distance": 8.2,
            "duration": "00:42:18",
            "elevation_gain": 45,
            "calories_burned": null,
            "average_heart_rate": 152,
            "max_heart_rate": null,
            "route_data": null,
            "weather_conditions": null,
            "privacy_level": "public",
            "created_at": "2024-01-15T10:00:00.123456+00:00",
            "updated_at": "2024-01-15T10:00:00+00:00"
        });

        let activity: Activity = serde_json::from_value(row).unwrap();
        assert_eq!(activity.activity_type, ActivityType::Run);
        assert_eq!(activity.duration.minutes(), 42);
        assert_eq!(activity.average_heart_rate, Some(152));
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = ActivityUpdate {
            title: Some("Evening Run".to_string()),
            description: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "title": "Evening Run", "description": null })
        );
    }

    #[test]
    fn test_author_name_fallbacks() {
        let with_display = ActivityAuthor {
            display_name: Some("Speedy".to_string()),
            first_name: Some("Ann".to_string()),
            ..Default::default()
        };
        assert_eq!(with_display.name(), "Speedy");

        let names_only = ActivityAuthor {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            ..Default::default()
        };
        assert_eq!(names_only.name(), "Ann Lee");

        assert_eq!(ActivityAuthor::default().name(), "Unknown User");
    }
}
