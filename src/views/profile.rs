// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete profile page.

use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::format::round_one_decimal;
use crate::models::stats::year_to_date;
use crate::models::{Activity, Identity, PrivacyLevel, Profile, Visibility};

use super::dashboard::{build_dashboard, RecentActivity};
use super::forms::EditProfileForm;
use super::DEFAULT_AVATAR_URL;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileStat {
    pub label: String,
    pub value: String,
    pub period: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub fitness_level: Option<String>,
    pub goals: Vec<String>,
    /// e.g. "Joined March 2024"
    pub joined: String,
    pub is_own: bool,
    /// Hidden from other viewers when stats are private.
    pub stats: Option<Vec<ProfileStat>>,
    pub recent: Vec<RecentActivity>,
    /// Pre-filled edit form, own profile only.
    pub edit_form: Option<EditProfileForm>,
}

/// Build a profile page for `viewer`.
///
/// `activities` are the profile owner's activities, newest first. Other
/// viewers only see public activities, and no stats when the owner keeps
/// them private.
pub fn build_profile(
    profile: &Profile,
    activities: &[Activity],
    viewer: Option<&Identity>,
    now: DateTime<Utc>,
) -> ProfileView {
    let is_own = viewer.is_some_and(|v| v.id == profile.id);
    let settings = &profile.privacy_settings;

    let visible: Vec<Activity> = if is_own {
        activities.to_vec()
    } else if settings.activity_visibility == Visibility::Public {
        activities
            .iter()
            .filter(|a| a.privacy_level == PrivacyLevel::Public)
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    let stats = (is_own || settings.stats_visibility == Visibility::Public).then(|| {
        let total: f64 = visible.iter().map(|a| a.distance).sum();
        let (_, this_year) = year_to_date(&visible, now);
        vec![
            ProfileStat {
                label: "Total Distance".to_string(),
                value: format!("{} km", round_one_decimal(total)),
                period: "All Time".to_string(),
            },
            ProfileStat {
                label: "Activities".to_string(),
                value: this_year.to_string(),
                period: "This Year".to_string(),
            },
        ]
    });

    ProfileView {
        id: profile.id.to_string(),
        name: profile.name(),
        avatar: profile
            .avatar_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
        location: profile.location.clone(),
        bio: profile.bio.clone(),
        fitness_level: profile.fitness_level.map(|f| f.label().to_string()),
        goals: profile.goals.clone(),
        joined: format!("Joined {}", profile.created_at.format("%B %Y")),
        is_own,
        stats,
        recent: build_dashboard(&visible, now).recent,
        edit_form: is_own.then(|| EditProfileForm::from(profile)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::tests::make_activity;
    use crate::models::{ActivityType, PrivacySettings, UserMetadata};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn profile(privacy_settings: PrivacySettings) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            display_name: None,
            bio: Some("Trail runner".to_string()),
            location: None,
            avatar_url: None,
            date_of_birth: None,
            gender: None,
            height: None,
            weight: None,
            fitness_level: None,
            goals: vec!["Run a Marathon".to_string()],
            privacy_settings,
            created_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
        }
    }

    fn activities(owner: Uuid) -> Vec<Activity> {
        let mut rows = vec![
            make_activity(ActivityType::Run, 5.0, "00:25:00", now() - Duration::days(1)),
            make_activity(ActivityType::Run, 7.0, "00:35:00", now() - Duration::days(2)),
            make_activity(ActivityType::Ride, 20.0, "01:00:00", now() - Duration::days(200)),
        ];
        rows[1].privacy_level = PrivacyLevel::Private;
        for row in &mut rows {
            row.user_id = owner;
        }
        rows
    }

    fn viewer(id: Uuid) -> Identity {
        Identity {
            id,
            email: None,
            user_metadata: UserMetadata::default(),
        }
    }

    #[test]
    fn test_own_profile_sees_everything() {
        let p = profile(PrivacySettings::default());
        let me = viewer(p.id);

        let view = build_profile(&p, &activities(p.id), Some(&me), now());

        assert!(view.is_own);
        assert_eq!(view.name, "Ann Lee");
        assert_eq!(view.joined, "Joined March 2024");
        let stats = view.stats.unwrap();
        assert_eq!(stats[0].value, "32 km");
        // The 200-day-old ride was last year.
        assert_eq!(stats[1].value, "2");
        assert!(view.edit_form.is_some());
    }

    #[test]
    fn test_other_viewer_sees_public_activities_only() {
        let p = profile(PrivacySettings::default());
        let other = viewer(Uuid::new_v4());

        let view = build_profile(&p, &activities(p.id), Some(&other), now());

        assert!(!view.is_own);
        assert_eq!(view.recent.len(), 2);
        assert_eq!(view.stats.unwrap()[0].value, "25 km");
        assert!(view.edit_form.is_none());
    }

    #[test]
    fn test_private_stats_hidden_from_others() {
        let p = profile(PrivacySettings {
            stats_visibility: Visibility::Private,
            ..Default::default()
        });

        let view = build_profile(&p, &activities(p.id), None, now());
        assert!(view.stats.is_none());

        let own = build_profile(&p, &activities(p.id), Some(&viewer(p.id)), now());
        assert!(own.stats.is_some());
    }
}
