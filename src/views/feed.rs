// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public activity feed.

use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::format::{format_duration, format_pace, format_relative_time};
use crate::models::{ActivityAuthor, ActivityType, PublicActivity};
use crate::time_utils::format_utc_rfc3339;

use super::DEFAULT_AVATAR_URL;

pub const EMPTY_FEED_MESSAGE: &str = "No activities yet. Be the first to record an activity!";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CardAuthor {
    pub name: String,
    pub avatar: String,
}

/// One activity as shown in the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityCard {
    pub id: String,
    pub user: CardAuthor,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    /// Kilometers
    pub distance: f64,
    pub duration: String,
    /// Meters
    pub elevation: u32,
    pub pace: String,
    /// Relative to the time the feed was built, e.g. "3h ago"
    pub timestamp: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedView {
    pub activities: Vec<ActivityCard>,
    /// Set when there is nothing to show.
    pub empty_message: Option<String>,
}

pub fn activity_card(row: &PublicActivity, now: DateTime<Utc>) -> ActivityCard {
    let activity = &row.activity;
    let author = row.author.clone().unwrap_or_default();

    ActivityCard {
        id: activity.id.to_string(),
        user: card_author(&author),
        activity_type: activity.activity_type,
        title: activity.title.clone(),
        description: activity.description.clone(),
        distance: activity.distance,
        duration: format_duration(&activity.duration),
        elevation: activity.elevation_gain,
        pace: format_pace(&activity.duration, activity.distance),
        timestamp: format_relative_time(activity.created_at, now),
        created_at: format_utc_rfc3339(activity.created_at),
    }
}

fn card_author(author: &ActivityAuthor) -> CardAuthor {
    CardAuthor {
        name: author.name(),
        avatar: author
            .avatar_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
    }
}

pub fn build_feed(rows: &[PublicActivity], now: DateTime<Utc>) -> FeedView {
    let activities: Vec<ActivityCard> = rows.iter().map(|row| activity_card(row, now)).collect();
    let empty_message = activities
        .is_empty()
        .then(|| EMPTY_FEED_MESSAGE.to_string());

    FeedView {
        activities,
        empty_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::tests::make_activity;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_card_formats_fields() {
        let row = PublicActivity {
            activity: make_activity(ActivityType::Run, 5.0, "00:25:00", now() - Duration::hours(3)),
            author: Some(ActivityAuthor {
                display_name: None,
                first_name: Some("Ann".to_string()),
                last_name: Some("Lee".to_string()),
                avatar_url: None,
            }),
        };

        let card = activity_card(&row, now());
        assert_eq!(card.user.name, "Ann Lee");
        assert_eq!(card.user.avatar, DEFAULT_AVATAR_URL);
        assert_eq!(card.duration, "25:00");
        assert_eq!(card.pace, "5:00/km");
        assert_eq!(card.timestamp, "3h ago");
        assert_eq!(card.created_at, "2024-06-15T09:00:00Z");
    }

    #[test]
    fn test_missing_author_is_unknown() {
        let row = PublicActivity {
            activity: make_activity(ActivityType::Yoga, 0.0, "01:00:00", now()),
            author: None,
        };

        let card = activity_card(&row, now());
        assert_eq!(card.user.name, "Unknown User");
        assert_eq!(card.pace, "N/A");
        assert_eq!(card.duration, "1:00:00");
        assert_eq!(card.timestamp, "Just now");
    }

    #[test]
    fn test_empty_feed_message() {
        let view = build_feed(&[], now());
        assert!(view.activities.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some(EMPTY_FEED_MESSAGE));
    }
}
