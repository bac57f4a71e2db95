// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard ranked by total distance over the public feed.

use serde::Serialize;
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::format::{format_pace_minutes, pace_minutes_per_km, round_one_decimal, PACE_UNAVAILABLE};
use crate::models::{ActivityType, PublicActivity};

use super::DEFAULT_AVATAR_URL;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub name: String,
    pub avatar: String,
    /// Kilometers, one decimal
    pub total_distance: f64,
    pub activity_count: u32,
    pub best_pace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardView {
    #[serde(rename = "type")]
    pub activity_type: Option<ActivityType>,
    pub entries: Vec<LeaderboardEntry>,
}

struct Totals {
    name: String,
    avatar: String,
    distance: f64,
    count: u32,
    best_pace: Option<f64>,
}

/// Group public activities by author and rank them.
///
/// Ranked by total distance, then activity count, then name. With
/// `activity_type` set only activities of that type count.
pub fn build_leaderboard(
    rows: &[PublicActivity],
    activity_type: Option<ActivityType>,
) -> LeaderboardView {
    let mut by_user: HashMap<Uuid, Totals> = HashMap::new();

    for row in rows {
        let activity = &row.activity;
        if activity_type.is_some_and(|t| t != activity.activity_type) {
            continue;
        }

        let totals = by_user.entry(activity.user_id).or_insert_with(|| {
            let author = row.author.clone().unwrap_or_default();
            Totals {
                name: author.name(),
                avatar: author
                    .avatar_url
                    .filter(|url| !url.is_empty())
                    .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
                distance: 0.0,
                count: 0,
                best_pace: None,
            }
        });
        totals.distance += activity.distance;
        totals.count += 1;
        if let Some(pace) = pace_minutes_per_km(&activity.duration, activity.distance) {
            totals.best_pace = Some(totals.best_pace.map_or(pace, |best| best.min(pace)));
        }
    }

    let mut ranked: Vec<(Uuid, Totals)> = by_user.into_iter().collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.distance
            .total_cmp(&a.distance)
            .then(b.count.cmp(&a.count))
            .then_with(|| a.name.cmp(&b.name))
    });

    let entries = ranked
        .into_iter()
        .zip(1..)
        .map(|((user_id, totals), rank)| LeaderboardEntry {
            rank,
            user_id: user_id.to_string(),
            name: totals.name,
            avatar: totals.avatar,
            total_distance: round_one_decimal(totals.distance),
            activity_count: totals.count,
            best_pace: totals
                .best_pace
                .map(format_pace_minutes)
                .unwrap_or_else(|| PACE_UNAVAILABLE.to_string()),
        })
        .collect();

    LeaderboardView {
        activity_type,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::tests::make_activity;
    use crate::models::ActivityAuthor;
    use chrono::{TimeZone, Utc};

    fn row(user: Uuid, name: &str, activity_type: ActivityType, distance: f64, duration: &str) -> PublicActivity {
        let mut activity = make_activity(
            activity_type,
            distance,
            duration,
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        );
        activity.user_id = user;
        PublicActivity {
            activity,
            author: Some(ActivityAuthor {
                display_name: Some(name.to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_ranks_by_total_distance() {
        let ann = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let rows = vec![
            row(ann, "Ann", ActivityType::Run, 5.0, "00:25:00"),
            row(bob, "Bob", ActivityType::Ride, 30.0, "01:00:00"),
            row(ann, "Ann", ActivityType::Run, 10.0, "00:45:00"),
        ];

        let view = build_leaderboard(&rows, None);

        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.entries[0].name, "Bob");
        assert_eq!(view.entries[0].rank, 1);
        assert_eq!(view.entries[1].name, "Ann");
        assert_eq!(view.entries[1].total_distance, 15.0);
        assert_eq!(view.entries[1].activity_count, 2);
        assert_eq!(view.entries[1].best_pace, "4:30/km");
    }

    #[test]
    fn test_type_filter() {
        let ann = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let rows = vec![
            row(ann, "Ann", ActivityType::Run, 5.0, "00:25:00"),
            row(bob, "Bob", ActivityType::Ride, 30.0, "01:00:00"),
        ];

        let view = build_leaderboard(&rows, Some(ActivityType::Run));

        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].name, "Ann");
    }

    #[test]
    fn test_ties_break_on_count_then_name() {
        let ann = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let cat = Uuid::new_v4();
        let rows = vec![
            row(cat, "Cat", ActivityType::Run, 10.0, "00:50:00"),
            row(bob, "Bob", ActivityType::Run, 5.0, "00:25:00"),
            row(bob, "Bob", ActivityType::Run, 5.0, "00:25:00"),
            row(ann, "Ann", ActivityType::Run, 10.0, "00:50:00"),
        ];

        let view = build_leaderboard(&rows, None);
        let names: Vec<&str> = view.entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["Bob", "Ann", "Cat"]);
    }

    #[test]
    fn test_distance_free_activities_have_no_pace() {
        let ann = Uuid::new_v4();
        let rows = vec![row(ann, "Ann", ActivityType::Yoga, 0.0, "01:00:00")];

        let view = build_leaderboard(&rows, None);
        assert_eq!(view.entries[0].best_pace, "N/A");
    }
}
