// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personal dashboard: stat cards, recent activities and an activity heatmap.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::format::{format_duration, format_pace, round_one_decimal};
use crate::models::stats::MONTHLY_GOAL_KM;
use crate::models::{Activity, ActivityType, DashboardStats};

pub const EMPTY_RECENT_MESSAGE: &str =
    "No activities yet. Record your first activity to see achievements!";

/// Number of activities listed under "recent".
const RECENT_COUNT: usize = 3;

/// Days covered by the heatmap, ending today.
pub const HEATMAP_DAYS: i64 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatCard {
    pub label: String,
    pub value: String,
    pub change: String,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecentActivity {
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub title: String,
    /// Distance in km, or the duration when there is no distance.
    pub summary: String,
    pub pace: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HeatmapDay {
    pub date: String,
    pub count: u32,
    /// 0 (none) to 4 (busiest)
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub cards: Vec<StatCard>,
    pub recent: Vec<RecentActivity>,
    pub empty_message: Option<String>,
    pub heatmap: Vec<HeatmapDay>,
}

fn stat_cards(stats: &DashboardStats) -> Vec<StatCard> {
    vec![
        StatCard {
            label: "This Week".to_string(),
            value: format!("{} km", stats.week_distance),
            change: "Last 7 days".to_string(),
            trend: Trend::Up,
        },
        StatCard {
            label: "Monthly Goal".to_string(),
            value: format!("{}/{} km", stats.total_distance, MONTHLY_GOAL_KM),
            change: format!("{}%", stats.goal_progress_percent),
            trend: Trend::Up,
        },
        StatCard {
            label: "Activities".to_string(),
            value: stats.monthly_activities.to_string(),
            change: "This month".to_string(),
            trend: Trend::Neutral,
        },
        StatCard {
            label: "Personal Best".to_string(),
            value: stats.personal_best.clone(),
            change: "Fastest run".to_string(),
            trend: Trend::Neutral,
        },
    ]
}

fn recent_activity(activity: &Activity) -> RecentActivity {
    let summary = if activity.distance > 0.0 {
        format!("{} km", round_one_decimal(activity.distance))
    } else {
        format_duration(&activity.duration)
    };

    RecentActivity {
        id: activity.id.to_string(),
        activity_type: activity.activity_type,
        title: activity.title.clone(),
        summary,
        pace: format_pace(&activity.duration, activity.distance),
        date: activity.created_at.date_naive().to_string(),
    }
}

/// Activity counts per day for the last [`HEATMAP_DAYS`] days, oldest first.
///
/// Levels are relative to the busiest day in the window.
pub fn heatmap(activities: &[Activity], now: DateTime<Utc>) -> Vec<HeatmapDay> {
    let today = now.date_naive();
    let first = today - Duration::days(HEATMAP_DAYS - 1);

    let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
    for activity in activities {
        let day = activity.created_at.date_naive();
        if day >= first && day <= today {
            *counts.entry(day).or_default() += 1;
        }
    }
    let busiest = counts.values().copied().max().unwrap_or(0);

    (0..HEATMAP_DAYS)
        .map(|offset| {
            let date = first + Duration::days(offset);
            let count = counts.get(&date).copied().unwrap_or(0);
            let level = if count == 0 || busiest == 0 {
                0
            } else {
                // 1..=4, scaled to the busiest day
                (count * 4).div_ceil(busiest).clamp(1, 4) as u8
            };
            HeatmapDay {
                date: date.to_string(),
                count,
                level,
            }
        })
        .collect()
}

/// Build the dashboard from the signed-in user's activities (newest first).
pub fn build_dashboard(activities: &[Activity], now: DateTime<Utc>) -> DashboardView {
    let stats = DashboardStats::from_activities(activities, now);
    let recent: Vec<RecentActivity> = activities
        .iter()
        .take(RECENT_COUNT)
        .map(recent_activity)
        .collect();
    let empty_message = recent
        .is_empty()
        .then(|| EMPTY_RECENT_MESSAGE.to_string());

    DashboardView {
        cards: stat_cards(&stats),
        stats,
        recent,
        empty_message,
        heatmap: heatmap(activities, now),
    }
}
