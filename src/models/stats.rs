// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard aggregates derived from a user's activities.
//!
//! Computed on the client from the already-loaded activity list, so the
//! numbers always match what the rest of the dashboard shows.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::format::{format_pace_minutes, pace_minutes_per_km, round_one_decimal, PACE_UNAVAILABLE};
use crate::models::{Activity, ActivityType};

/// Distance goal the "Monthly Goal" card measures against (km).
pub const MONTHLY_GOAL_KM: f64 = 100.0;

const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;

/// Aggregate statistics for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardStats {
    /// Distance over the last 7 days (km, one decimal)
    pub week_distance: f64,
    /// Distance over the last 30 days (km, one decimal)
    pub month_distance: f64,
    /// Number of activities in the last 30 days
    pub monthly_activities: u32,
    /// Distance across all loaded activities (km, one decimal)
    pub total_distance: f64,
    /// Fastest run pace, or "N/A"
    pub personal_best: String,
    /// Total distance as a whole percentage of `MONTHLY_GOAL_KM`
    pub goal_progress_percent: u32,
}

impl DashboardStats {
    /// Compute aggregates for `activities` as of `now`.
    ///
    /// Window lower bounds are inclusive: an activity created exactly seven
    /// days before `now` counts toward the week.
    pub fn from_activities(activities: &[Activity], now: DateTime<Utc>) -> Self {
        let week_start = now - Duration::days(WEEK_DAYS);
        let month_start = now - Duration::days(MONTH_DAYS);

        let mut week_distance = 0.0;
        let mut month_distance = 0.0;
        let mut monthly_activities = 0u32;
        let mut total_distance = 0.0;

        for activity in activities {
            total_distance += activity.distance;
            if activity.created_at >= week_start {
                week_distance += activity.distance;
            }
            if activity.created_at >= month_start {
                month_distance += activity.distance;
                monthly_activities += 1;
            }
        }

        let total_distance = round_one_decimal(total_distance);
        let goal_progress_percent = (total_distance / MONTHLY_GOAL_KM * 100.0).round().max(0.0) as u32;

        Self {
            week_distance: round_one_decimal(week_distance),
            month_distance: round_one_decimal(month_distance),
            monthly_activities,
            total_distance,
            personal_best: best_run_pace(activities),
            goal_progress_percent,
        }
    }
}

/// Lowest pace among runs with a positive distance, formatted, or "N/A".
pub fn best_run_pace(activities: &[Activity]) -> String {
    activities
        .iter()
        .filter(|a| a.activity_type == ActivityType::Run)
        .filter_map(|a| pace_minutes_per_km(&a.duration, a.distance))
        .min_by(|a, b| a.total_cmp(b))
        .map(format_pace_minutes)
        .unwrap_or_else(|| PACE_UNAVAILABLE.to_string())
}

/// Total distance and count of activities created in `now`'s calendar year.
pub fn year_to_date(activities: &[Activity], now: DateTime<Utc>) -> (f64, u32) {
    activities
        .iter()
        .filter(|a| a.created_at.year() == now.year())
        .fold((0.0, 0), |(distance, count), a| (distance + a.distance, count + 1))
}
