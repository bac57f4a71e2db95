// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Display formatting for activity fields.
//!
//! Everything here is a pure function of its arguments: the current time is
//! always passed in, never read from the clock.

use chrono::{DateTime, Utc};

use crate::models::WorkoutDuration;

/// Shown wherever a pace cannot be computed.
pub const PACE_UNAVAILABLE: &str = "N/A";

/// `H:MM:SS` when there is at least one hour, otherwise `M:SS`.
pub fn format_duration(duration: &WorkoutDuration) -> String {
    if duration.hours() > 0 {
        format!(
            "{}:{:02}:{:02}",
            duration.hours(),
            duration.minutes(),
            duration.seconds()
        )
    } else {
        format!("{}:{:02}", duration.minutes(), duration.seconds())
    }
}

/// Minutes per kilometer, or `None` when the distance is not positive.
pub fn pace_minutes_per_km(duration: &WorkoutDuration, distance_km: f64) -> Option<f64> {
    if distance_km > 0.0 {
        Some(duration.total_minutes() / distance_km)
    } else {
        None
    }
}

/// Render a pace as `MIN:SEC/km`, seconds rounded to the nearest whole second.
pub fn format_pace_minutes(pace_minutes: f64) -> String {
    let total_seconds = (pace_minutes * 60.0).round().max(0.0) as u64;
    format!("{}:{:02}/km", total_seconds / 60, total_seconds % 60)
}

/// Pace string for an activity, `"N/A"` when distance is zero.
pub fn format_pace(duration: &WorkoutDuration, distance_km: f64) -> String {
    pace_minutes_per_km(duration, distance_km)
        .map(format_pace_minutes)
        .unwrap_or_else(|| PACE_UNAVAILABLE.to_string())
}

/// "Just now", "{h}h ago" or "{d}d ago" from whole elapsed hours.
pub fn format_relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = now.signed_duration_since(created_at).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", hours / 24)
    }
}

/// Round to one decimal place for distance display.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
