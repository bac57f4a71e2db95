// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout duration stored by the backend as `HH:MM:SS` text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reasons a duration string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("Invalid duration '{0}': expected HH:MM:SS")]
    SegmentCount(String),

    #[error("Invalid duration '{0}': segments must be whole numbers")]
    NotNumeric(String),

    #[error("Invalid duration '{0}': minutes and seconds must be below 60")]
    OutOfRange(String),
}

/// Elapsed workout time split into hours, minutes and seconds.
///
/// Minutes and seconds are always below 60; hours are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkoutDuration {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl WorkoutDuration {
    /// Build a duration from already-normalized components.
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self, DurationError> {
        if minutes >= 60 || seconds >= 60 {
            return Err(DurationError::OutOfRange(format!(
                "{:02}:{:02}:{:02}",
                hours, minutes, seconds
            )));
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Build a duration from a whole number of seconds.
    pub fn from_total_seconds(total: u64) -> Self {
        Self {
            hours: u32::try_from(total / 3600).unwrap_or(u32::MAX),
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Whole seconds of elapsed time.
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// Elapsed time in (fractional) minutes: `h*60 + m + s/60`.
    pub fn total_minutes(&self) -> f64 {
        f64::from(self.hours) * 60.0 + f64::from(self.minutes) + f64::from(self.seconds) / 60.0
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl FromStr for WorkoutDuration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let [h, m, sec] = parts.as_slice() else {
            return Err(DurationError::SegmentCount(s.to_string()));
        };

        let parse = |part: &str| -> Result<u32, DurationError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DurationError::NotNumeric(s.to_string()));
            }
            part.parse::<u32>()
                .map_err(|_| DurationError::NotNumeric(s.to_string()))
        };

        let (hours, minutes, seconds) = (parse(h)?, parse(m)?, parse(sec)?);
        if minutes >= 60 || seconds >= 60 {
            return Err(DurationError::OutOfRange(s.to_string()));
        }

        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }
}

/// Canonical storage form: zero-padded `HH:MM:SS`.
impl fmt::Display for WorkoutDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

impl TryFrom<String> for WorkoutDuration {
    type Error = DurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkoutDuration> for String {
    fn from(value: WorkoutDuration) -> Self {
        value.to_string()
    }
}
