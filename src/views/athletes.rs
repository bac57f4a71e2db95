// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete directory.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::PublicProfile;

use super::DEFAULT_AVATAR_URL;

pub const NO_ATHLETES_MESSAGE: &str = "No athletes found";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AthleteCard {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub fitness_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AthletesView {
    pub athletes: Vec<AthleteCard>,
    pub empty_message: Option<String>,
}

fn matches(card: &AthleteCard, needle: &str) -> bool {
    card.name.to_lowercase().contains(needle)
        || card
            .location
            .as_deref()
            .is_some_and(|l| l.to_lowercase().contains(needle))
}

/// Public profiles, optionally filtered by a case-insensitive search over
/// name and location.
pub fn build_athletes(profiles: &[PublicProfile], search: Option<&str>) -> AthletesView {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let athletes: Vec<AthleteCard> = profiles
        .iter()
        .map(|p| AthleteCard {
            id: p.id.to_string(),
            name: p.name(),
            avatar: p
                .avatar_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
            location: p.location.clone(),
            bio: p.bio.clone(),
            fitness_level: p.fitness_level.map(|f| f.label().to_string()),
        })
        .filter(|card| needle.as_deref().is_none_or(|n| matches(card, n)))
        .collect();

    let empty_message = athletes
        .is_empty()
        .then(|| NO_ATHLETES_MESSAGE.to_string());
    AthletesView {
        athletes,
        empty_message,
    }
}
