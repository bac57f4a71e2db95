// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View models built from store state.
//!
//! Each builder is a pure function of the rows it is given and, where it
//! shows relative times or windows, an explicit `now`.

pub mod athletes;
pub mod dashboard;
pub mod feed;
pub mod forms;
pub mod leaderboard;
pub mod profile;

pub use athletes::{build_athletes, AthletesView};
pub use dashboard::{build_dashboard, DashboardView};
pub use feed::{build_feed, FeedView};
pub use forms::{EditProfileForm, RecordActivityForm, SignInForm, SignUpForm};
pub use leaderboard::{build_leaderboard, LeaderboardView};
pub use profile::{build_profile, ProfileView};

/// Avatar shown for users without one.
pub const DEFAULT_AVATAR_URL: &str =
    "https://images.pexels.com/photos/220453/pexels-photo-220453.jpeg?auto=compress&cs=tinysrgb&w=150";
