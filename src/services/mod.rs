// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - stores holding the locally cached backend state.

pub mod activity;
pub mod profile;
pub mod session;

pub use activity::{ActivityState, ActivityStore};
pub use profile::{ProfileState, ProfileStore};
pub use session::{SessionState, SessionStore};
