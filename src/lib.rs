// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Stride: record workouts and follow other athletes
//!
//! This crate provides the front-end layer of a fitness social tracker whose
//! storage and auth live in a hosted backend: session and data stores over
//! the [`db::Backend`] trait, derived statistics, view models and a small
//! HTTP host serving them to the browser shell.

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod views;

use config::Config;
use db::Backend;
use services::{ActivityStore, ProfileStore, SessionStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub activities: ActivityStore,
    pub profiles: ProfileStore,
}

impl AppState {
    /// Wire the stores to `backend`. Must be called inside a tokio runtime.
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        let session = Arc::new(SessionStore::start(backend.clone()));
        Self {
            activities: ActivityStore::new(backend.clone(), session.clone()),
            profiles: ProfileStore::new(backend, session.clone()),
            config,
            session,
        }
    }
}
