// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile store: the signed-in user's profile and the athlete directory.
//!
//! Loads are numbered like the activity store's: for each of the two
//! collections only the most recently issued load may replace local state.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{limits, Backend};
use crate::error::{AppError, Result};
use crate::models::{Profile, ProfileUpdate, PublicProfile};
use crate::services::SessionStore;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub public_profiles: Vec<PublicProfile>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    state: ProfileState,
    applied_profile: u64,
    applied_directory: u64,
}

#[derive(Debug, Clone, Copy)]
enum Collection {
    Profile,
    Directory,
}

pub struct ProfileStore {
    backend: Arc<dyn Backend>,
    session: Arc<SessionStore>,
    inner: RwLock<Inner>,
    profile_seq: AtomicU64,
    directory_seq: AtomicU64,
}

impl ProfileStore {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionStore>) -> Self {
        Self {
            backend,
            session,
            inner: RwLock::new(Inner::default()),
            profile_seq: AtomicU64::new(0),
            directory_seq: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> ProfileState {
        self.inner.read().await.state.clone()
    }

    fn seq(&self, collection: Collection) -> &AtomicU64 {
        match collection {
            Collection::Profile => &self.profile_seq,
            Collection::Directory => &self.directory_seq,
        }
    }

    async fn begin_load(&self, collection: Collection) -> u64 {
        let ticket = self.seq(collection).fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.write().await.state.loading = true;
        ticket
    }

    /// Clear `loading` once no issued load is still outstanding.
    fn settle_loading(&self, inner: &mut Inner) {
        let profile_idle = self.profile_seq.load(Ordering::SeqCst) <= inner.applied_profile;
        let directory_idle = self.directory_seq.load(Ordering::SeqCst) <= inner.applied_directory;
        if profile_idle && directory_idle {
            inner.state.loading = false;
        }
    }

    async fn finish_load<T: Clone>(
        &self,
        collection: Collection,
        ticket: u64,
        result: &Result<T>,
        apply: impl FnOnce(&mut ProfileState, T),
    ) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let applied = match collection {
            Collection::Profile => &mut inner.applied_profile,
            Collection::Directory => &mut inner.applied_directory,
        };
        if ticket > *applied {
            *applied = ticket;
            match result {
                Ok(value) => {
                    apply(&mut inner.state, value.clone());
                    inner.state.error = None;
                }
                Err(e) => inner.state.error = Some(e.to_string()),
            }
        } else {
            tracing::debug!(?collection, ticket, "Discarding superseded load");
        }

        self.settle_loading(inner);
    }

    async fn record_error(&self, error: &AppError) {
        self.inner.write().await.state.error = Some(error.to_string());
    }

    /// Load the signed-in user's profile.
    pub async fn load_profile(&self) -> Result<Profile> {
        let user = self.session.require_identity()?;
        let ticket = self.begin_load(Collection::Profile).await;

        let result = self
            .backend
            .get_profile(user.id)
            .await
            .map_err(|e| e.or_generic("Failed to load profile"));

        self.finish_load(Collection::Profile, ticket, &result, |state, profile| {
            state.profile = Some(profile);
        })
        .await;
        result
    }

    /// Another athlete's profile, not cached locally.
    pub async fn fetch_profile(&self, id: Uuid) -> Result<Profile> {
        self.backend
            .get_profile(id)
            .await
            .map_err(|e| e.or_generic("Failed to load profile"))
    }

    /// Load profiles that are publicly visible.
    pub async fn load_public_profiles(&self) -> Result<Vec<PublicProfile>> {
        let ticket = self.begin_load(Collection::Directory).await;

        let result = self
            .backend
            .public_profiles(limits::PUBLIC_PROFILES)
            .await
            .map_err(|e| e.or_generic("Failed to load profiles"));

        self.finish_load(Collection::Directory, ticket, &result, |state, rows| {
            state.public_profiles = rows;
        })
        .await;
        result
    }

    /// Update the signed-in user's profile and re-load what it affects.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        let Some(user) = self.session.identity() else {
            let err = AppError::Unauthorized;
            self.record_error(&err).await;
            return Err(err);
        };

        let row = match self.backend.update_profile(user.id, update).await {
            Ok(row) => row,
            Err(e) => {
                let err = e.or_generic("Failed to update profile");
                self.record_error(&err).await;
                return Err(err);
            }
        };
        tracing::info!(user_id = %user.id, "Profile updated");

        // Visibility changes move the profile in or out of the directory.
        let (own, public) = tokio::join!(self.load_profile(), self.load_public_profiles());
        if let Err(e) = own {
            tracing::debug!(error = %e, "Profile reload failed");
        }
        if let Err(e) = public {
            tracing::debug!(error = %e, "Directory reload failed");
        }
        Ok(row)
    }

    /// Forget the signed-in user's profile, e.g. after sign-out.
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner.state.profile = None;
        inner.state.error = None;
        // A profile load still in flight belongs to the previous user.
        inner.applied_profile = self.profile_seq.load(Ordering::SeqCst);
        self.settle_loading(inner);
    }
}
