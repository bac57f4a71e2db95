// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity store: the signed-in user's activities and the public feed.
//!
//! Handles the core workflow:
//! 1. Load the user's own activities and the public activities
//! 2. Create, update or delete an activity owned by the signed-in user
//! 3. Re-load both collections after every successful write
//!
//! Loads are numbered per collection. When two loads of the same collection
//! overlap, only the most recently issued one may replace local state; an
//! older load that completes later is discarded.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{limits, Backend};
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityDraft, ActivityUpdate, PublicActivity};
use crate::services::SessionStore;

/// Locally cached activity collections as seen by views.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityState {
    pub user_activities: Vec<Activity>,
    pub public_activities: Vec<PublicActivity>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    state: ActivityState,
    /// Ticket of the load whose result is currently in `user_activities`.
    applied_user: u64,
    applied_public: u64,
}

/// Which collection a load targets.
#[derive(Debug, Clone, Copy)]
enum Collection {
    User,
    Public,
}

pub struct ActivityStore {
    backend: Arc<dyn Backend>,
    session: Arc<SessionStore>,
    inner: RwLock<Inner>,
    user_seq: AtomicU64,
    public_seq: AtomicU64,
}

impl ActivityStore {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionStore>) -> Self {
        Self {
            backend,
            session,
            inner: RwLock::new(Inner::default()),
            user_seq: AtomicU64::new(0),
            public_seq: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> ActivityState {
        self.inner.read().await.state.clone()
    }

    fn seq(&self, collection: Collection) -> &AtomicU64 {
        match collection {
            Collection::User => &self.user_seq,
            Collection::Public => &self.public_seq,
        }
    }

    async fn begin_load(&self, collection: Collection) -> u64 {
        let ticket = self.seq(collection).fetch_add(1, Ordering::SeqCst) + 1;
        let mut inner = self.inner.write().await;
        inner.state.loading = true;
        ticket
    }

    /// Apply a finished load if it is newer than what is already applied.
    async fn finish_load<T>(
        &self,
        collection: Collection,
        ticket: u64,
        result: &Result<Vec<T>>,
        apply: impl FnOnce(&mut ActivityState, Vec<T>),
    ) where
        T: Clone,
    {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let applied = match collection {
            Collection::User => &mut inner.applied_user,
            Collection::Public => &mut inner.applied_public,
        };
        if ticket > *applied {
            *applied = ticket;
            match result {
                Ok(rows) => {
                    apply(&mut inner.state, rows.clone());
                    inner.state.error = None;
                }
                Err(e) => inner.state.error = Some(e.to_string()),
            }
        } else {
            tracing::debug!(?collection, ticket, "Discarding superseded load");
        }

        let user_idle = self.user_seq.load(Ordering::SeqCst) <= inner.applied_user;
        let public_idle = self.public_seq.load(Ordering::SeqCst) <= inner.applied_public;
        if user_idle && public_idle {
            inner.state.loading = false;
        }
    }

    /// Load the signed-in user's most recent activities.
    pub async fn load_user_activities(&self) -> Result<Vec<Activity>> {
        let user = self.session.require_identity()?;
        let ticket = self.begin_load(Collection::User).await;

        let result = self
            .backend
            .user_activities(user.id, limits::USER_ACTIVITIES)
            .await
            .map_err(|e| e.or_generic("Failed to load activities"));

        self.finish_load(Collection::User, ticket, &result, |state, rows| {
            state.user_activities = rows;
        })
        .await;

        if let Ok(rows) = &result {
            tracing::debug!(user_id = %user.id, count = rows.len(), "Loaded user activities");
        }
        result
    }

    /// Load the most recent public activities with their authors.
    pub async fn load_public_activities(&self) -> Result<Vec<PublicActivity>> {
        let ticket = self.begin_load(Collection::Public).await;

        let result = self
            .backend
            .public_activities(limits::PUBLIC_ACTIVITIES)
            .await
            .map_err(|e| e.or_generic("Failed to load public activities"));

        self.finish_load(Collection::Public, ticket, &result, |state, rows| {
            state.public_activities = rows;
        })
        .await;
        result
    }

    /// Another user's activities, not cached locally.
    pub async fn fetch_user_activities(&self, user_id: Uuid) -> Result<Vec<Activity>> {
        self.backend
            .user_activities(user_id, limits::USER_ACTIVITIES)
            .await
            .map_err(|e| e.or_generic("Failed to load activities"))
    }

    /// Re-load both collections. Per-collection failures are recorded in
    /// the local error state.
    pub async fn refresh(&self) {
        let (user, public) = tokio::join!(
            self.load_user_activities(),
            self.load_public_activities()
        );
        for result in [user.map(|_| ()), public.map(|_| ())] {
            if let Err(e) = result {
                tracing::debug!(error = %e, "Activity refresh incomplete");
            }
        }
    }

    async fn record_error(&self, error: &AppError) {
        self.inner.write().await.state.error = Some(error.to_string());
    }

    pub async fn create(&self, draft: ActivityDraft) -> Result<Activity> {
        let Some(user) = self.session.identity() else {
            let err = AppError::Unauthorized;
            self.record_error(&err).await;
            return Err(err);
        };

        let row = match self
            .backend
            .insert_activity(&draft.into_new_activity(user.id))
            .await
        {
            Ok(row) => row,
            Err(e) => {
                let err = e.or_generic("Failed to create activity");
                self.record_error(&err).await;
                return Err(err);
            }
        };

        tracing::info!(activity_id = %row.id, user_id = %user.id, "Activity created");
        self.refresh().await;
        Ok(row)
    }

    pub async fn update(&self, id: Uuid, update: &ActivityUpdate) -> Result<Activity> {
        let row = match self.backend.update_activity(id, update).await {
            Ok(row) => row,
            Err(e) => {
                let err = e.or_generic("Failed to update activity");
                self.record_error(&err).await;
                return Err(err);
            }
        };

        tracing::info!(activity_id = %id, "Activity updated");
        self.refresh().await;
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if let Err(e) = self.backend.delete_activity(id).await {
            let err = e.or_generic("Failed to delete activity");
            self.record_error(&err).await;
            return Err(err);
        }

        tracing::info!(activity_id = %id, "Activity deleted");
        self.refresh().await;
        Ok(())
    }

    /// Forget the signed-in user's rows, e.g. after sign-out.
    pub async fn clear_user(&self) {
        let mut inner = self.inner.write().await;
        inner.state.user_activities.clear();
        inner.state.error = None;
        // Anything still in flight for the previous user is now stale.
        inner.applied_user = self.user_seq.load(Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use crate::models::{ActivityType, PrivacyLevel, UserMetadata, WorkoutDuration};
    use std::time::Duration;

    fn draft(title: &str, privacy_level: PrivacyLevel) -> ActivityDraft {
        ActivityDraft {
            activity_type: ActivityType::Run,
            title: title.to_string(),
            description: None,
            distance: 5.0,
            duration: WorkoutDuration::new(0, 25, 0).unwrap(),
            elevation_gain: 10,
            calories_burned: None,
            average_heart_rate: None,
            max_heart_rate: None,
            privacy_level,
        }
    }

    async fn signed_in_store() -> (Arc<MemoryBackend>, ActivityStore) {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .sign_up(
                "ann@example.com",
                "secret123",
                &UserMetadata {
                    first_name: "Ann".to_string(),
                    last_name: "Lee".to_string(),
                },
            )
            .await
            .unwrap();
        let session = Arc::new(SessionStore::start(backend.clone()));
        session.wait_resolved().await;
        let store = ActivityStore::new(backend.clone(), session);
        (backend, store)
    }

    #[tokio::test]
    async fn test_create_requires_identity() {
        let backend = Arc::new(MemoryBackend::new());
        let session = Arc::new(SessionStore::start(backend.clone()));
        session.wait_resolved().await;
        let store = ActivityStore::new(backend.clone(), session);

        let err = store
            .create(draft("Morning Run", PrivacyLevel::Public))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No user logged in");
        assert_eq!(store.snapshot().await.error.as_deref(), Some("No user logged in"));
        assert_eq!(backend.activity_count(), 0);
    }

    #[tokio::test]
    async fn test_create_reloads_both_collections() {
        let (_backend, store) = signed_in_store().await;

        store.create(draft("Morning Run", PrivacyLevel::Public)).await.unwrap();
        store.create(draft("Secret Run", PrivacyLevel::Private)).await.unwrap();

        let state = store.snapshot().await;
        assert_eq!(state.user_activities.len(), 2);
        assert_eq!(state.user_activities[0].title, "Secret Run");
        assert_eq!(state.public_activities.len(), 1);
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_delete_reloads() {
        let (backend, store) = signed_in_store().await;
        let row = store.create(draft("Morning Run", PrivacyLevel::Public)).await.unwrap();

        store.delete(row.id).await.unwrap();

        let state = store.snapshot().await;
        assert!(state.user_activities.is_empty());
        assert!(state.public_activities.is_empty());
        assert_eq!(backend.activity_count(), 0);
    }

    #[tokio::test]
    async fn test_update_changes_row() {
        let (_backend, store) = signed_in_store().await;
        let row = store.create(draft("Morning Run", PrivacyLevel::Public)).await.unwrap();

        let update = ActivityUpdate {
            title: Some("Evening Run".to_string()),
            ..Default::default()
        };
        let updated = store.update(row.id, &update).await.unwrap();

        assert_eq!(updated.title, "Evening Run");
        assert_eq!(store.snapshot().await.user_activities[0].title, "Evening Run");
    }

    #[tokio::test]
    async fn test_unexpected_failure_gets_generic_message() {
        let (backend, store) = signed_in_store().await;
        backend.fail_next(AppError::Network("connection refused".to_string()));

        let err = store.load_public_activities().await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to load public activities");
        let state = store.snapshot().await;
        assert_eq!(state.error.as_deref(), Some("Failed to load public activities"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_backend_message_is_kept() {
        let (backend, store) = signed_in_store().await;
        backend.fail_next(AppError::Backend("permission denied for table activities".to_string()));

        let err = store
            .create(draft("Morning Run", PrivacyLevel::Public))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "permission denied for table activities");
    }

    #[tokio::test]
    async fn test_last_issued_load_wins() {
        let (backend, store) = signed_in_store().await;
        let store = Arc::new(store);

        // First load sees an empty table but answers late.
        backend.delay_next_user_activities(Duration::from_millis(200));
        let slow = {
            let store = store.clone();
            tokio::spawn(async move { store.load_user_activities().await })
        };
        tokio::task::yield_now().await;

        // Second load is issued after a row exists and answers immediately.
        store.create(draft("Morning Run", PrivacyLevel::Public)).await.unwrap();
        assert_eq!(store.snapshot().await.user_activities.len(), 1);

        let stale = slow.await.unwrap().unwrap();
        assert!(stale.is_empty());

        // The stale, empty result did not overwrite the newer one.
        let state = store.snapshot().await;
        assert_eq!(state.user_activities.len(), 1);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_malformed_row_fails_load_with_generic_message() {
        let (backend, store) = signed_in_store().await;
        let body = r#"[{
            "id": "6f1c1a2e-0000-4000-8000-0000000000a1",
            "user_id": "6f1c1a2e-0000-4000-8000-0000000000aa",
            "type": "run",
            "title": "Long Run",
            "description": null,
            "distance": 21.1,
            "duration": "1 day 02:00:00",
            "elevation_gain": 120,
            "calories_burned": null,
            "average_heart_rate": null,
            "max_heart_rate": null,
            "privacy_level": "public",
            "created_at": "2024-06-01T07:00:00Z",
            "updated_at": "2024-06-01T07:00:00Z"
        }]"#;
        let decode_error = crate::db::supabase::decode_body::<Vec<Activity>>(body).unwrap_err();
        backend.fail_next(decode_error);

        let err = store.load_user_activities().await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to load activities");
        let state = store.snapshot().await;
        assert_eq!(state.error.as_deref(), Some("Failed to load activities"));
        assert!(state.user_activities.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_clear_user() {
        let (_backend, store) = signed_in_store().await;
        store.create(draft("Morning Run", PrivacyLevel::Public)).await.unwrap();

        store.clear_user().await;

        let state = store.snapshot().await;
        assert!(state.user_activities.is_empty());
        assert_eq!(state.public_activities.len(), 1);
    }
}
