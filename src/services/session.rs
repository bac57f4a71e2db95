// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: who is signed in, and the auth operations.
//!
//! The store resolves the current identity in the background when it is
//! started and then follows the backend's session notifications until it is
//! dropped. `resolved` stays false until the first answer arrives, so views
//! can tell "not known yet" apart from "known to be signed out".

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use validator::Validate;

use crate::db::Backend;
use crate::error::{AppError, Result};
use crate::models::{Identity, UserMetadata};
use crate::views::forms::{SignInForm, SignUpForm};

/// Snapshot of the session as seen by views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// False until the initial identity lookup has completed.
    pub resolved: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Current session plus sign-up / sign-in / sign-out.
pub struct SessionStore {
    backend: Arc<dyn Backend>,
    state: Arc<watch::Sender<SessionState>>,
    listener: JoinHandle<()>,
}

impl SessionStore {
    /// Start tracking the backend session.
    ///
    /// Must be called from within a tokio runtime. The subscription is taken
    /// before the initial lookup so no change can slip in between.
    pub fn start(backend: Arc<dyn Backend>) -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        let state = Arc::new(tx);

        let mut subscription = backend.subscribe_session();
        let listener = {
            let backend = backend.clone();
            let state = state.clone();
            tokio::spawn(async move {
                let initial = match backend.current_identity().await {
                    Ok(identity) => identity,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to resolve current session");
                        None
                    }
                };
                // A sign-in or sign-out that finished first has the newer answer.
                state.send_if_modified(|s| {
                    if s.resolved {
                        return false;
                    }
                    tracing::debug!(signed_in = initial.is_some(), "Session resolved");
                    s.identity = initial;
                    s.resolved = true;
                    true
                });

                while let Some(identity) = subscription.changed().await {
                    tracing::debug!(signed_in = identity.is_some(), "Session changed");
                    state.send_modify(|s| {
                        s.identity = identity;
                        s.resolved = true;
                    });
                }
            })
        };

        Self {
            backend,
            state,
            listener,
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// Identity of the signed-in user, or `Unauthorized`.
    pub fn require_identity(&self) -> Result<Identity> {
        self.identity().ok_or(AppError::Unauthorized)
    }

    /// Wait until the initial lookup has completed.
    pub async fn wait_resolved(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let resolved = rx.wait_for(|s| s.resolved).await.map(|state| state.clone());
        // Sender lives as long as `self`; fall back to the snapshot.
        resolved.unwrap_or_else(|_| self.snapshot())
    }

    /// Register a new account. Fields are validated before the backend is
    /// contacted.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<Identity> {
        form.validate()?;

        let metadata = UserMetadata {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
        };

        let identity = self
            .backend
            .sign_up(form.email.trim(), &form.password, &metadata)
            .await
            .map_err(|e| e.or_generic("Failed to sign up"))?;
        tracing::info!(user_id = %identity.id, "Account registered");

        // Registration signs in unless the account still needs confirming.
        match self.backend.current_identity().await {
            Ok(current) => self.state.send_modify(|s| {
                s.identity = current;
                s.resolved = true;
            }),
            Err(e) => tracing::warn!(error = %e, "Failed to read session after sign-up"),
        }
        Ok(identity)
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<Identity> {
        form.validate()?;

        let identity = self
            .backend
            .sign_in(form.email.trim(), &form.password)
            .await
            .map_err(|e| e.or_generic("Failed to sign in"))?;

        self.state.send_modify(|s| {
            s.identity = Some(identity.clone());
            s.resolved = true;
        });
        tracing::info!(user_id = %identity.id, "Signed in");
        Ok(identity)
    }

    /// End the session. The local identity is cleared even if the backend
    /// call fails.
    pub async fn sign_out(&self) -> Result<()> {
        let result = self
            .backend
            .sign_out()
            .await
            .map_err(|e| e.or_generic("Failed to sign out"));

        self.state.send_modify(|s| {
            s.identity = None;
            s.resolved = true;
        });

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Sign-out failed at the backend; cleared locally");
        }
        result
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        // Dropping the task drops its subscription.
        self.listener.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use std::time::Duration;

    fn sign_up_form(email: &str) -> SignUpForm {
        SignUpForm {
            email: email.to_string(),
            password: "secret123".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolves_to_signed_out() {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::start(backend);

        let state = store.wait_resolved().await;
        assert!(state.resolved);
        assert!(!state.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::start(backend);
        store.wait_resolved().await;

        let who = store.sign_up(&sign_up_form("ann@example.com")).await.unwrap();
        store.sign_out().await.unwrap();
        assert_eq!(store.identity(), None);

        let signed_in = store
            .sign_in(&SignInForm {
                email: "ann@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(signed_in.id, who.id);
        assert_eq!(store.require_identity().unwrap().id, who.id);
    }

    #[tokio::test]
    async fn test_follows_backend_session_changes() {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::start(backend.clone());
        store.wait_resolved().await;

        // Sign in behind the store's back; the notification should reach it.
        let who = backend
            .sign_up("ann@example.com", "secret123", &UserMetadata::default())
            .await
            .unwrap();

        let mut rx = store.state.subscribe();
        let state = tokio::time::timeout(
            Duration::from_secs(1),
            rx.wait_for(|s| s.identity.is_some()),
        )
        .await
        .expect("session change not observed")
        .unwrap()
        .clone();
        assert_eq!(state.identity.unwrap().id, who.id);
    }

    #[tokio::test]
    async fn test_invalid_sign_up_never_reaches_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::start(backend.clone());

        let mut form = sign_up_form("ann@example.com");
        form.first_name = "   ".to_string();

        let err = store.sign_up(&form).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "First name is required");

        // The account was not created.
        let err = backend.sign_in("ann@example.com", "secret123").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_sign_out_clears_identity_even_on_failure() {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::start(backend.clone());
        store.wait_resolved().await;
        store.sign_up(&sign_up_form("ann@example.com")).await.unwrap();
        store
            .sign_in(&SignInForm {
                email: "ann@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        backend.fail_next(AppError::Network("connection reset".to_string()));
        let err = store.sign_out().await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to sign out");
        assert_eq!(store.identity(), None);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let backend = Arc::new(MemoryBackend::new());
        let store = SessionStore::start(backend.clone());
        store.wait_resolved().await;
        assert_eq!(backend.session_subscribers(), 1);

        drop(store);
        // Abort is processed by the runtime; give it a turn.
        for _ in 0..10 {
            if backend.session_subscribers() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(backend.session_subscribers(), 0);
    }
}
