// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session change notifications shared by the backend implementations.

use tokio::sync::watch;

use crate::models::Identity;

/// Broadcasts the current identity to every subscriber.
#[derive(Debug)]
pub struct SessionChannel {
    tx: watch::Sender<Option<Identity>>,
}

impl Default for SessionChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Publish a new session state. Subscribers are woken even if the
    /// identity did not change (e.g. a repeated sign-in).
    pub fn publish(&self, identity: Option<Identity>) {
        self.tx.send_replace(identity);
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Handle for one session listener. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<Option<Identity>>,
}

impl SessionSubscription {
    /// Wait for the next session change.
    ///
    /// Returns `None` once the backend has been dropped.
    pub async fn changed(&mut self) -> Option<Option<Identity>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn current(&self) -> Option<Identity> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserMetadata;
    use uuid::Uuid;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: Some("ann@example.com".to_string()),
            user_metadata: UserMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_sees_published_identity() {
        let channel = SessionChannel::new();
        let mut sub = channel.subscribe();
        let who = identity();

        channel.publish(Some(who.clone()));
        assert_eq!(sub.changed().await, Some(Some(who)));

        channel.publish(None);
        assert_eq!(sub.changed().await, Some(None));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let channel = SessionChannel::new();
        let sub = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 1);
        drop(sub);
        assert_eq!(channel.subscriber_count(), 0);
    }
}
