//! The session store: restore, sign-in, sign-out, and change notification.

use tokio::sync::watch;
use tracing::debug;

use crate::error::SessionResult;
use crate::storage::{SessionStorage, KEY_TOKEN, KEY_USER};
use crate::types::{Session, User};

/// Single source of truth for the current authentication state.
///
/// Every mutation is persisted first and only then published, so a
/// subscriber never observes a session the durable storage does not hold.
pub struct SessionStore<S: SessionStorage> {
    storage: S,
    current: watch::Sender<Session>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Create a store with an empty session. Call [`restore`](Self::restore)
    /// before handing the store to the UI.
    pub fn new(storage: S) -> Self {
        let (current, _) = watch::channel(Session::anonymous());
        Self { storage, current }
    }

    /// Attempt to restore a persisted session.
    ///
    /// The session is populated only when both the `user` and `token` keys
    /// are present and the user record parses. Every failure mode (missing
    /// key, partial pair, malformed record, storage error) leaves the
    /// session anonymous; none of them is surfaced to the caller.
    pub async fn restore(&self) {
        let stored_user = match self.storage.load(KEY_USER).await {
            Ok(value) => value,
            Err(e) => {
                debug!("Could not read stored user: {}", e);
                None
            }
        };
        let stored_token = match self.storage.load(KEY_TOKEN).await {
            Ok(value) => value,
            Err(e) => {
                debug!("Could not read stored token: {}", e);
                None
            }
        };

        let (Some(user_json), Some(token)) = (stored_user, stored_token) else {
            debug!("No complete session found in storage");
            return;
        };

        match serde_json::from_str::<User>(&user_json) {
            Ok(user) => {
                self.current
                    .send_replace(Session::authenticated(user, token));
            }
            Err(e) => {
                debug!("Stored user record is malformed, treating as absent: {}", e);
            }
        }
    }

    /// Persist the credential pair, then publish the new session.
    ///
    /// On a storage failure the in-memory session is left untouched.
    pub async fn sign_in(&self, user: User, token: impl Into<String>) -> SessionResult<()> {
        let token = token.into();
        let user_json = serde_json::to_string(&user)?;
        self.storage.store(KEY_USER, &user_json).await?;
        self.storage.store(KEY_TOKEN, &token).await?;
        self.current.send_replace(Session::authenticated(user, token));
        Ok(())
    }

    /// Clear both storage keys and reset the session to anonymous.
    pub async fn sign_out(&self) -> SessionResult<()> {
        self.storage.remove(KEY_USER).await?;
        self.storage.remove(KEY_TOKEN).await?;
        self.current.send_replace(Session::anonymous());
        Ok(())
    }

    /// The current session. Never fails.
    pub fn read(&self) -> Session {
        self.current.borrow().clone()
    }

    /// Whether a user is currently signed in.
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_authenticated()
    }

    /// Subscribe to session changes.
    ///
    /// The receiver holds the latest session at all times; each sign-in or
    /// sign-out publishes a new value.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::Role;

    fn sample_user() -> User {
        User {
            id: "1".to_string(),
            username: "a".to_string(),
            email: "a@b.c".to_string(),
            role: Role::Client,
        }
    }

    #[tokio::test]
    async fn test_sign_in_updates_session_and_storage() {
        let store = SessionStore::new(MemoryStorage::new());
        store.sign_in(sample_user(), "t").await.unwrap();

        let session = store.read();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("t"));
        assert_eq!(
            store.storage.load(KEY_TOKEN).await.unwrap(),
            Some("t".to_string())
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_both_keys() {
        let store = SessionStore::new(MemoryStorage::new());
        store.sign_in(sample_user(), "t").await.unwrap();
        store.sign_out().await.unwrap();

        assert!(!store.is_authenticated());
        assert_eq!(store.storage.load(KEY_USER).await.unwrap(), None);
        assert_eq!(store.storage.load(KEY_TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let store = SessionStore::new(MemoryStorage::new());
        let mut rx = store.subscribe();
        assert!(!rx.borrow().is_authenticated());

        store.sign_in(sample_user(), "t").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());

        store.sign_out().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }
}
