//! Identity provider seam and the session store it publishes into.
//!
//! The app never owns a session. It asks a provider to sign in, create an
//! account or sign out, and watches the [`SessionStore`] for the snapshots the
//! provider publishes as a result.

mod firebase;
mod local;
mod persist;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

pub use firebase::FirebaseIdentity;
pub use local::LocalIdentity;

/// A signed-in user as reported by the provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Failures reported by an identity provider. The display text is shown to
/// the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Network(String),
    #[error("unexpected response from identity service: {0}")]
    Malformed(String),
    #[error("no user is currently signed in")]
    NoSession,
}

/// Sign-in backend. Returned futures own everything they need so they can be
/// handed straight to the UI runtime.
pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> BoxFuture<'static, Result<Session, AuthError>>;

    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'static, Result<Session, AuthError>>;

    /// Set the display name of the signed-in user.
    fn update_display_name(&self, name: &str) -> BoxFuture<'static, Result<(), AuthError>>;

    fn sign_out(&self) -> BoxFuture<'static, ()>;

    fn sessions(&self) -> &SessionStore;

    fn subscribe(&self) -> SessionWatch {
        self.sessions().subscribe()
    }
}

/// Holder of the current session snapshot.
///
/// Cloning shares the same underlying channel. When created with a file the
/// snapshot is written there on every change and read back at startup.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Session>>>,
    file: Option<Arc<PathBuf>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        SessionStore {
            tx: Arc::new(tx),
            file: None,
        }
    }

    /// A store backed by `path`, starting from whatever session was saved there.
    pub fn persistent(path: PathBuf) -> Self {
        let restored = persist::load_session(&path);
        if let Some(session) = &restored {
            log::info!("restored session for {}", session.email);
        }
        let (tx, _) = watch::channel(restored);
        SessionStore {
            tx: Arc::new(tx),
            file: Some(Arc::new(path)),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Replace the snapshot, writing the session file first when there is one.
    pub async fn publish(&self, session: Option<Session>) {
        if let Some(path) = self.file.clone() {
            let snapshot = session.clone();
            let written = tokio::task::spawn_blocking(move || match &snapshot {
                Some(session) => persist::save_session(&path, session),
                None => persist::clear_session(&path),
            })
            .await;
            if let Err(e) = written {
                log::error!("session file update did not finish: {}", e);
            }
        }
        match &session {
            Some(session) => log::info!("session: signed in as {}", session.email),
            None => log::info!("session: signed out"),
        }
        self.tx.send_replace(session);
    }

    /// Start watching. The current snapshot is delivered first.
    pub fn subscribe(&self) -> SessionWatch {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();
        SessionWatch { rx }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to session changes; dropping it unsubscribes.
pub struct SessionWatch {
    rx: watch::Receiver<Option<Session>>,
}

impl SessionWatch {
    /// Wait for the next snapshot. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Option<Session>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn into_stream(self) -> impl Stream<Item = Option<Session>> + Send + 'static {
        stream::unfold(self, |mut watch| async move {
            let snapshot = watch.next().await?;
            Some((snapshot, watch))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(email: &str) -> Session {
        Session {
            uid: "u1".to_string(),
            email: email.to_string(),
            display_name: None,
            id_token: "secret-token".to_string(),
            refresh_token: String::new(),
        }
    }

    #[tokio::test]
    async fn subscriber_sees_current_snapshot_first() {
        let store = SessionStore::new();
        let mut watch = store.subscribe();
        assert_eq!(watch.next().await, Some(None));

        store.publish(Some(session("a@b.co"))).await;
        assert_eq!(watch.next().await, Some(Some(session("a@b.co"))));

        store.publish(None).await;
        assert_eq!(watch.next().await, Some(None));
    }

    #[tokio::test]
    async fn late_subscriber_starts_from_latest() {
        let store = SessionStore::new();
        store.publish(Some(session("late@b.co"))).await;
        let mut watch = store.subscribe();
        assert_eq!(watch.next().await, Some(Some(session("late@b.co"))));
    }

    #[tokio::test]
    async fn stream_ends_when_store_is_dropped() {
        use futures::StreamExt;

        let store = SessionStore::new();
        let watch = store.subscribe();
        drop(store);
        let items: Vec<_> = watch.into_stream().collect().await;
        assert_eq!(items, vec![None]);
    }

    #[test]
    fn debug_output_hides_tokens() {
        let text = format!("{:?}", session("a@b.co"));
        assert!(text.contains("a@b.co"));
        assert!(!text.contains("secret-token"));
    }

    #[tokio::test]
    async fn persistent_store_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::persistent(path.clone());
        assert_eq!(store.current(), None);
        store.publish(Some(session("keep@b.co"))).await;

        let reopened = SessionStore::persistent(path.clone());
        assert_eq!(reopened.current(), Some(session("keep@b.co")));

        reopened.publish(None).await;
        assert!(!path.exists());
    }
}
