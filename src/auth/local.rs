//! In-process account book standing in for the hosted provider when no API
//! key is configured. Accounts last for the lifetime of the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{AuthError, IdentityProvider, Session, SessionStore};

const INVALID_CREDENTIAL: &str =
    "[auth/invalid-credential] The supplied auth credential is incorrect, malformed or has expired.";
const EMAIL_IN_USE: &str =
    "[auth/email-already-in-use] The email address is already in use by another account.";

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Debug, Default)]
struct Book {
    accounts: HashMap<String, Account>,
    issued: u64,
}

#[derive(Clone, Default)]
pub struct LocalIdentity {
    book: Arc<Mutex<Book>>,
    store: SessionStore,
    latency: Duration,
}

impl LocalIdentity {
    pub fn new(store: SessionStore) -> Self {
        LocalIdentity {
            book: Arc::default(),
            store,
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency` to mimic a network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Book> {
        self.book.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn session_for(email: &str, account: &Account, issued: u64) -> Session {
        Session {
            uid: account.uid.clone(),
            email: email.to_string(),
            display_name: account.display_name.clone(),
            id_token: format!("local-token-{issued}"),
            refresh_token: String::new(),
        }
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let key = email.to_lowercase();
        let mut book = self.lock();
        book.issued += 1;
        let issued = book.issued;
        match book.accounts.get(&key) {
            Some(account) if account.password == password => {
                Ok(Self::session_for(&key, account, issued))
            }
            _ => Err(AuthError::Rejected(INVALID_CREDENTIAL.to_string())),
        }
    }

    fn register(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let key = email.to_lowercase();
        let mut book = self.lock();
        if book.accounts.contains_key(&key) {
            return Err(AuthError::Rejected(EMAIL_IN_USE.to_string()));
        }
        book.issued += 1;
        let issued = book.issued;
        let account = Account {
            uid: format!("local-{issued}"),
            password: password.to_string(),
            display_name: None,
        };
        let session = Self::session_for(&key, &account, issued);
        book.accounts.insert(key, account);
        Ok(session)
    }

    fn rename(&self, name: &str) -> Result<Session, AuthError> {
        let mut session = self.store.current().ok_or(AuthError::NoSession)?;
        {
            let mut book = self.lock();
            let account = book
                .accounts
                .get_mut(&session.email)
                .ok_or(AuthError::NoSession)?;
            account.display_name = Some(name.to_string());
        }
        session.display_name = Some(name.to_string());
        Ok(session)
    }
}

impl IdentityProvider for LocalIdentity {
    fn sign_in(&self, email: &str, password: &str) -> BoxFuture<'static, Result<Session, AuthError>> {
        let this = self.clone();
        let (email, password) = (email.to_string(), password.to_string());
        async move {
            tokio::time::sleep(this.latency).await;
            let session = this.authenticate(&email, &password)?;
            this.store.publish(Some(session.clone())).await;
            Ok(session)
        }
        .boxed()
    }

    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'static, Result<Session, AuthError>> {
        let this = self.clone();
        let (email, password) = (email.to_string(), password.to_string());
        async move {
            tokio::time::sleep(this.latency).await;
            let session = this.register(&email, &password)?;
            this.store.publish(Some(session.clone())).await;
            Ok(session)
        }
        .boxed()
    }

    fn update_display_name(&self, name: &str) -> BoxFuture<'static, Result<(), AuthError>> {
        let this = self.clone();
        let name = name.to_string();
        async move {
            tokio::time::sleep(this.latency).await;
            let session = this.rename(&name)?;
            this.store.publish(Some(session)).await;
            Ok(())
        }
        .boxed()
    }

    fn sign_out(&self) -> BoxFuture<'static, ()> {
        let store = self.store.clone();
        async move { store.publish(None).await }.boxed()
    }

    fn sessions(&self) -> &SessionStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_sign_in() {
        let identity = LocalIdentity::new(SessionStore::new());
        let created = identity.create_account("Ada@Example.com", "secret1").await.unwrap();
        assert_eq!(created.email, "ada@example.com");
        assert_eq!(identity.sessions().current(), Some(created.clone()));

        identity.sign_out().await;
        assert_eq!(identity.sessions().current(), None);

        let session = identity.sign_in("ada@example.com", "secret1").await.unwrap();
        assert_eq!(session.uid, created.uid);
    }

    #[tokio::test]
    async fn duplicate_account_is_rejected_with_provider_message() {
        let identity = LocalIdentity::new(SessionStore::new());
        identity.create_account("a@b.co", "secret1").await.unwrap();
        let err = identity.create_account("a@b.co", "other12").await.unwrap_err();
        assert_eq!(err.to_string(), EMAIL_IN_USE);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_and_session_untouched() {
        let identity = LocalIdentity::new(SessionStore::new());
        identity.create_account("a@b.co", "secret1").await.unwrap();
        identity.sign_out().await;

        let err = identity.sign_in("a@b.co", "nope123").await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIAL);
        assert_eq!(identity.sessions().current(), None);
    }

    #[tokio::test]
    async fn display_name_is_published_and_kept() {
        let identity = LocalIdentity::new(SessionStore::new());
        identity.create_account("a@b.co", "secret1").await.unwrap();
        identity.update_display_name("Ada").await.unwrap();
        assert_eq!(
            identity.sessions().current().and_then(|s| s.display_name),
            Some("Ada".to_string())
        );

        identity.sign_out().await;
        let session = identity.sign_in("a@b.co", "secret1").await.unwrap();
        assert_eq!(session.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn saved_session_follows_sign_in_and_sign_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let identity = LocalIdentity::new(SessionStore::persistent(path.clone()));

        identity.create_account("a@b.co", "secret1").await.unwrap();
        identity.update_display_name("Ada").await.unwrap();
        let saved = SessionStore::persistent(path.clone()).current();
        assert_eq!(saved.and_then(|s| s.display_name).as_deref(), Some("Ada"));

        identity.sign_out().await;
        assert!(!path.exists());
    }
}
