//! Firebase Authentication over the Identity Toolkit REST API.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{AuthError, IdentityProvider, Session, SessionStore};

const IDENTITY_TOOLKIT: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Clone)]
pub struct FirebaseIdentity {
    http: reqwest::Client,
    api_key: Arc<str>,
    endpoint: Arc<str>,
    store: SessionStore,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl From<AccountResponse> for Session {
    fn from(account: AccountResponse) -> Self {
        Session {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|name| !name.is_empty()),
            id_token: account.id_token,
            refresh_token: account.refresh_token,
        }
    }
}

impl FirebaseIdentity {
    pub fn new(api_key: impl Into<Arc<str>>, store: SessionStore) -> Self {
        FirebaseIdentity {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: Arc::from(IDENTITY_TOOLKIT),
            store,
        }
    }

    /// Point at a different Identity Toolkit host, e.g. the local emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<Arc<str>>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.endpoint, method, self.api_key)
    }

    fn password_call(
        &self,
        method: &'static str,
        email: &str,
        password: &str,
    ) -> BoxFuture<'static, Result<Session, AuthError>> {
        let this = self.clone();
        let email = email.to_string();
        let password = password.to_string();
        async move {
            let body = PasswordRequest {
                email: &email,
                password: &password,
                return_secure_token: true,
            };
            let account: AccountResponse = this.post(method, &body).await?;
            let session = Session::from(account);
            this.store.publish(Some(session.clone())).await;
            Ok(session)
        }
        .boxed()
    }

    async fn post<B, T>(&self, method: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        decode_response(status, &text)
    }
}

/// Turn an Identity Toolkit reply into a value or the service's own message.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, AuthError> {
    if status.is_success() {
        return serde_json::from_str(body).map_err(|e| AuthError::Malformed(e.to_string()));
    }
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => Err(AuthError::Rejected(envelope.error.message)),
        Err(_) => Err(AuthError::Rejected(format!("{}: {}", status, body.trim()))),
    }
}

impl IdentityProvider for FirebaseIdentity {
    fn sign_in(&self, email: &str, password: &str) -> BoxFuture<'static, Result<Session, AuthError>> {
        self.password_call("signInWithPassword", email, password)
    }

    fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'static, Result<Session, AuthError>> {
        self.password_call("signUp", email, password)
    }

    fn update_display_name(&self, name: &str) -> BoxFuture<'static, Result<(), AuthError>> {
        let this = self.clone();
        let name = name.to_string();
        async move {
            let mut session = this.store.current().ok_or(AuthError::NoSession)?;
            let body = ProfileRequest {
                id_token: &session.id_token,
                display_name: &name,
                return_secure_token: true,
            };
            let profile: ProfileResponse = this.post("update", &body).await?;

            session.display_name = profile.display_name.or(Some(name));
            if let Some(token) = profile.id_token {
                session.id_token = token;
            }
            if let Some(token) = profile.refresh_token {
                session.refresh_token = token;
            }
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

    #[test]
    fn success_body_becomes_session() {
        let body = r#"{
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "abc123",
            "email": "user@example.com",
            "displayName": "",
            "idToken": "token",
            "registered": true,
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }"#;
        let account: AccountResponse = decode_response(StatusCode::OK, body).unwrap();
        let session = Session::from(account);
        assert_eq!(session.uid, "abc123");
        assert_eq!(session.email, "user@example.com");
        assert_eq!(session.display_name, None);
    }

    #[test]
    fn error_message_is_surfaced_verbatim() {
        let body = r#"{"error":{"code":400,"message":"INVALID_LOGIN_CREDENTIALS","errors":[]}}"#;
        let err = decode_response::<AccountResponse>(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(err, AuthError::Rejected("INVALID_LOGIN_CREDENTIALS".to_string()));
        assert_eq!(err.to_string(), "INVALID_LOGIN_CREDENTIALS");
    }

    #[test]
    fn unstructured_error_keeps_status_and_body() {
        let err =
            decode_response::<AccountResponse>(StatusCode::BAD_GATEWAY, "upstream down\n").unwrap_err();
        assert_eq!(err.to_string(), "502 Bad Gateway: upstream down");
    }

    #[test]
    fn garbage_success_body_is_malformed() {
        let err = decode_response::<AccountResponse>(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[test]
    fn urls_carry_method_and_key() {
        let identity = FirebaseIdentity::new("k3y", SessionStore::new())
            .with_endpoint("http://localhost:9099/identitytoolkit.googleapis.com/v1");
        assert_eq!(
            identity.url("signUp"),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/accounts:signUp?key=k3y"
        );
    }

    #[tokio::test]
    async fn display_name_needs_a_session() {
        let identity = FirebaseIdentity::new("k", SessionStore::new());
        let err = identity.update_display_name("Ada").await.unwrap_err();
        assert_eq!(err, AuthError::NoSession);
    }

    #[tokio::test]
    async fn sign_out_clears_the_store() {
        let store = SessionStore::new();
        store.publish(Some(Session {
            uid: "u".into(),
            email: "e@x.io".into(),
            display_name: None,
            id_token: String::new(),
            refresh_token: String::new(),
        }))
        .await;
        let identity = FirebaseIdentity::new("k", store.clone());
        identity.sign_out().await;
        assert_eq!(store.current(), None);
    }
}
