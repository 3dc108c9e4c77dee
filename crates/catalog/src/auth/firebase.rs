//! Firebase Authentication (Identity Toolkit) email/password sign-in.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key={api_key}`
//! - Body: `{"email", "password", "returnSecureToken": true}`
//! - Response: `localId`, `email`, `idToken`, `expiresIn` (seconds, as a string)
//!
//! Provider error codes (`EMAIL_NOT_FOUND`, `INVALID_PASSWORD`,
//! `INVALID_LOGIN_CREDENTIALS`, `USER_DISABLED`, ...) are logged and then
//! collapsed into [`AuthError::InvalidCredentials`].

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use coupon_codes_core::Email;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, instrument, warn};
use url::Url;

use super::{AuthError, AuthGate, Session, SessionCell};
use crate::config::FirebaseConfig;

/// Used when the provider omits or garbles `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Auth gate backed by Firebase Authentication.
pub struct FirebaseAuthGate {
    client: reqwest::Client,
    sign_in_url: String,
    api_key: SecretString,
    session: SessionCell,
}

impl std::fmt::Debug for FirebaseAuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAuthGate")
            .field("sign_in_url", &self.sign_in_url)
            .finish_non_exhaustive()
    }
}

impl FirebaseAuthGate {
    /// Create a gate for the configured project.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            sign_in_url: config.sign_in_url(),
            api_key: config.api_key.clone(),
            session: SessionCell::new(),
        })
    }

    async fn request_session(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, String> {
        let mut url = Url::parse(&self.sign_in_url).map_err(|e| format!("bad sign-in URL: {e}"))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        let response = self
            .client
            .post(url)
            .json(&SignInRequest {
                email: email.as_str(),
                password: password.expose_secret(),
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(format!("{status}: {code}"));
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| format!("unexpected response: {e}"))?;
        Ok(session_from_response(body, email.clone()))
    }
}

fn session_from_response(body: SignInResponse, email: Email) -> Session {
    let lifetime = body
        .expires_in
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Session::new(
        body.local_id,
        email,
        SecretString::from(body.id_token),
        Utc::now() + TimeDelta::seconds(lifetime),
    )
}

#[async_trait]
impl AuthGate for FirebaseAuthGate {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        match self.request_session(email, password).await {
            Ok(session) => {
                self.session.set(Some(session.clone()));
                info!(user_id = %session.user_id(), "Admin signed in");
                Ok(session)
            }
            Err(reason) => {
                warn!(reason = %reason, "Admin sign-in rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn sign_out(&self) {
        self.session.set(None);
        info!("Admin signed out");
    }

    fn current_session(&self) -> Option<Session> {
        self.session.get()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(SignInRequest {
            email: "admin@codes.example",
            password: "pw",
            return_secure_token: true,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "email": "admin@codes.example", "password": "pw", "returnSecureToken": true })
        );
    }

    #[test]
    fn test_session_from_response() {
        let body: SignInResponse = serde_json::from_value(json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "uid-42",
            "email": "admin@codes.example",
            "idToken": "eyJhbGciOi",
            "refreshToken": "refresh",
            "expiresIn": "3600",
            "registered": true
        }))
        .unwrap();
        let before = Utc::now();
        let session = session_from_response(body, Email::parse("admin@codes.example").unwrap());
        assert_eq!(session.user_id(), "uid-42");
        assert_eq!(session.id_token().expose_secret(), "eyJhbGciOi");
        assert!(session.expires_at() >= before + TimeDelta::seconds(3600));
    }

    #[test]
    fn test_missing_expiry_uses_default() {
        let body: SignInResponse =
            serde_json::from_value(json!({ "localId": "u", "idToken": "t" })).unwrap();
        let session = session_from_response(body, Email::parse("a@b.c").unwrap());
        assert!(session.is_active());
    }

    #[test]
    fn test_error_envelope() {
        let envelope: ErrorEnvelope = serde_json::from_value(json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS", "errors": [] }
        }))
        .unwrap();
        assert_eq!(envelope.error.message, "INVALID_LOGIN_CREDENTIALS");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = FirebaseConfig {
            api_key: SecretString::from("AIzaHidden"),
            project_id: "codes-test".to_string(),
            database_id: "(default)".to_string(),
            firestore_base_url: "http://localhost:8080".to_string(),
            auth_base_url: "http://localhost:9099".to_string(),
        };
        let gate = FirebaseAuthGate::new(&config).unwrap();
        let debug_output = format!("{gate:?}");
        assert!(debug_output.contains("localhost:9099"));
        assert!(!debug_output.contains("AIzaHidden"));
    }
}
