//! Credential-table auth gate for tests and local demos.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use coupon_codes_core::Email;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{info, warn};

use super::{AuthError, AuthGate, Session, SessionCell};

/// Lifetime of issued sessions unless overridden.
const DEFAULT_SESSION_TTL: TimeDelta = TimeDelta::hours(1);

/// Auth gate that accepts a fixed set of admin accounts.
#[derive(Debug)]
pub struct StaticAuthGate {
    accounts: HashMap<Email, SecretString>,
    session_ttl: TimeDelta,
    session: SessionCell,
}

impl Default for StaticAuthGate {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            session_ttl: DEFAULT_SESSION_TTL,
            session: SessionCell::new(),
        }
    }
}

impl StaticAuthGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an admin account.
    #[must_use]
    pub fn with_admin(mut self, email: Email, password: impl Into<String>) -> Self {
        self.accounts
            .insert(email, SecretString::from(password.into()));
        self
    }

    /// Lifetime of sessions issued from now on.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: TimeDelta) -> Self {
        self.session_ttl = ttl;
        self
    }
}

#[async_trait]
impl AuthGate for StaticAuthGate {
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        let accepted = self
            .accounts
            .get(email)
            .is_some_and(|expected| expected.expose_secret() == password.expose_secret());
        if !accepted {
            warn!(email = %email, "Admin sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let user_id = format!("static-{}", uuid::Uuid::new_v4().simple());
        let session = Session::new(
            user_id,
            email.clone(),
            SecretString::from(uuid::Uuid::new_v4().to_string()),
            Utc::now() + self.session_ttl,
        );
        self.session.set(Some(session.clone()));
        info!(email = %email, "Admin signed in");
        Ok(session)
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
