//! Admin authentication.
//!
//! An [`AuthGate`] signs admins in with email and password and publishes the
//! current session. Every rejection surfaces as the same
//! [`AuthError::InvalidCredentials`], so callers cannot tell an unknown email
//! from a wrong password.

pub mod firebase;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coupon_codes_core::Email;
use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::watch;

pub use firebase::FirebaseAuthGate;
pub use memory::StaticAuthGate;

/// Authentication failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Please sign in to continue.")]
    SignInRequired,
}

/// An authenticated admin.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: String,
    email: Email,
    id_token: SecretString,
    expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub const fn new(
        user_id: String,
        email: Email,
        id_token: SecretString,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            email,
            id_token,
            expires_at,
        }
    }

    /// Provider-assigned user ID.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Bearer token authorizing backend writes.
    #[must_use]
    pub const fn id_token(&self) -> &SecretString {
        &self.id_token
    }

    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session had expired at the given instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the session is still valid now.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_expired_at(Utc::now())
    }
}

/// Email/password sign-in with an observable current session.
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Verify credentials and make the resulting session current.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for any rejection.
    async fn sign_in(&self, email: &Email, password: &SecretString)
    -> Result<Session, AuthError>;

    /// Clear the current session. Never fails.
    async fn sign_out(&self);

    /// The session as of now, if any.
    fn current_session(&self) -> Option<Session>;

    /// Watch the current session; receivers see every sign-in and sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

/// Holder for the current session shared by gate implementations.
#[derive(Debug)]
pub(crate) struct SessionCell {
    sender: watch::Sender<Option<Session>>,
}

impl SessionCell {
    pub(crate) fn new() -> Self {
        Self {
            sender: watch::Sender::new(None),
        }
    }

    pub(crate) fn set(&self, session: Option<Session>) {
        self.sender.send_replace(session);
    }

    pub(crate) fn get(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}
