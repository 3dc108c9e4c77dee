//! Coupon Codes catalog library.
//!
//! This crate owns the catalog view-model and the collaborators it talks to:
//!
//! - [`view_model`] - Coupon/category snapshot, derived lists and admin intents
//! - [`store`] - Document store abstraction plus in-memory and Firestore backends
//! - [`auth`] - Admin authentication gate plus static and Firebase Auth backends
//! - [`routing`] - Session gating between the catalog, login and dashboard views
//! - [`preferences`] - Persisted display locale
//! - [`config`] - Environment configuration
//!
//! # Security
//!
//! The Firebase web API key is not a secret on its own, but admin sessions
//! carry ID tokens that grant write access to the catalog. Tokens are kept in
//! `SecretString` and never logged.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod error;
pub mod preferences;
pub mod records;
pub mod routing;
pub mod store;
pub mod view_model;

pub use auth::{AuthError, AuthGate, FirebaseAuthGate, Session, StaticAuthGate};
pub use config::{CatalogConfig, ConfigError, FirebaseConfig};
pub use error::CatalogError;
pub use preferences::{PreferenceError, PreferenceStore};
pub use routing::{Route, resolve_route};
pub use store::{Collection, FirestoreStore, InMemoryStore, RemoteError, RemoteStore};
pub use view_model::{CatalogMode, CatalogViewModel, CouponCard};
