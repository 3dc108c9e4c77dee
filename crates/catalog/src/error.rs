//! Unified catalog error type.
//!
//! Every view-model intent returns `Result<T, CatalogError>`. Intents either
//! fully succeed or leave the local state untouched.

use coupon_codes_core::{CategoryId, CouponId, ValidationError};
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::RemoteError;

/// Catalog-level error type.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input rejected before any backend call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backend operation failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Authentication failed or is required.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// No loaded coupon has this ID.
    #[error("Unknown coupon: {0}")]
    UnknownCoupon(CouponId),

    /// No loaded category has this ID.
    #[error("Unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// The intent is only available on the admin dashboard.
    #[error("This action requires the admin dashboard")]
    AdminOnly,
}

impl CatalogError {
    /// Message safe to show to the person using the catalog.
    ///
    /// Backend details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Remote(_) => "Something went wrong. Please try again.".to_string(),
            Self::Auth(err) => err.to_string(),
            Self::UnknownCoupon(_) => "That coupon no longer exists.".to_string(),
            Self::UnknownCategory(_) => "That category no longer exists.".to_string(),
            Self::AdminOnly => "Please sign in to continue.".to_string(),
        }
    }
}

/// Result type alias for `CatalogError`.
pub type Result<T> = std::result::Result<T, CatalogError>;
