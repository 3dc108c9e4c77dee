//! Core types for Coupon Codes.
//!
//! This module provides typed records for the catalog's domain concepts.

pub mod category;
pub mod coupon;
pub mod email;
pub mod id;
pub mod locale;
pub mod status;

pub use category::{Category, CategoryFilter, NewCategory};
pub use coupon::{Coupon, CouponForm, NewCoupon};
pub use email::{Email, EmailError};
pub use id::*;
pub use locale::Locale;
pub use status::ApprovalStatus;
