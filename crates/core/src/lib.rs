//! Coupon Codes Core - Shared types library.
//!
//! This crate provides the types used across all Coupon Codes components:
//! - `catalog` - Catalog view-model, backend adapters and authentication gate
//! - `cli` - Command-line front end for browsing and administration
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async runtime. Everything here can be evaluated synchronously
//! over in-memory lists.
//!
//! # Modules
//!
//! - [`types`] - Coupons, categories, IDs, locales, emails and approval status
//! - [`filter`] - Category/search filtering and display ordering
//! - [`validation`] - Caller-side validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod types;
pub mod validation;

pub use filter::*;
pub use types::*;
pub use validation::ValidationError;
