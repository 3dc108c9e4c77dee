//! Integration tests for Coupon Codes.
//!
//! Scenario tests drive the catalog view-model against the in-memory store
//! and the static auth gate, so they need no network access.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p coupon-codes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_browsing` - Public listing, filtering and ordering
//! - `admin_dashboard` - Approval, ordering, deletion and categories
//! - `session_routing` - Sign-in and route gating

use std::sync::Arc;

use coupon_codes_catalog::store::Fields;
use coupon_codes_catalog::{
    AuthGate, CatalogViewModel, Collection, InMemoryStore, Session, StaticAuthGate,
};
use coupon_codes_core::Email;
use secrecy::SecretString;
use serde_json::{Value, json};

pub const ADMIN_EMAIL: &str = "admin@codes.example";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

/// Stored fields of a coupon.
///
/// The code is the upper-cased English title.
#[must_use]
pub fn coupon(
    title_en: &str,
    title_ar: &str,
    category: (&str, &str),
    approved: bool,
    order: Option<i64>,
) -> Fields {
    let mut fields = fields(json!({
        "title_en": title_en,
        "title_ar": title_ar,
        "codeVal_en": "10% off",
        "codeVal_ar": "خصم ١٠٪",
        "code": title_en.to_uppercase(),
        "logo": format!("https://cdn.example/{}.png", title_en.to_lowercase()),
        "category_en": category.0,
        "category_ar": category.1,
        "approved": approved,
    }));
    if let Some(order) = order {
        fields.insert("order".to_string(), Value::from(order));
    }
    fields
}

/// Stored fields of a category.
#[must_use]
pub fn category(name_en: &str, name_ar: &str) -> Fields {
    fields(json!({ "name_en": name_en, "name_ar": name_ar }))
}

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// A store seeded with coupons and categories.
#[must_use]
pub fn seeded_store(coupons: Vec<Fields>, categories: Vec<Fields>) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for fields in coupons {
        store.insert(Collection::Coupons, fields);
    }
    for fields in categories {
        store.insert(Collection::Categories, fields);
    }
    store
}

/// Auth gate knowing the test admin.
///
/// # Panics
///
/// Never; the admin email is a valid constant.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn admin_gate() -> StaticAuthGate {
    let email = Email::parse(ADMIN_EMAIL).unwrap();
    StaticAuthGate::new().with_admin(email, ADMIN_PASSWORD)
}

/// Sign the test admin in.
///
/// # Panics
///
/// Panics if the gate rejects the test admin.
#[allow(clippy::unwrap_used)]
pub async fn sign_in_admin(gate: &impl AuthGate) -> Session {
    let email = Email::parse(ADMIN_EMAIL).unwrap();
    gate.sign_in(&email, &SecretString::from(ADMIN_PASSWORD))
        .await
        .unwrap()
}

/// Public catalog over the store, already loaded.
///
/// # Panics
///
/// Panics if the initial load fails.
#[allow(clippy::unwrap_used)]
pub async fn public_catalog(store: &Arc<InMemoryStore>) -> CatalogViewModel {
    let catalog = CatalogViewModel::public(store.clone());
    catalog.reload().await.unwrap();
    catalog
}

/// Admin dashboard over the store, signed in and loaded.
///
/// # Panics
///
/// Panics if sign-in or the initial load fails.
#[allow(clippy::unwrap_used)]
pub async fn admin_catalog(store: &Arc<InMemoryStore>) -> CatalogViewModel {
    let session = sign_in_admin(&admin_gate()).await;
    let catalog = CatalogViewModel::admin(store.clone(), &session).unwrap();
    catalog.reload().await.unwrap();
    catalog
}
