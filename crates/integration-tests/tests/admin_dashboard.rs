//! Admin dashboard: approval, ordering, deletion, categories and submissions.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use coupon_codes_catalog::{CatalogError, CatalogViewModel, Collection};
use coupon_codes_core::{CategoryId, CouponForm, CouponId, Locale, ValidationError};
use coupon_codes_integration_tests::{
    admin_catalog, category, coupon, public_catalog, seeded_store,
};
use serde_json::Value;

fn stored_field(
    store: &coupon_codes_catalog::InMemoryStore,
    id: &CouponId,
    field: &str,
) -> Option<Value> {
    store
        .document(Collection::Coupons, id.as_str())
        .and_then(|doc| doc.fields.get(field).cloned())
}

fn find(catalog: &CatalogViewModel, title_en: &str) -> CouponId {
    catalog
        .coupons()
        .into_iter()
        .find(|c| c.title_en == title_en)
        .map(|c| c.id)
        .unwrap()
}

// =============================================================================
// Approval
// =============================================================================

#[tokio::test]
async fn test_approval_round_trip_reaches_public_catalog() {
    let store = seeded_store(
        vec![coupon("Noon", "نون", ("Fashion", "أزياء"), false, Some(1))],
        vec![],
    );
    let admin = admin_catalog(&store).await;
    assert_eq!(admin.pending_coupons().len(), 1);
    assert!(admin.approved_coupons().is_empty());

    let id = find(&admin, "Noon");
    admin.set_approval(&id, true).await.unwrap();
    assert!(admin.pending_coupons().is_empty());
    assert_eq!(stored_field(&store, &id, "approved"), Some(Value::Bool(true)));

    let public = public_catalog(&store).await;
    assert_eq!(public.displayed(Locale::En).len(), 1);

    admin.set_approval(&id, false).await.unwrap();
    public.reload().await.unwrap();
    assert!(public.displayed(Locale::En).is_empty());
    assert_eq!(admin.pending_coupons()[0].id, id);
}

#[tokio::test]
async fn test_blank_order_submission_is_listed_as_pending() {
    let mut legacy = coupon("Careem", "كريم", ("Travel", "سفر"), false, None);
    legacy.insert("order".to_string(), Value::from(""));
    let store = seeded_store(vec![legacy], vec![]);
    let admin = admin_catalog(&store).await;

    let pending = admin.pending_coupons();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title_en, "Careem");
    assert_eq!(pending[0].order, None);
    assert_eq!(admin.order_input(&pending[0].id), "");

    admin.set_approval(&pending[0].id, true).await.unwrap();
    let public = public_catalog(&store).await;
    assert_eq!(public.displayed(Locale::En).len(), 1);
}

#[tokio::test]
async fn test_public_catalog_cannot_mutate() {
    let store = seeded_store(
        vec![coupon("Noon", "نون", ("Fashion", "أزياء"), true, Some(1))],
        vec![category("Fashion", "أزياء")],
    );
    let public = public_catalog(&store).await;
    let id = public.coupons()[0].id.clone();
    let category_id = public.categories()[0].id.clone();
    let calls = store.call_count();

    assert!(matches!(
        public.set_approval(&id, false).await,
        Err(CatalogError::AdminOnly)
    ));
    assert!(matches!(
        public.delete_coupon(&id).await,
        Err(CatalogError::AdminOnly)
    ));
    assert!(matches!(
        public.add_category("Food", "طعام").await,
        Err(CatalogError::AdminOnly)
    ));
    assert!(matches!(
        public.delete_category(&category_id).await,
        Err(CatalogError::AdminOnly)
    ));
    assert_eq!(store.call_count(), calls);
}

#[tokio::test]
async fn test_unknown_coupon_is_rejected_locally() {
    let store = seeded_store(vec![], vec![]);
    let admin = admin_catalog(&store).await;
    let calls = store.call_count();

    let missing = CouponId::new("gone");
    assert!(matches!(
        admin.set_order(&missing, 1).await,
        Err(CatalogError::UnknownCoupon(id)) if id == missing
    ));
    assert_eq!(store.call_count(), calls);
}

#[tokio::test]
async fn test_failed_write_leaves_state_untouched() {
    let store = seeded_store(
        vec![coupon("Noon", "نون", ("Fashion", "أزياء"), false, None)],
        vec![],
    );
    let admin = admin_catalog(&store).await;
    let id = find(&admin, "Noon");

    store.set_failing(Collection::Coupons, true);
    let err = admin.set_approval(&id, true).await.unwrap_err();
    assert!(matches!(err, CatalogError::Remote(_)));
    assert!(!admin.coupons()[0].approved);
    assert!(!admin.is_loading());

    store.set_failing(Collection::Coupons, false);
    admin.set_approval(&id, true).await.unwrap();
    assert!(admin.coupons()[0].approved);
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_order_drafts_commit_and_sort() {
    let store = seeded_store(
        vec![
            coupon("First", "الأول", ("Food", "طعام"), true, Some(1)),
            coupon("Second", "الثاني", ("Food", "طعام"), true, Some(2)),
            coupon("Loose", "حر", ("Food", "طعام"), true, None),
        ],
        vec![],
    );
    let admin = admin_catalog(&store).await;
    let loose = find(&admin, "Loose");
    assert_eq!(admin.order_input(&loose), "");

    admin.edit_order_draft(&loose, " 0 ");
    assert_eq!(admin.order_input(&loose), " 0 ");
    assert_eq!(admin.commit_order_draft(&loose).await.unwrap(), 0);
    assert_eq!(admin.order_input(&loose), "0");
    assert_eq!(stored_field(&store, &loose, "order"), Some(Value::from(0)));

    let titles: Vec<String> = admin
        .approved_coupons()
        .into_iter()
        .map(|c| c.title_en)
        .collect();
    assert_eq!(titles, ["Loose", "First", "Second"]);
}

#[tokio::test]
async fn test_invalid_order_draft_makes_no_call() {
    let store = seeded_store(
        vec![coupon("Noon", "نون", ("Fashion", "أزياء"), true, Some(4))],
        vec![],
    );
    let admin = admin_catalog(&store).await;
    let id = find(&admin, "Noon");
    let calls = store.call_count();

    admin.edit_order_draft(&id, "first");
    let err = admin.commit_order_draft(&id).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::InvalidOrder(_))
    ));
    assert_eq!(store.call_count(), calls);
    assert_eq!(admin.coupons()[0].order, Some(4));
    assert_eq!(admin.order_input(&id), "first");
}

#[tokio::test]
async fn test_empty_draft_falls_back_to_saved_order() {
    let store = seeded_store(
        vec![coupon("Noon", "نون", ("Fashion", "أزياء"), true, Some(4))],
        vec![],
    );
    let admin = admin_catalog(&store).await;
    let id = find(&admin, "Noon");

    admin.edit_order_draft(&id, "");
    assert_eq!(admin.order_input(&id), "4");
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_order_writes_last_issued_wins() {
    let store = seeded_store(
        vec![coupon("Noon", "نون", ("Fashion", "أزياء"), true, Some(4))],
        vec![],
    );
    let admin = Arc::new(admin_catalog(&store).await);
    let id = find(&admin, "Noon");

    store.push_update_delay(std::time::Duration::from_millis(200));
    store.push_update_delay(std::time::Duration::from_millis(10));

    let slow = {
        let admin = Arc::clone(&admin);
        let id = id.clone();
        tokio::spawn(async move { admin.set_order(&id, 1).await })
    };
    tokio::task::yield_now().await;
    let fast = {
        let admin = Arc::clone(&admin);
        let id = id.clone();
        tokio::spawn(async move { admin.set_order(&id, 2).await })
    };

    slow.await.unwrap().unwrap();
    fast.await.unwrap().unwrap();
    assert_eq!(admin.coupons()[0].order, Some(2));
    assert_eq!(stored_field(&store, &id, "order"), Some(Value::from(2)));
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test]
async fn test_delete_coupon_removes_it_everywhere() {
    let store = seeded_store(
        vec![
            coupon("Noon", "نون", ("Fashion", "أزياء"), true, Some(1)),
            coupon("Namshi", "نمشي", ("Fashion", "أزياء"), false, None),
        ],
        vec![],
    );
    let admin = admin_catalog(&store).await;
    let id = find(&admin, "Namshi");
    admin.edit_order_draft(&id, "3");

    admin.delete_coupon(&id).await.unwrap();
    assert!(admin.pending_coupons().is_empty());
    assert_eq!(admin.coupons().len(), 1);
    assert!(store.document(Collection::Coupons, id.as_str()).is_none());
    assert!(matches!(
        admin.delete_coupon(&id).await,
        Err(CatalogError::UnknownCoupon(_))
    ));
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_add_category_with_blank_name_makes_no_call() {
    let store = seeded_store(vec![], vec![]);
    let admin = admin_catalog(&store).await;
    let calls = store.call_count();

    let err = admin.add_category("", "Name").await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::MissingField("name_en"))
    ));
    let err = admin.add_category("Name", "   ").await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::MissingField("name_ar"))
    ));
    assert_eq!(store.call_count(), calls);
    assert!(store.is_empty(Collection::Categories));
}

#[tokio::test]
async fn test_add_category_refreshes_options() {
    let store = seeded_store(vec![], vec![category("Food", "طعام")]);
    let admin = admin_catalog(&store).await;

    admin.add_category("Travel", "سفر").await.unwrap();
    let labels: Vec<String> = admin
        .category_options(Locale::Ar)
        .into_iter()
        .map(|o| o.label)
        .collect();
    assert_eq!(labels, ["الكل", "طعام", "سفر"]);
    assert_eq!(store.len(Collection::Categories), 2);
}

#[tokio::test]
async fn test_delete_category_keeps_coupon_labels() {
    let store = seeded_store(
        vec![coupon("Talabat", "طلبات", ("Food", "طعام"), true, Some(1))],
        vec![category("Food", "طعام")],
    );
    let admin = admin_catalog(&store).await;
    let id = admin.categories()[0].id.clone();

    admin.delete_category(&id).await.unwrap();
    assert!(admin.categories().is_empty());
    assert_eq!(admin.coupons()[0].category_en, "Food");

    let public = public_catalog(&store).await;
    public.select_category(coupon_codes_core::CategoryFilter::named("Food"));
    assert_eq!(public.displayed(Locale::En).len(), 1);

    assert!(matches!(
        admin.delete_category(&CategoryId::new("gone")).await,
        Err(CatalogError::UnknownCategory(_))
    ));
}

// =============================================================================
// Coupon submission
// =============================================================================

fn filled_form() -> CouponForm {
    CouponForm {
        title_en: "Careem".to_string(),
        title_ar: "كريم".to_string(),
        code_value_en: "15% off".to_string(),
        code_value_ar: "خصم ١٥٪".to_string(),
        code: "CAREEM15".to_string(),
        logo_url: "https://cdn.example/careem.png".to_string(),
        ..CouponForm::default()
    }
}

#[tokio::test]
async fn test_admin_adds_pending_coupon() {
    let store = seeded_store(vec![], vec![category("Travel", "سفر")]);
    let admin = admin_catalog(&store).await;
    let category_id = admin.categories()[0].id.clone();

    admin.set_coupon_form(filled_form());
    admin.choose_form_category(&category_id).unwrap();
    let added = admin.add_coupon().await.unwrap();

    assert!(!added.approved);
    assert_eq!(added.order, None);
    assert_eq!(added.category_ar, "سفر");
    assert!(admin.coupon_form().is_empty());
    assert_eq!(admin.pending_coupons(), vec![added.clone()]);

    let stored = store
        .document(Collection::Coupons, added.id.as_str())
        .unwrap();
    assert_eq!(stored.fields.get("approved"), Some(&Value::Bool(false)));
    assert_eq!(
        stored.fields.get("codeVal_en"),
        Some(&Value::from("15% off"))
    );
    assert!(!stored.fields.contains_key("order"));
}

#[tokio::test]
async fn test_public_submission_stays_hidden() {
    let store = seeded_store(vec![], vec![]);
    let public = public_catalog(&store).await;

    public.set_coupon_form(filled_form());
    public.edit_coupon_form(|form| {
        form.category_en = "Travel".to_string();
        form.category_ar = "سفر".to_string();
    });
    public.add_coupon().await.unwrap();

    assert!(public.coupons().is_empty());
    assert_eq!(store.len(Collection::Coupons), 1);
    public.reload().await.unwrap();
    assert!(public.displayed(Locale::En).is_empty());
}

#[tokio::test]
async fn test_incomplete_form_is_kept() {
    let store = seeded_store(vec![], vec![]);
    let admin = admin_catalog(&store).await;
    let calls = store.call_count();

    admin.set_coupon_form(filled_form());
    let err = admin.add_coupon().await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::MissingField("category_en"))
    ));
    assert_eq!(admin.coupon_form(), filled_form());
    assert_eq!(store.call_count(), calls);
}
