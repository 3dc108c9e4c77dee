//! Catalog view-model.
//!
//! Owns the loaded coupons and categories, the shopper's filter state and
//! the dashboard's unsaved inputs, and mediates every change to them.
//!
//! # Modes
//!
//! - [`CatalogMode::Public`] - approved coupons only, in display order
//! - [`CatalogMode::Admin`] - every coupon in load order, plus the admin
//!   intents (approve, order, delete, category management)
//!
//! # Consistency
//!
//! Each intent either fully succeeds or leaves the state as it was. Backend
//! writes patch the local copy only after the backend confirms them; category
//! writes re-fetch the category list instead.
//!
//! State lives behind one mutex that is never held across an await. Order
//! writes additionally pass through a fair async gate, so concurrent
//! `set_order` calls land in the order they were issued.

mod display;

pub use display::CouponCard;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use coupon_codes_core::validation::parse_order_input;
use coupon_codes_core::{
    CatalogFilter, Category, CategoryFilter, CategoryId, CategoryOption, Coupon, CouponForm,
    CouponId, Locale, NewCategory, category_options, derive_displayed, sort_by_display_order,
};
use tracing::{error, info, instrument, warn};

use crate::auth::{AuthError, Session};
use crate::error::{CatalogError, Result};
use crate::records;
use crate::routing::require_admin;
use crate::store::{Collection, Document, ListQuery, RemoteError, RemoteStore};

/// Which view the catalog serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogMode {
    Public,
    Admin,
}

#[derive(Debug, Default)]
struct CatalogState {
    coupons: Vec<Coupon>,
    categories: Vec<Category>,
    filter: CatalogFilter,
    /// Unsaved order inputs keyed by coupon.
    order_drafts: HashMap<CouponId, String>,
    form: CouponForm,
}

impl CatalogState {
    fn coupon(&self, id: &CouponId) -> Option<&Coupon> {
        self.coupons.iter().find(|c| &c.id == id)
    }

    fn coupon_mut(&mut self, id: &CouponId) -> Option<&mut Coupon> {
        self.coupons.iter_mut().find(|c| &c.id == id)
    }

    fn replace_coupons(&mut self, coupons: Vec<Coupon>) {
        self.coupons = coupons;
        let Self {
            coupons,
            order_drafts,
            ..
        } = self;
        order_drafts.retain(|id, _| coupons.iter().any(|c| &c.id == id));
    }
}

/// The coupon catalog shared by the public page and the admin dashboard.
pub struct CatalogViewModel {
    store: Arc<dyn RemoteStore>,
    mode: CatalogMode,
    state: Mutex<CatalogState>,
    order_writes: tokio::sync::Mutex<()>,
    in_flight: AtomicUsize,
}

impl std::fmt::Debug for CatalogViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogViewModel")
            .field("mode", &self.mode)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

impl CatalogViewModel {
    /// Catalog for the public page.
    #[must_use]
    pub fn public(store: Arc<dyn RemoteStore>) -> Self {
        Self::new(store, CatalogMode::Public)
    }

    /// Catalog for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignInRequired`] if the session has expired.
    pub fn admin(
        store: Arc<dyn RemoteStore>,
        session: &Session,
    ) -> std::result::Result<Self, AuthError> {
        require_admin(Some(session))?;
        Ok(Self::new(store, CatalogMode::Admin))
    }

    fn new(store: Arc<dyn RemoteStore>, mode: CatalogMode) -> Self {
        Self {
            store,
            mode,
            state: Mutex::new(CatalogState::default()),
            order_writes: tokio::sync::Mutex::new(()),
            in_flight: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> CatalogMode {
        self.mode
    }

    /// Whether a backend call is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace coupons and categories with a fresh copy from the backend.
    ///
    /// Both lists are fetched concurrently. If either fetch fails, neither
    /// list changes. Documents that fail to decode are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns the first backend error.
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn reload(&self) -> Result<()> {
        let _loading = self.loading();
        let coupon_query = self.coupon_query();
        let category_query = ListQuery::all();

        let (coupon_docs, category_docs) = tokio::try_join!(
            self.store.list(Collection::Coupons, &coupon_query),
            self.store.list(Collection::Categories, &category_query),
        )
        .inspect_err(|e| error!(error = %e, "Failed to reload catalog"))?;

        let mut coupons = decode_all(&coupon_docs, records::coupon_from_document);
        if self.mode == CatalogMode::Public {
            coupons.retain(|c| c.approved);
            sort_by_display_order(&mut coupons);
        }
        let categories = decode_all(&category_docs, records::category_from_document);

        info!(
            coupons = coupons.len(),
            categories = categories.len(),
            "Catalog reloaded"
        );
        let mut state = self.state();
        state.replace_coupons(coupons);
        state.categories = categories;
        Ok(())
    }

    /// Replace only the categories.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the categories are left unchanged.
    #[instrument(skip(self))]
    pub async fn reload_categories(&self) -> Result<()> {
        let _loading = self.loading();
        let documents = self
            .store
            .list(Collection::Categories, &ListQuery::all())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to reload categories"))?;
        let categories = decode_all(&documents, records::category_from_document);
        self.state().categories = categories;
        Ok(())
    }

    fn coupon_query(&self) -> ListQuery {
        match self.mode {
            CatalogMode::Public => ListQuery::all()
                .where_eq(records::APPROVED, true)
                .order_by(records::ORDER),
            CatalogMode::Admin => ListQuery::all(),
        }
    }

    // =========================================================================
    // Snapshot and derived lists
    // =========================================================================

    /// Loaded coupons in their current order.
    #[must_use]
    pub fn coupons(&self) -> Vec<Coupon> {
        self.state().coupons.clone()
    }

    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.state().categories.clone()
    }

    #[must_use]
    pub fn filter(&self) -> CatalogFilter {
        self.state().filter.clone()
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        self.state().filter.search_term = term.into();
    }

    /// Select a category, by its display name in the locale the picker was
    /// rendered in.
    pub fn select_category(&self, selection: CategoryFilter) {
        self.state().filter.category = selection;
    }

    /// Back to every category and no search term.
    pub fn clear_filter(&self) {
        self.state().filter = CatalogFilter::default();
    }

    /// Coupons passing the current filter, in display order.
    #[must_use]
    pub fn displayed(&self, locale: Locale) -> Vec<Coupon> {
        let state = self.state();
        derive_displayed(&state.coupons, &state.categories, &state.filter, locale)
            .into_iter()
            .cloned()
            .collect()
    }

    /// [`Self::displayed`] rendered for a locale.
    #[must_use]
    pub fn cards(&self, locale: Locale) -> Vec<CouponCard> {
        let state = self.state();
        derive_displayed(&state.coupons, &state.categories, &state.filter, locale)
            .into_iter()
            .map(|coupon| CouponCard::new(coupon, locale))
            .collect()
    }

    /// Entries of the category picker, "All" first.
    #[must_use]
    pub fn category_options(&self, locale: Locale) -> Vec<CategoryOption> {
        category_options(&self.state().categories, locale)
    }

    /// Dashboard: approved coupons by display order, unordered last.
    #[must_use]
    pub fn approved_coupons(&self) -> Vec<Coupon> {
        let mut approved: Vec<Coupon> = self
            .state()
            .coupons
            .iter()
            .filter(|c| c.approved)
            .cloned()
            .collect();
        sort_by_display_order(&mut approved);
        approved
    }

    /// Dashboard: coupons awaiting approval, in load order.
    ///
    /// Not affected by the category selection or search term.
    #[must_use]
    pub fn pending_coupons(&self) -> Vec<Coupon> {
        self.state()
            .coupons
            .iter()
            .filter(|c| !c.approved)
            .cloned()
            .collect()
    }

    // =========================================================================
    // Admin: coupons
    // =========================================================================

    /// Approve or withdraw a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AdminOnly`] outside the dashboard,
    /// [`CatalogError::UnknownCoupon`] for an ID that is not loaded, or the
    /// backend error. Nothing changes locally on error.
    #[instrument(skip(self), fields(coupon_id = %id))]
    pub async fn set_approval(&self, id: &CouponId, approved: bool) -> Result<()> {
        self.require_admin()?;
        self.require_coupon(id)?;
        let _loading = self.loading();
        self.store
            .update(
                Collection::Coupons,
                id.as_str(),
                records::approval_patch(approved),
            )
            .await
            .inspect_err(|e| error!(error = %e, "Failed to update approval"))?;

        if let Some(coupon) = self.state().coupon_mut(id) {
            coupon.approved = approved;
        }
        info!(approved, "Coupon approval updated");
        Ok(())
    }

    /// Set a coupon's display order and discard its order draft.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_approval`].
    #[instrument(skip(self), fields(coupon_id = %id))]
    pub async fn set_order(&self, id: &CouponId, order: i64) -> Result<()> {
        self.require_admin()?;
        self.require_coupon(id)?;
        let _serialized = self.order_writes.lock().await;
        let _loading = self.loading();
        self.store
            .update(Collection::Coupons, id.as_str(), records::order_patch(order))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to update order"))?;

        let mut state = self.state();
        if let Some(coupon) = state.coupon_mut(id) {
            coupon.order = Some(order);
        }
        state.order_drafts.remove(id);
        info!(order, "Coupon order updated");
        Ok(())
    }

    /// Text of a coupon's order field: the draft if one is being typed,
    /// otherwise the saved order, otherwise empty.
    #[must_use]
    pub fn order_input(&self, id: &CouponId) -> String {
        let state = self.state();
        match state.order_drafts.get(id) {
            Some(draft) if !draft.is_empty() => draft.clone(),
            _ => state
                .coupon(id)
                .and_then(|c| c.order)
                .map(|order| order.to_string())
                .unwrap_or_default(),
        }
    }

    /// Record unsaved input in a coupon's order field.
    pub fn edit_order_draft(&self, id: &CouponId, input: impl Into<String>) {
        self.state().order_drafts.insert(id.clone(), input.into());
    }

    /// Save the order field of a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] without contacting the backend
    /// if the field is not an integer, otherwise as [`Self::set_order`].
    pub async fn commit_order_draft(&self, id: &CouponId) -> Result<i64> {
        self.require_admin()?;
        self.require_coupon(id)?;
        let order = parse_order_input(&self.order_input(id))?;
        self.set_order(id, order).await?;
        Ok(order)
    }

    /// Permanently delete a coupon.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_approval`].
    #[instrument(skip(self), fields(coupon_id = %id))]
    pub async fn delete_coupon(&self, id: &CouponId) -> Result<()> {
        self.require_admin()?;
        self.require_coupon(id)?;
        let _loading = self.loading();
        self.store
            .delete(Collection::Coupons, id.as_str())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to delete coupon"))?;

        let mut state = self.state();
        state.coupons.retain(|c| &c.id != id);
        state.order_drafts.remove(id);
        info!("Coupon deleted");
        Ok(())
    }

    // =========================================================================
    // Admin: categories
    // =========================================================================

    /// Create a category, then re-fetch the category list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] without contacting the backend
    /// if either name is blank, otherwise the backend error.
    #[instrument(skip(self))]
    pub async fn add_category(&self, name_en: &str, name_ar: &str) -> Result<()> {
        self.require_admin()?;
        let category = NewCategory::new(name_en, name_ar)?;
        {
            let _loading = self.loading();
            let id = self
                .store
                .create(
                    Collection::Categories,
                    records::new_category_fields(&category),
                )
                .await
                .inspect_err(|e| error!(error = %e, "Failed to add category"))?;
            info!(category_id = %id, "Category added");
        }
        self.reload_categories().await
    }

    /// Delete a category, then re-fetch the category list.
    ///
    /// Coupons labelled with the category keep their labels.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCategory`] for an ID that is not
    /// loaded, otherwise the backend error.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        self.require_admin()?;
        if !self.state().categories.iter().any(|c| &c.id == id) {
            return Err(CatalogError::UnknownCategory(id.clone()));
        }
        {
            let _loading = self.loading();
            self.store
                .delete(Collection::Categories, id.as_str())
                .await
                .inspect_err(|e| error!(error = %e, "Failed to delete category"))?;
            info!("Category deleted");
        }
        self.reload_categories().await
    }

    // =========================================================================
    // Coupon submission
    // =========================================================================

    /// Current contents of the "add coupon" form.
    #[must_use]
    pub fn coupon_form(&self) -> CouponForm {
        self.state().form.clone()
    }

    pub fn set_coupon_form(&self, form: CouponForm) {
        self.state().form = form;
    }

    /// Change the form in place.
    pub fn edit_coupon_form(&self, edit: impl FnOnce(&mut CouponForm)) {
        edit(&mut self.state().form);
    }

    /// Copy a loaded category's names into the form's category fields.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownCategory`] if the ID is not loaded.
    pub fn choose_form_category(&self, id: &CategoryId) -> Result<()> {
        let mut state = self.state();
        let (name_en, name_ar) = state
            .categories
            .iter()
            .find(|c| &c.id == id)
            .map(|c| (c.name_en.clone(), c.name_ar.clone()))
            .ok_or_else(|| CatalogError::UnknownCategory(id.clone()))?;
        state.form.category_en = name_en;
        state.form.category_ar = name_ar;
        Ok(())
    }

    /// Submit the form as a new, pending coupon.
    ///
    /// Open to everyone: submissions wait for approval. On success the form
    /// is cleared and, on the dashboard, the coupon joins the pending list.
    /// On failure the form keeps its contents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] naming the first blank field
    /// without contacting the backend, otherwise the backend error.
    #[instrument(skip(self))]
    pub async fn add_coupon(&self) -> Result<Coupon> {
        let submission = self.coupon_form().validate()?;
        let _loading = self.loading();
        let id = self
            .store
            .create(
                Collection::Coupons,
                records::new_coupon_fields(&submission),
            )
            .await
            .inspect_err(|e| error!(error = %e, "Failed to add coupon"))?;

        let coupon = submission.into_coupon(CouponId::new(id));
        let mut state = self.state();
        state.form = CouponForm::default();
        if self.mode == CatalogMode::Admin {
            state.coupons.push(coupon.clone());
        }
        info!(coupon_id = %coupon.id, "Coupon submitted");
        Ok(coupon)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn loading(&self) -> LoadingGuard<'_> {
        LoadingGuard::start(&self.in_flight)
    }

    fn require_admin(&self) -> Result<()> {
        match self.mode {
            CatalogMode::Admin => Ok(()),
            CatalogMode::Public => Err(CatalogError::AdminOnly),
        }
    }

    fn require_coupon(&self, id: &CouponId) -> Result<()> {
        if self.state().coupon(id).is_some() {
            Ok(())
        } else {
            Err(CatalogError::UnknownCoupon(id.clone()))
        }
    }
}

/// Counts an in-flight backend call until dropped.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn decode_all<T>(
    documents: &[Document],
    decode: fn(&Document) -> std::result::Result<T, RemoteError>,
) -> Vec<T> {
    documents
        .iter()
        .filter_map(|document| {
            decode(document)
                .inspect_err(|e| warn!(error = %e, "Skipping malformed document"))
                .ok()
        })
        .collect()
}
