//! Public catalog filtering.
//!
//! Everything here is a pure function of the loaded coupons, the loaded
//! categories, the shopper's filter state and the display locale. Filtering
//! never re-sorts: the input sequence is already in display order.

use serde::{Deserialize, Serialize};

use crate::types::{Category, CategoryFilter, Coupon, Locale};

/// Shopper-controlled filter state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub search_term: String,
    pub category: CategoryFilter,
}

impl CatalogFilter {
    /// Whether the filter lets every coupon through.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.search_term.is_empty() && self.category == CategoryFilter::All
    }
}

/// One entry of the category picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub label: String,
    pub filter: CategoryFilter,
}

/// Label of the leading "All" option.
#[must_use]
pub const fn all_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "All",
        Locale::Ar => "الكل",
    }
}

/// Category picker entries: "All" followed by every category's display name.
#[must_use]
pub fn category_options(categories: &[Category], locale: Locale) -> Vec<CategoryOption> {
    let mut options = Vec::with_capacity(categories.len() + 1);
    options.push(CategoryOption {
        label: all_label(locale).to_owned(),
        filter: CategoryFilter::All,
    });
    options.extend(categories.iter().map(|category| {
        let label = category.display_name(locale).to_owned();
        CategoryOption {
            filter: CategoryFilter::Named(label.clone()),
            label,
        }
    }));
    options
}

/// Find the category whose display name is the selected string.
#[must_use]
pub fn find_selected_category<'a>(
    categories: &'a [Category],
    selection: &str,
    locale: Locale,
) -> Option<&'a Category> {
    categories
        .iter()
        .find(|category| category.display_name(locale) == selection)
}

/// Whether a coupon belongs to the selected category.
///
/// Coupons carry category labels rather than category IDs, so matching is by
/// string equality: the coupon's English label against the selected
/// category's English name, its Arabic label against the Arabic name, or
/// either label against the selected display string itself. Existing data
/// relies on this convention; switching to ID matching would hide coupons.
///
/// When `selected` is `None` (the string names no loaded category) only the
/// literal comparison applies. There is no show-everything fallback: a
/// selection naming a category that no longer exists keeps only coupons
/// whose labels equal the string, which may be none.
#[must_use]
pub fn category_matches(coupon: &Coupon, selection: &str, selected: Option<&Category>) -> bool {
    let by_names = selected.is_some_and(|category| {
        coupon.category_en == category.name_en || coupon.category_ar == category.name_ar
    });
    by_names || coupon.category_en == selection || coupon.category_ar == selection
}

/// Whether either title contains the search term, ignoring case.
///
/// An empty term matches everything.
#[must_use]
pub fn title_matches(coupon: &Coupon, search_term: &str) -> bool {
    if search_term.is_empty() {
        return true;
    }
    let needle = search_term.to_lowercase();
    coupon.title_en.to_lowercase().contains(&needle)
        || coupon.title_ar.to_lowercase().contains(&needle)
}

/// Derive the displayed list from the loaded coupons.
///
/// Applies the category selection, then the search term. The relative order
/// of the input is preserved.
#[must_use]
pub fn derive_displayed<'a>(
    coupons: &'a [Coupon],
    categories: &[Category],
    filter: &CatalogFilter,
    locale: Locale,
) -> Vec<&'a Coupon> {
    let selection = filter.category.name();
    let selected =
        selection.and_then(|name| find_selected_category(categories, name, locale));

    coupons
        .iter()
        .filter(|coupon| {
            selection.is_none_or(|name| category_matches(coupon, name, selected))
        })
        .filter(|coupon| title_matches(coupon, &filter.search_term))
        .collect()
}

/// Sort coupons by display order, coupons without an order last.
///
/// The sort is stable: coupons sharing an order keep their relative order.
pub fn sort_by_display_order(coupons: &mut [Coupon]) {
    coupons.sort_by_key(display_order_key);
}

/// Sort key placing `None` after every number.
#[must_use]
pub fn display_order_key(coupon: &Coupon) -> (bool, i64) {
    (coupon.order.is_none(), coupon.order.unwrap_or_default())
}
