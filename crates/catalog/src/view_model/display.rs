//! Localized presentation of coupons.

use coupon_codes_core::{ApprovalStatus, Coupon, CouponId, Locale};
use serde::Serialize;

/// A coupon with its text picked for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponCard {
    pub id: CouponId,
    pub title: String,
    /// Discount description, e.g. "20% off".
    pub code_value: String,
    pub category: String,
    pub code: String,
    pub logo_url: String,
    pub status: ApprovalStatus,
    pub order: Option<i64>,
}

impl CouponCard {
    #[must_use]
    pub fn new(coupon: &Coupon, locale: Locale) -> Self {
        Self {
            id: coupon.id.clone(),
            title: coupon.title(locale).to_owned(),
            code_value: coupon.code_value(locale).to_owned(),
            category: coupon.category(locale).to_owned(),
            code: coupon.code.clone(),
            logo_url: coupon.logo_url.clone(),
            status: coupon.status(),
            order: coupon.order,
        }
    }
}
