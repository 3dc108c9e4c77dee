//! Coupon records.

use serde::{Deserialize, Serialize};

use super::id::CouponId;
use super::locale::Locale;
use super::status::ApprovalStatus;
use crate::validation::{ValidationError, require};

/// A redeemable discount code with bilingual display fields.
///
/// Category labels are copies of a category's names at the time the coupon
/// was created, not references. Renaming or deleting a category leaves them
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub title_en: String,
    pub title_ar: String,
    /// Human-readable discount description, e.g. "20% off".
    pub code_value_en: String,
    pub code_value_ar: String,
    /// The code shoppers redeem. Locale-independent.
    pub code: String,
    pub logo_url: String,
    pub category_en: String,
    pub category_ar: String,
    pub approved: bool,
    /// Position on the public catalog; `None` sorts after every number.
    pub order: Option<i64>,
}

impl Coupon {
    /// Approval lifecycle state.
    #[must_use]
    pub const fn status(&self) -> ApprovalStatus {
        ApprovalStatus::from_approved(self.approved)
    }

    /// Title in the given locale.
    #[must_use]
    pub fn title(&self, locale: Locale) -> &str {
        locale.pick(&self.title_en, &self.title_ar)
    }

    /// Discount description in the given locale.
    #[must_use]
    pub fn code_value(&self, locale: Locale) -> &str {
        locale.pick(&self.code_value_en, &self.code_value_ar)
    }

    /// Category label in the given locale.
    #[must_use]
    pub fn category(&self, locale: Locale) -> &str {
        locale.pick(&self.category_en, &self.category_ar)
    }
}

/// A validated coupon ready to be stored.
///
/// New coupons always start pending with no display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub title_en: String,
    pub title_ar: String,
    pub code_value_en: String,
    pub code_value_ar: String,
    pub code: String,
    pub logo_url: String,
    pub category_en: String,
    pub category_ar: String,
}

impl NewCoupon {
    /// Build the stored record once the backend has assigned an ID.
    #[must_use]
    pub fn into_coupon(self, id: CouponId) -> Coupon {
        Coupon {
            id,
            title_en: self.title_en,
            title_ar: self.title_ar,
            code_value_en: self.code_value_en,
            code_value_ar: self.code_value_ar,
            code: self.code,
            logo_url: self.logo_url,
            category_en: self.category_en,
            category_ar: self.category_ar,
            approved: false,
            order: None,
        }
    }
}

/// Raw input of the "add coupon" form.
///
/// The form keeps whatever the admin typed until a submission succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponForm {
    pub title_en: String,
    pub title_ar: String,
    pub code_value_en: String,
    pub code_value_ar: String,
    pub code: String,
    pub logo_url: String,
    pub category_en: String,
    pub category_ar: String,
}

impl CouponForm {
    /// Check that every field is filled in.
    ///
    /// Fields are checked in form order and trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] naming the first empty field.
    pub fn validate(&self) -> Result<NewCoupon, ValidationError> {
        Ok(NewCoupon {
            title_en: require("title_en", &self.title_en)?,
            title_ar: require("title_ar", &self.title_ar)?,
            code_value_en: require("code_value_en", &self.code_value_en)?,
            code_value_ar: require("code_value_ar", &self.code_value_ar)?,
            code: require("code", &self.code)?,
            logo_url: require("logo_url", &self.logo_url)?,
            category_en: require("category_en", &self.category_en)?,
            category_ar: require("category_ar", &self.category_ar)?,
        })
    }

    /// Whether every field is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
