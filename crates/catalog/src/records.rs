//! Mapping between stored documents and typed catalog records.
//!
//! Decoding is lenient about missing fields (older documents predate some
//! of them) but strict about types: a present field with the wrong type makes
//! the whole document malformed.

use coupon_codes_core::{Category, CategoryId, Coupon, CouponId, NewCategory, NewCoupon};
use serde_json::Value;

use crate::store::{Collection, Document, Fields, RemoteError};

pub const TITLE_EN: &str = "title_en";
pub const TITLE_AR: &str = "title_ar";
pub const CODE_VALUE_EN: &str = "codeVal_en";
pub const CODE_VALUE_AR: &str = "codeVal_ar";
pub const CODE: &str = "code";
pub const LOGO: &str = "logo";
pub const CATEGORY_EN: &str = "category_en";
pub const CATEGORY_AR: &str = "category_ar";
pub const APPROVED: &str = "approved";
pub const ORDER: &str = "order";

pub const NAME_EN: &str = "name_en";
pub const NAME_AR: &str = "name_ar";

/// Decode a coupon document.
///
/// # Errors
///
/// Returns [`RemoteError::Malformed`] when a field has the wrong type.
pub fn coupon_from_document(document: &Document) -> Result<Coupon, RemoteError> {
    let reader = FieldReader::new(Collection::Coupons, document);
    Ok(Coupon {
        id: CouponId::new(document.id.clone()),
        title_en: reader.text(TITLE_EN)?,
        title_ar: reader.text(TITLE_AR)?,
        code_value_en: reader.text(CODE_VALUE_EN)?,
        code_value_ar: reader.text(CODE_VALUE_AR)?,
        code: reader.text(CODE)?,
        logo_url: reader.text(LOGO)?,
        category_en: reader.text(CATEGORY_EN)?,
        category_ar: reader.text(CATEGORY_AR)?,
        approved: reader.flag(APPROVED)?,
        order: reader.order(ORDER)?,
    })
}

/// Decode a category document.
///
/// # Errors
///
/// Returns [`RemoteError::Malformed`] when a name is not text.
pub fn category_from_document(document: &Document) -> Result<Category, RemoteError> {
    let reader = FieldReader::new(Collection::Categories, document);
    Ok(Category {
        id: CategoryId::new(document.id.clone()),
        name_en: reader.text(NAME_EN)?,
        name_ar: reader.text(NAME_AR)?,
    })
}

/// Every stored field of a coupon.
#[must_use]
pub fn coupon_fields(coupon: &Coupon) -> Fields {
    let mut fields = text_fields(
        &coupon.title_en,
        &coupon.title_ar,
        &coupon.code_value_en,
        &coupon.code_value_ar,
        &coupon.code,
        &coupon.logo_url,
        &coupon.category_en,
        &coupon.category_ar,
    );
    fields.insert(APPROVED.to_owned(), Value::Bool(coupon.approved));
    if let Some(order) = coupon.order {
        fields.insert(ORDER.to_owned(), Value::from(order));
    }
    fields
}

/// Fields of a coupon being created: pending, with no order.
#[must_use]
pub fn new_coupon_fields(coupon: &NewCoupon) -> Fields {
    let mut fields = text_fields(
        &coupon.title_en,
        &coupon.title_ar,
        &coupon.code_value_en,
        &coupon.code_value_ar,
        &coupon.code,
        &coupon.logo_url,
        &coupon.category_en,
        &coupon.category_ar,
    );
    fields.insert(APPROVED.to_owned(), Value::Bool(false));
    fields
}

#[must_use]
pub fn new_category_fields(category: &NewCategory) -> Fields {
    let mut fields = Fields::new();
    fields.insert(NAME_EN.to_owned(), Value::from(category.name_en.as_str()));
    fields.insert(NAME_AR.to_owned(), Value::from(category.name_ar.as_str()));
    fields
}

/// Partial update setting the approval flag.
#[must_use]
pub fn approval_patch(approved: bool) -> Fields {
    let mut fields = Fields::new();
    fields.insert(APPROVED.to_owned(), Value::Bool(approved));
    fields
}

/// Partial update setting the display order.
#[must_use]
pub fn order_patch(order: i64) -> Fields {
    let mut fields = Fields::new();
    fields.insert(ORDER.to_owned(), Value::from(order));
    fields
}

#[allow(clippy::too_many_arguments)]
fn text_fields(
    title_en: &str,
    title_ar: &str,
    code_value_en: &str,
    code_value_ar: &str,
    code: &str,
    logo_url: &str,
    category_en: &str,
    category_ar: &str,
) -> Fields {
    [
        (TITLE_EN, title_en),
        (TITLE_AR, title_ar),
        (CODE_VALUE_EN, code_value_en),
        (CODE_VALUE_AR, code_value_ar),
        (CODE, code),
        (LOGO, logo_url),
        (CATEGORY_EN, category_en),
        (CATEGORY_AR, category_ar),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_owned(), Value::from(value)))
    .collect()
}

struct FieldReader<'a> {
    collection: Collection,
    document: &'a Document,
}

impl<'a> FieldReader<'a> {
    const fn new(collection: Collection, document: &'a Document) -> Self {
        Self {
            collection,
            document,
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.document
            .fields
            .get(field)
            .filter(|value| !value.is_null())
    }

    /// Text field; missing reads as empty.
    fn text(&self, field: &str) -> Result<String, RemoteError> {
        match self.get(field) {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.malformed(field, "text", other)),
        }
    }

    /// Boolean field; missing reads as false.
    fn flag(&self, field: &str) -> Result<bool, RemoteError> {
        match self.get(field) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.malformed(field, "a boolean", other)),
        }
    }

    /// Display order. Fractional values have no position and read as unset.
    ///
    /// Blank strings also read as unset; older submissions stored `""`.
    fn order(&self, field: &str) -> Result<Option<i64>, RemoteError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .and_then(float_to_i64)
            })),
            Some(other) => Err(self.malformed(field, "a number", other)),
        }
    }

    fn malformed(&self, field: &str, expected: &str, found: &Value) -> RemoteError {
        RemoteError::Malformed {
            collection: self.collection.name(),
            id: self.document.id.clone(),
            reason: format!("{field} should be {expected}, found {found}"),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_i64(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (value >= -LIMIT && value < LIMIT).then(|| value as i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(id: &str, fields: Value) -> Document {
        Document {
            id: id.to_string(),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_decode_full_coupon() {
        let doc = document(
            "c1",
            json!({
                "title_en": "Noon",
                "title_ar": "نون",
                "codeVal_en": "10% off",
                "codeVal_ar": "خصم ١٠٪",
                "code": "NOON10",
                "logo": "https://cdn.example/noon.png",
                "category_en": "Fashion",
                "category_ar": "أزياء",
                "approved": true,
                "order": 2,
            }),
        );
        let coupon = coupon_from_document(&doc).unwrap();
        assert_eq!(coupon.id.as_str(), "c1");
        assert_eq!(coupon.code_value_ar, "خصم ١٠٪");
        assert_eq!(coupon.logo_url, "https://cdn.example/noon.png");
        assert!(coupon.approved);
        assert_eq!(coupon.order, Some(2));
    }

    #[test]
    fn test_decode_sparse_coupon() {
        let coupon = coupon_from_document(&document("c2", json!({ "code": "X" }))).unwrap();
        assert_eq!(coupon.title_en, "");
        assert!(!coupon.approved);
        assert_eq!(coupon.order, None);
    }

    #[test]
    fn test_decode_order_variants() {
        let order = |value: Value| {
            coupon_from_document(&document("c", json!({ "order": value })))
                .unwrap()
                .order
        };
        assert_eq!(order(json!(4.0)), Some(4));
        assert_eq!(order(json!(4.5)), None);
        assert_eq!(order(Value::Null), None);
        assert_eq!(order(json!(-3)), Some(-3));
    }

    #[test]
    fn test_blank_order_string_reads_as_unset() {
        let doc = document(
            "legacy",
            json!({
                "title_en": "Careem",
                "title_ar": "كريم",
                "codeVal_en": "15% off",
                "codeVal_ar": "خصم ١٥٪",
                "code": "CAREEM15",
                "logo": "https://cdn.example/careem.png",
                "category_en": "Travel",
                "category_ar": "سفر",
                "approved": false,
                "order": "",
            }),
        );
        let coupon = coupon_from_document(&doc).unwrap();
        assert_eq!(coupon.order, None);
        assert!(!coupon.approved);

        let spaces = coupon_from_document(&document("c", json!({ "order": "  " }))).unwrap();
        assert_eq!(spaces.order, None);
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let result = coupon_from_document(&document("bad", json!({ "approved": "yes" })));
        assert!(matches!(
            result,
            Err(RemoteError::Malformed { collection: "products", ref id, .. }) if id == "bad"
        ));

        let result = coupon_from_document(&document("bad", json!({ "order": "1" })));
        assert!(result.is_err());

        let result = category_from_document(&document("cat", json!({ "name_en": 7 })));
        assert!(result.is_err());
    }

    #[test]
    fn test_coupon_fields_round_trip() {
        let doc = document(
            "c3",
            json!({
                "title_en": "A", "title_ar": "أ",
                "codeVal_en": "5", "codeVal_ar": "٥",
                "code": "A5", "logo": "l",
                "category_en": "Food", "category_ar": "طعام",
                "approved": false, "order": 7,
            }),
        );
        let coupon = coupon_from_document(&doc).unwrap();
        assert_eq!(coupon_fields(&coupon), doc.fields);
    }

    #[test]
    fn test_new_coupon_fields_are_pending_without_order() {
        let coupon = NewCoupon {
            title_en: "A".into(),
            title_ar: "أ".into(),
            code_value_en: "5".into(),
            code_value_ar: "٥".into(),
            code: "A5".into(),
            logo_url: "l".into(),
            category_en: "Food".into(),
            category_ar: "طعام".into(),
        };
        let fields = new_coupon_fields(&coupon);
        assert_eq!(fields.get(APPROVED), Some(&json!(false)));
        assert!(!fields.contains_key(ORDER));
        assert_eq!(fields.get(CODE_VALUE_EN), Some(&json!("5")));
    }

    #[test]
    fn test_patches() {
        assert_eq!(Value::Object(approval_patch(true)), json!({ "approved": true }));
        assert_eq!(Value::Object(order_patch(3)), json!({ "order": 3 }));
    }

    #[test]
    fn test_category_round_trip() {
        let fields = new_category_fields(&NewCategory::new("Food", "طعام").unwrap());
        let category = category_from_document(&Document {
            id: "k".to_string(),
            fields,
        })
        .unwrap();
        assert_eq!(category.display_name(coupon_codes_core::Locale::Ar), "طعام");
    }
}
