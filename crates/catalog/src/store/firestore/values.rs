//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type, e.g.
//! `{"stringValue": "SAVE10"}` or `{"integerValue": "3"}` (64-bit integers
//! travel as strings).

use serde_json::{Map, Value, json};

use crate::store::Fields;

/// Encode plain fields for a write request.
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), encode_value(value)))
            .collect(),
    )
}

/// Encode one plain value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => n.as_i64().map_or_else(
            || json!({ "doubleValue": n }),
            |i| json!({ "integerValue": i.to_string() }),
        ),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({
            "mapValue": { "fields": encode_fields(map) }
        }),
    }
}

/// Decode the `fields` object of a Firestore document.
///
/// # Errors
///
/// Returns the offending field name and reason when a value is not a
/// recognised Firestore value.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, String> {
    fields
        .iter()
        .map(|(name, value)| {
            decode_value(value)
                .map(|v| (name.clone(), v))
                .map_err(|reason| format!("field {name}: {reason}"))
        })
        .collect()
}

/// Decode one typed Firestore value.
///
/// Timestamps, references and geo points decode to their string or object
/// payload; the catalog never stores them.
///
/// # Errors
///
/// Returns a reason when the value is not a single-key typed object.
pub fn decode_value(value: &Value) -> Result<Value, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "expected a typed value object".to_owned())?;
    let (kind, inner) = match (object.len(), object.iter().next()) {
        (1, Some(entry)) => entry,
        _ => return Err("expected exactly one value type".to_owned()),
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" | "bytesValue"
        | "geoPointValue" => Ok(inner.clone()),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("bad integerValue {s:?}: {e}")),
            Value::Number(_) => Ok(inner.clone()),
            _ => Err("integerValue must be a string".to_owned()),
        },
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            // NaN and the infinities are sent as strings and have no JSON number.
            Value::String(_) => Ok(Value::Null),
            _ => Err("doubleValue must be a number".to_owned()),
        },
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map_or_else(
                || Ok(Value::Array(Vec::new())),
                |items| {
                    items
                        .iter()
                        .map(decode_value)
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::Array)
                },
            ),
        "mapValue" => inner
            .get("fields")
            .and_then(Value::as_object)
            .map_or_else(
                || Ok(Value::Object(Map::new())),
                |fields| decode_fields(fields).map(Value::Object),
            ),
        other => Err(format!("unsupported value type {other}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_coupon_fields() {
        let fields = json!({
            "title_en": "Noon",
            "approved": false,
            "order": 4,
        });
        let encoded = encode_fields(fields.as_object().unwrap());
        assert_eq!(
            encoded,
            json!({
                "title_en": { "stringValue": "Noon" },
                "approved": { "booleanValue": false },
                "order": { "integerValue": "4" },
            })
        );
    }

    #[test]
    fn test_encode_double() {
        assert_eq!(encode_value(&json!(2.5)), json!({ "doubleValue": 2.5 }));
    }

    #[test]
    fn test_decode_document_fields() {
        let raw = json!({
            "title_ar": { "stringValue": "نون" },
            "approved": { "booleanValue": true },
            "order": { "integerValue": "12" },
            "legacy": { "nullValue": null },
        });
        let decoded = decode_fields(raw.as_object().unwrap()).unwrap();
        assert_eq!(decoded.get("title_ar"), Some(&json!("نون")));
        assert_eq!(decoded.get("approved"), Some(&json!(true)));
        assert_eq!(decoded.get("order"), Some(&json!(12)));
        assert_eq!(decoded.get("legacy"), Some(&Value::Null));
    }

    #[test]
    fn test_decode_nan_double_as_null() {
        assert_eq!(
            decode_value(&json!({ "doubleValue": "NaN" })).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_decode_nested_values() {
        let raw = json!({
            "arrayValue": { "values": [
                { "integerValue": "1" },
                { "mapValue": { "fields": { "k": { "stringValue": "v" } } } }
            ] }
        });
        assert_eq!(decode_value(&raw).unwrap(), json!([1, { "k": "v" }]));
    }

    #[test]
    fn test_decode_rejects_untyped() {
        assert!(decode_value(&json!("plain")).is_err());
        assert!(decode_value(&json!({ "stringValue": "a", "booleanValue": true })).is_err());
        assert!(decode_value(&json!({ "integerValue": "x" })).is_err());
    }
}
