//! Document store abstraction.
//!
//! # Collections
//!
//! - `products` - Coupons (the collection name predates the coupon naming)
//! - `categories` - Bilingual category labels
//!
//! Documents are loosely typed field maps. They are turned into typed
//! records in [`crate::records`] and nowhere else.

pub mod firestore;
pub mod memory;

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use memory::InMemoryStore;

/// Document fields keyed by stored field name.
pub type Fields = serde_json::Map<String, Value>;

/// Collections the catalog reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Coupons,
    Categories,
}

impl Collection {
    /// Stored collection name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Coupons => "products",
            Self::Categories => "categories",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored document: backend-assigned ID plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Equality filter on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub equals: Value,
}

/// Options for [`RemoteStore::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// Keep only documents whose field equals the value.
    pub filter: Option<FieldFilter>,
    /// Sort ascending by this numeric field; documents without it come last.
    pub order_by: Option<String>,
}

impl ListQuery {
    /// Every document, in backend order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality filter.
    #[must_use]
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter = Some(FieldFilter {
            field: field.to_owned(),
            equals: value.into(),
        });
        self
    }

    /// Sort ascending by a numeric field.
    #[must_use]
    pub fn order_by(mut self, field: &str) -> Self {
        self.order_by = Some(field.to_owned());
        self
    }
}

/// Errors returned by a [`RemoteStore`].
///
/// The catalog only distinguishes success from failure; the variants exist
/// for logs.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend could not be reached or refused to serve.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Security rules rejected the request.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The addressed document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// The backend answered with an error status.
    #[error("backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    /// A document or response did not have the expected shape.
    #[error("malformed {collection} document {id}: {reason}")]
    Malformed {
        collection: &'static str,
        id: String,
        reason: String,
    },
}

/// Per-collection document operations.
///
/// Implementations must be safe to share between tasks; the view-model
/// issues the coupon and category fetches of a reload concurrently.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the documents of a collection matching the query.
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Document>, RemoteError>;

    /// Create a document and return its new ID.
    async fn create(&self, collection: Collection, fields: Fields) -> Result<String, RemoteError>;

    /// Overwrite the given fields of an existing document.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteError>;

    /// Permanently delete a document.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RemoteError>;
}

/// Stable ascending sort by a numeric field, missing or non-numeric last.
pub(crate) fn sort_documents(documents: &mut [Document], field: &str) {
    documents.sort_by(|a, b| {
        match (numeric_field(a, field), numeric_field(b, field)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn numeric_field(document: &Document, field: &str) -> Option<f64> {
    document
        .fields
        .get(field)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

/// Whether a document passes the query's filter.
pub(crate) fn matches_filter(document: &Document, filter: Option<&FieldFilter>) -> bool {
    filter.is_none_or(|f| document.fields.get(&f.field) == Some(&f.equals))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, fields: Value) -> Document {
        Document {
            id: id.to_string(),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Coupons.name(), "products");
        assert_eq!(Collection::Categories.to_string(), "categories");
    }

    #[test]
    fn test_sort_documents_missing_last() {
        let mut docs = vec![
            doc("a", json!({ "order": 3 })),
            doc("b", json!({})),
            doc("c", json!({ "order": 1 })),
            doc("d", json!({ "order": null })),
            doc("e", json!({ "order": 1.5 })),
        ];
        sort_documents(&mut docs, "order");
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["c", "e", "a", "b", "d"]);
    }

    #[test]
    fn test_matches_filter() {
        let approved = doc("a", json!({ "approved": true }));
        let pending = doc("b", json!({ "approved": false }));
        let query = ListQuery::all().where_eq("approved", true);
        assert!(matches_filter(&approved, query.filter.as_ref()));
        assert!(!matches_filter(&pending, query.filter.as_ref()));
        assert!(matches_filter(&pending, None));
    }
}
