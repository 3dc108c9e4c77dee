//! Cloud Firestore REST backend.
//!
//! # API Reference
//!
//! - Base URL: `https://firestore.googleapis.com/v1/projects/{project}/databases/{db}/documents`
//! - Authentication: web API key (`key` query parameter) plus, for admin
//!   writes, the signed-in user's ID token as a bearer token
//! - Security rules decide what each request may read or write
//!
//! Filtered lists use `:runQuery` with a single equality filter. Sorting is
//! done client-side so documents lacking the sort field still appear (a
//! server-side `orderBy` would drop them).

mod values;

pub use values::{decode_fields, decode_value, encode_fields, encode_value};

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::{Collection, Document, Fields, ListQuery, RemoteError, RemoteStore, sort_documents};
use crate::auth::Session;
use crate::config::FirebaseConfig;

/// Documents requested per list page.
const PAGE_SIZE: u32 = 300;

/// Firestore document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct RawDocument {
    /// Full resource name ending in `/{collection}/{id}`.
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

/// One entry of a `:runQuery` response stream.
#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Firestore-backed [`RemoteStore`].
///
/// Cheap to clone. An anonymous store can only do what the security rules
/// allow the public (reading approved coupons and categories); use
/// [`FirestoreStore::with_session`] for admin writes.
#[derive(Clone)]
pub struct FirestoreStore {
    inner: Arc<FirestoreStoreInner>,
}

struct FirestoreStoreInner {
    client: reqwest::Client,
    documents_url: String,
    api_key: SecretString,
    id_token: Option<SecretString>,
}

impl FirestoreStore {
    /// Create an anonymous Firestore client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            inner: Arc::new(FirestoreStoreInner {
                client,
                documents_url: config.documents_url(),
                api_key: config.api_key.clone(),
                id_token: None,
            }),
        })
    }

    /// A client that authorizes requests as the session's admin.
    #[must_use]
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            inner: Arc::new(FirestoreStoreInner {
                client: self.inner.client.clone(),
                documents_url: self.inner.documents_url.clone(),
                api_key: self.inner.api_key.clone(),
                id_token: Some(session.id_token().clone()),
            }),
        }
    }

    /// URL of a collection, or of a document when `id` is given.
    fn url(&self, collection: Collection, id: Option<&str>) -> Result<Url, RemoteError> {
        let mut url = self.parse_url(&self.inner.documents_url)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RemoteError::Unavailable("documents URL cannot be a base".into()))?;
            segments.push(collection.name());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }

    fn run_query_url(&self) -> Result<Url, RemoteError> {
        let mut url = self.parse_url(&format!("{}:runQuery", self.inner.documents_url))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }

    fn parse_url(&self, raw: &str) -> Result<Url, RemoteError> {
        Url::parse(raw).map_err(|e| RemoteError::Unavailable(format!("invalid Firestore URL: {e}")))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.id_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Parse a successful JSON response or map the error status.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        collection: Collection,
        id: Option<&str>,
    ) -> Result<T, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| RemoteError::Malformed {
                collection: collection.name(),
                id: id.unwrap_or_default().to_owned(),
                reason: format!("failed to parse response: {e}"),
            });
        }
        Err(Self::parse_error(response, collection, id).await)
    }

    async fn parse_error(
        response: reqwest::Response,
        collection: Collection,
        id: Option<&str>,
    ) -> RemoteError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RemoteError::PermissionDenied(message)
            }
            StatusCode::NOT_FOUND => RemoteError::NotFound {
                collection: collection.name(),
                id: id.unwrap_or_default().to_owned(),
            },
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS => {
                RemoteError::Unavailable(message)
            }
            _ => RemoteError::Backend {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Every document of a collection, following page tokens.
    async fn list_all(&self, collection: Collection) -> Result<Vec<Document>, RemoteError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.url(collection, None)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", &PAGE_SIZE.to_string());
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.request(reqwest::Method::GET, url).send().await?;
            let page: ListDocumentsResponse =
                self.handle_response(response, collection, None).await?;
            for raw in page.documents {
                documents.push(into_document(raw, collection)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    /// Documents whose field equals a value.
    async fn run_query(
        &self,
        collection: Collection,
        field: &str,
        equals: &Value,
    ) -> Result<Vec<Document>, RemoteError> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection.name() }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": encode_value(equals),
                    }
                }
            }
        });

        let response = self
            .request(reqwest::Method::POST, self.run_query_url()?)
            .json(&body)
            .send()
            .await?;
        let items: Vec<RunQueryItem> = self.handle_response(response, collection, None).await?;

        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(|raw| into_document(raw, collection))
            .collect()
    }
}

#[async_trait]
impl RemoteStore for FirestoreStore {
    #[instrument(skip(self, query), fields(collection = %collection))]
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Document>, RemoteError> {
        let mut documents = match &query.filter {
            Some(filter) => {
                self.run_query(collection, &filter.field, &filter.equals)
                    .await?
            }
            None => self.list_all(collection).await?,
        };
        if let Some(field) = &query.order_by {
            sort_documents(&mut documents, field);
        }
        debug!(count = documents.len(), "Listed documents");
        Ok(documents)
    }

    #[instrument(skip(self, fields), fields(collection = %collection))]
    async fn create(&self, collection: Collection, fields: Fields) -> Result<String, RemoteError> {
        let url = self.url(collection, None)?;
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "fields": encode_fields(&fields) }))
            .send()
            .await?;
        let raw: RawDocument = self.handle_response(response, collection, None).await?;
        let id = document_id(&raw.name).to_owned();
        debug!(id = %id, "Created document");
        Ok(id)
    }

    #[instrument(skip(self, fields), fields(collection = %collection, id = %id))]
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteError> {
        let mut url = self.url(collection, Some(id))?;
        {
            let mut query = url.query_pairs_mut();
            for name in fields.keys() {
                query.append_pair("updateMask.fieldPaths", name);
            }
            // Patching a missing document would otherwise create it.
            query.append_pair("currentDocument.exists", "true");
        }

        let response = self
            .request(reqwest::Method::PATCH, url)
            .json(&json!({ "fields": encode_fields(&fields) }))
            .send()
            .await?;
        let _: RawDocument = self.handle_response(response, collection, Some(id)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %collection, id = %id))]
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        let url = self.url(collection, Some(id))?;
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response, collection, Some(id)).await)
    }
}

/// Last path segment of a document resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn into_document(raw: RawDocument, collection: Collection) -> Result<Document, RemoteError> {
    let id = document_id(&raw.name).to_owned();
    let fields = decode_fields(&raw.fields).map_err(|reason| RemoteError::Malformed {
        collection: collection.name(),
        id: id.clone(),
        reason,
    })?;
    Ok(Document { id, fields })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> FirebaseConfig {
        FirebaseConfig {
            api_key: SecretString::from("AIzaTestKey"),
            project_id: "codes-test".to_string(),
            database_id: "(default)".to_string(),
            firestore_base_url: "https://firestore.googleapis.com".to_string(),
            auth_base_url: "https://identitytoolkit.googleapis.com".to_string(),
        }
    }

    #[test]
    fn test_document_id_from_resource_name() {
        assert_eq!(
            document_id("projects/p/databases/(default)/documents/products/Ab12"),
            "Ab12"
        );
        assert_eq!(document_id("bare"), "bare");
    }

    #[test]
    fn test_collection_and_document_urls() {
        let store = FirestoreStore::new(&config()).unwrap();
        let url = store.url(Collection::Coupons, None).unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/codes-test/databases/(default)/documents/products?key=AIzaTestKey"
        );

        let url = store.url(Collection::Categories, Some("a b")).unwrap();
        assert!(url.path().ends_with("/documents/categories/a%20b"));
    }

    #[test]
    fn test_run_query_url() {
        let store = FirestoreStore::new(&config()).unwrap();
        let url = store.run_query_url().unwrap();
        assert!(url.path().ends_with("/documents:runQuery"));
    }

    #[test]
    fn test_into_document_decodes_fields() {
        let raw: RawDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/categories/food",
            "fields": {
                "name_en": { "stringValue": "Food" },
                "name_ar": { "stringValue": "طعام" }
            },
            "createTime": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        let doc = into_document(raw, Collection::Categories).unwrap();
        assert_eq!(doc.id, "food");
        assert_eq!(doc.fields.get("name_ar"), Some(&json!("طعام")));
    }

    #[test]
    fn test_list_response_without_documents() {
        let page: ListDocumentsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
