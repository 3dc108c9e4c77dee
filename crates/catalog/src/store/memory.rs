//! In-memory document store.
//!
//! Used by tests and local demos. Supports call counting, injected failures
//! and per-write latency so tests can exercise error paths and races.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::{
    Collection, Document, Fields, ListQuery, RemoteError, RemoteStore, matches_filter,
    sort_documents,
};

/// Document store backed by process memory.
#[derive(Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Document>>>,
    failing: Mutex<HashSet<Collection>>,
    update_delays: Mutex<VecDeque<Duration>>,
    calls: AtomicU64,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with a generated ID, returning the ID.
    ///
    /// Seeding does not count as a call.
    pub fn insert(&self, collection: Collection, fields: Fields) -> String {
        let id = new_document_id();
        self.insert_with_id(collection, &id, fields);
        id
    }

    /// Seed a document with a fixed ID, replacing any document with that ID.
    pub fn insert_with_id(&self, collection: Collection, id: &str, fields: Fields) {
        let mut collections = self.collections();
        let documents = collections.entry(collection).or_default();
        documents.retain(|d| d.id != id);
        documents.push(Document {
            id: id.to_owned(),
            fields,
        });
    }

    /// Current stored state of a document.
    #[must_use]
    pub fn document(&self, collection: Collection, id: &str) -> Option<Document> {
        self.collections()
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned())
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.collections().get(&collection).map_or(0, Vec::len)
    }

    /// Whether a collection holds no documents.
    #[must_use]
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    /// Make every operation on a collection fail until cleared.
    pub fn set_failing(&self, collection: Collection, failing: bool) {
        let mut set = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing {
            set.insert(collection);
        } else {
            set.remove(&collection);
        }
    }

    /// Queue a latency for the next update; updates consume one each.
    pub fn push_update_delay(&self, delay: Duration) {
        self.update_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(delay);
    }

    /// Number of operations served (or refused) so far.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn collections(&self) -> MutexGuard<'_, HashMap<Collection, Vec<Document>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, collection: Collection) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&collection);
        if failing {
            return Err(RemoteError::Unavailable(format!(
                "{collection} is unavailable"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Document>, RemoteError> {
        self.begin(collection)?;
        let mut documents: Vec<Document> = self
            .collections()
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches_filter(d, query.filter.as_ref()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(field) = &query.order_by {
            sort_documents(&mut documents, field);
        }
        Ok(documents)
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<String, RemoteError> {
        self.begin(collection)?;
        Ok(self.insert(collection, fields))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteError> {
        self.begin(collection)?;
        let delay = self
            .update_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut collections = self.collections();
        let document = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| RemoteError::NotFound {
                collection: collection.name(),
                id: id.to_owned(),
            })?;
        document.fields.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RemoteError> {
        self.begin(collection)?;
        if let Some(docs) = self.collections().get_mut(&collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }
}

/// Twenty-character ID, the same length the hosted backend assigns.
fn new_document_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(20);
    id
}
