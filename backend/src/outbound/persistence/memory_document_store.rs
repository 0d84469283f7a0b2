//! In-process [`DocumentStore`] used by tests and local runs.
//!
//! Documents live in insertion order per collection behind one async mutex.
//! Filters are evaluated with [`Filter::matches`] and ordering uses
//! [`compare_values`], so behaviour tracks the PostgreSQL adapter closely
//! enough for domain tests. Sessions are counted while open.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use pagination::{SortField, SortOrder};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::filter::{compare_values, lookup, values_equal};
use crate::domain::ports::{CollectionError, DocumentSession, DocumentStore, FindOptions};
use crate::domain::{Filter, IndexSpec};

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<(String, Value)>,
    indexes: Vec<IndexSpec>,
}

impl Collection {
    /// First index `candidate` would violate, ignoring the entry at `skip`.
    fn violated_index(&self, candidate: &Value, skip: Option<usize>) -> Option<&IndexSpec> {
        self.indexes.iter().filter(|index| index.unique).find(|index| {
            let Some(key) = index_key(index, candidate) else {
                return false;
            };
            self.documents
                .iter()
                .enumerate()
                .filter(|(position, _)| Some(*position) != skip)
                .filter_map(|(_, (_, stored))| index_key(index, stored))
                .any(|stored_key| keys_equal(&stored_key, &key))
        })
    }
}

/// The values `index` keys `document` on, or `None` when a sparse index
/// skips it.
fn index_key(index: &IndexSpec, document: &Value) -> Option<Vec<Value>> {
    let values: Vec<Option<&Value>> = index
        .fields
        .iter()
        .map(|field| lookup(document, field))
        .collect();
    if index.sparse && values.iter().any(Option::is_none) {
        return None;
    }
    Some(
        values
            .into_iter()
            .map(|value| value.cloned().unwrap_or(Value::Null))
            .collect(),
    )
}

fn keys_equal(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(left, right)| values_equal(left, right))
}

fn compare_documents(left: &Value, right: &Value, sort: &[SortField]) -> Ordering {
    sort.iter()
        .map(|key| {
            let ordering = compare_values(lookup(left, &key.field), lookup(right, &key.field));
            match key.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Shared in-memory collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<HashMap<String, Collection>>>,
    open_sessions: Arc<AtomicUsize>,
}

impl InMemoryDocumentStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions checked out and not yet dropped.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(AtomicOrdering::SeqCst)
    }

    /// Number of documents stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(collection)
            .map_or(0, |stored| stored.documents.len())
    }

    /// Whether `collection` holds no documents.
    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn session<'a>(&'a self) -> Result<Box<dyn DocumentSession + 'a>, CollectionError> {
        self.open_sessions.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Box::new(InMemorySession { store: self }))
    }
}

struct InMemorySession<'a> {
    store: &'a InMemoryDocumentStore,
}

impl InMemorySession<'_> {
    async fn collections(&self) -> MutexGuard<'_, HashMap<String, Collection>> {
        self.store.collections.lock().await
    }
}

impl Drop for InMemorySession<'_> {
    fn drop(&mut self) {
        self.store.open_sessions.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl DocumentSession for InMemorySession<'_> {
    async fn ensure_index(
        &mut self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<(), CollectionError> {
        let mut collections = self.collections().await;
        let stored = collections.entry(collection.to_owned()).or_default();
        if stored.indexes.contains(index) {
            return Ok(());
        }
        if index.unique {
            let keys: Vec<Vec<Value>> = stored
                .documents
                .iter()
                .filter_map(|(_, document)| index_key(index, document))
                .collect();
            let clashes = keys.iter().enumerate().any(|(position, key)| {
                keys[position + 1..]
                    .iter()
                    .any(|other| keys_equal(key, other))
            });
            if clashes {
                return Err(CollectionError::index(format!(
                    "existing documents violate {}",
                    index.name(collection)
                )));
            }
        }
        stored.indexes.push(index.clone());
        Ok(())
    }

    async fn insert(
        &mut self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<(), CollectionError> {
        let mut collections = self.collections().await;
        let stored = collections.entry(collection.to_owned()).or_default();
        if stored.documents.iter().any(|(stored_id, _)| stored_id == id) {
            return Err(CollectionError::duplicate(format!("{collection}_pkey")));
        }
        if let Some(index) = stored.violated_index(&document, None) {
            return Err(CollectionError::duplicate(index.name(collection)));
        }
        stored.documents.push((id.to_owned(), document));
        Ok(())
    }

    async fn find_one(
        &mut self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Value, CollectionError> {
        let collections = self.collections().await;
        collections
            .get(collection)
            .and_then(|stored| {
                stored
                    .documents
                    .iter()
                    .find(|(_, document)| filter.matches(document))
            })
            .map(|(_, document)| document.clone())
            .ok_or(CollectionError::NotFound)
    }

    async fn count(&mut self, collection: &str, filter: &Filter) -> Result<u64, CollectionError> {
        let collections = self.collections().await;
        let matching = collections.get(collection).map_or(0, |stored| {
            stored
                .documents
                .iter()
                .filter(|(_, document)| filter.matches(document))
                .count()
        });
        Ok(u64::try_from(matching).unwrap_or(u64::MAX))
    }

    async fn find_many(
        &mut self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Value>, CollectionError> {
        let collections = self.collections().await;
        let Some(stored) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut matching: Vec<&Value> = stored
            .documents
            .iter()
            .map(|(_, document)| document)
            .filter(|document| filter.matches(document))
            .collect();
        if !options.sort.is_empty() {
            matching.sort_by(|left, right| compare_documents(left, right, &options.sort));
        }
        let limit = options.limit.map_or(usize::MAX, to_usize);
        Ok(matching
            .into_iter()
            .skip(to_usize(options.offset))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn replace_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        document: Value,
    ) -> Result<(), CollectionError> {
        let mut collections = self.collections().await;
        let stored = collections
            .get_mut(collection)
            .ok_or(CollectionError::NotFound)?;
        let position = stored
            .documents
            .iter()
            .position(|(_, existing)| filter.matches(existing))
            .ok_or(CollectionError::NotFound)?;

        let mut document = document;
        if let Some(fields) = document.as_object_mut() {
            let id = stored.documents[position].0.clone();
            fields.insert("id".to_owned(), Value::String(id));
        }
        if let Some(index) = stored.violated_index(&document, Some(position)) {
            return Err(CollectionError::duplicate(index.name(collection)));
        }
        stored.documents[position].1 = document;
        Ok(())
    }

    async fn remove(&mut self, collection: &str, filter: &Filter) -> Result<u64, CollectionError> {
        let mut collections = self.collections().await;
        let stored = collections
            .get_mut(collection)
            .ok_or(CollectionError::NotFound)?;
        let before = stored.documents.len();
        stored
            .documents
            .retain(|(_, document)| !filter.matches(document));
        let removed = before - stored.documents.len();
        if removed == 0 {
            return Err(CollectionError::NotFound);
        }
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
