//! Port for the document collections records are persisted in.
//!
//! The record handler treats the store as a set of named collections of JSON
//! documents. A [`DocumentSession`] is checked out for exactly one record
//! operation and released when dropped, so every exit path returns it.

use async_trait::async_trait;
use pagination::SortField;
use serde_json::Value;

use crate::domain::{Filter, IndexSpec};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum CollectionError {
        /// The store could not be reached or a session could not be opened.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// No document matched the filter.
        NotFound => "no matching document",
        /// The write would violate a unique index.
        Duplicate { message: String } =>
            "document violates a unique index: {message}",
        /// The store rejected or failed the operation.
        Query { message: String } =>
            "document store query failed: {message}",
        /// An index could not be established.
        Index { message: String } =>
            "document index setup failed: {message}",
    }
}

/// Paging and ordering applied by [`DocumentSession::find_many`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Matching documents to skip.
    pub offset: u64,
    /// Maximum documents to return; `None` is unbounded.
    pub limit: Option<u64>,
    /// Sort keys in priority order. Empty keeps store order.
    pub sort: Vec<SortField>,
}

/// Source of per-operation sessions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check out a session for one operation.
    async fn session<'a>(&'a self) -> Result<Box<dyn DocumentSession + 'a>, CollectionError>;
}

/// Operations available while a session is checked out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentSession: Send {
    /// Create `index` on `collection` if it does not already exist.
    async fn ensure_index(
        &mut self,
        collection: &str,
        index: &IndexSpec,
    ) -> Result<(), CollectionError>;

    /// Insert `document` under `id`.
    ///
    /// Returns [`CollectionError::Duplicate`] when a unique index rejects it.
    async fn insert(
        &mut self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<(), CollectionError>;

    /// First document matching `filter`, or [`CollectionError::NotFound`].
    async fn find_one(&mut self, collection: &str, filter: &Filter)
    -> Result<Value, CollectionError>;

    /// Number of documents matching `filter`.
    async fn count(&mut self, collection: &str, filter: &Filter) -> Result<u64, CollectionError>;

    /// Documents matching `filter`, paged and sorted per `options`.
    async fn find_many(
        &mut self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Value>, CollectionError>;

    /// Replace the first document matching `filter` with `document`.
    ///
    /// The stored `id` is kept. Returns [`CollectionError::NotFound`] when
    /// nothing matches.
    async fn replace_one(
        &mut self,
        collection: &str,
        filter: &Filter,
        document: Value,
    ) -> Result<(), CollectionError>;

    /// Remove every document matching `filter` and return how many went.
    ///
    /// Returns [`CollectionError::NotFound`] when nothing matches.
    async fn remove(&mut self, collection: &str, filter: &Filter) -> Result<u64, CollectionError>;
}
