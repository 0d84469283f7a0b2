//! Generic record persistence engine.
//!
//! [`RecordHandler`] implements create, retrieve, update, delete and collect
//! for any [`Entity`]. It owns no per-request state: each call validates the
//! request, lowers identifiers and criteria to a [`Filter`], narrows the
//! filter with the injected [`ContextualiseFilter`], and runs against a store
//! session checked out for that call alone.
//!
//! The engine replaces whole documents on update. Which fields a caller may
//! change is decided above it, by reading the stored record and copying the
//! permitted fields forward before calling [`RecordHandler::update`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use pagination::{Page, Query};
use serde_json::Value;
use tracing::{debug, warn};

use super::claims::{Claims, ContextualiseFilter};
use super::criterion::{Criterion, criteria_filter};
use super::entity::{Entity, IndexSpec};
use super::error::Reasons;
use super::filter::Filter;
use super::identifier::Identifier;
use super::ports::{
    CollectionError, DocumentSession, DocumentStore, FindOptions, IdGenerator, UuidIdGenerator,
    define_port_error,
};

define_port_error! {
    /// Errors raised by the generic record handler.
    pub enum RecordHandlerError {
        /// The request was rejected before reaching the store.
        RequestInvalid { reasons: Reasons } => "request invalid: {reasons}",
        /// No document matched under the caller's claims.
        NotFound => "record not found",
        /// Inserting the record failed.
        Create { reasons: Reasons } => "create failed: {reasons}",
        /// Replacing the record failed.
        Update { reasons: Reasons } => "update failed: {reasons}",
        /// Removing the record failed.
        Delete { reasons: Reasons } => "delete failed: {reasons}",
        /// Counting or reading a page failed.
        Collect { reasons: Reasons } => "collect failed: {reasons}",
        /// The store failed in a way other than reporting no match.
        Unexpected { reasons: Reasons } => "unexpected error: {reasons}",
        /// A fresh identity could not be generated.
        UuidGeneration { reasons: Reasons } => "uuid generation failed: {reasons}",
    }
}

/// Look up one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveRequest {
    /// Caller tenancy.
    pub claims: Claims,
    /// Record to fetch.
    pub identifier: Identifier,
}

impl RetrieveRequest {
    /// Build a retrieve request.
    pub const fn new(claims: Claims, identifier: Identifier) -> Self {
        Self { claims, identifier }
    }
}

/// Replace one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest<E> {
    /// Caller tenancy.
    pub claims: Claims,
    /// Record to replace.
    pub identifier: Identifier,
    /// Replacement contents.
    pub entity: E,
}

impl<E> UpdateRequest<E> {
    /// Build an update request.
    pub const fn new(claims: Claims, identifier: Identifier, entity: E) -> Self {
        Self {
            claims,
            identifier,
            entity,
        }
    }
}

/// Remove records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    /// Caller tenancy.
    pub claims: Claims,
    /// Records to remove.
    pub identifier: Identifier,
}

impl DeleteRequest {
    /// Build a delete request.
    pub const fn new(claims: Claims, identifier: Identifier) -> Self {
        Self { claims, identifier }
    }
}

/// Read a page of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectRequest {
    /// Caller tenancy.
    pub claims: Claims,
    /// Conditions every returned record satisfies.
    pub criteria: Vec<Criterion>,
    /// Paging and ordering.
    pub query: Query,
}

impl CollectRequest {
    /// Build a collect request.
    pub const fn new(claims: Claims, criteria: Vec<Criterion>, query: Query) -> Self {
        Self {
            claims,
            criteria,
            query,
        }
    }
}

fn step(what: &str, error: impl fmt::Display) -> Reasons {
    Reasons::new([what.to_owned(), error.to_string()])
}

fn decode<E: Entity>(document: Value) -> Result<E, serde_json::Error> {
    serde_json::from_value(document)
}

/// CRUD engine for entity type `E`.
pub struct RecordHandler<E> {
    store: Arc<dyn DocumentStore>,
    contextualise: ContextualiseFilter,
    id_generator: Arc<dyn IdGenerator>,
    entity: PhantomData<fn() -> E>,
}

impl<E> Clone for RecordHandler<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            contextualise: self.contextualise,
            id_generator: Arc::clone(&self.id_generator),
            entity: PhantomData,
        }
    }
}

impl<E: Entity> RecordHandler<E> {
    /// Ensure `indexes` on the entity's collection and build the handler.
    ///
    /// Index creation is idempotent. Any failure is returned as is; callers
    /// treat it as fatal to startup.
    pub async fn initialise(
        store: Arc<dyn DocumentStore>,
        contextualise: ContextualiseFilter,
        indexes: &[IndexSpec],
    ) -> Result<Self, CollectionError> {
        {
            let mut session = store.session().await?;
            for index in indexes {
                session.ensure_index(E::COLLECTION, index).await?;
                debug!(
                    collection = E::COLLECTION,
                    index = %index.name(E::COLLECTION),
                    "index ensured"
                );
            }
        }
        Ok(Self {
            store,
            contextualise,
            id_generator: Arc::new(UuidIdGenerator),
            entity: PhantomData,
        })
    }

    /// Replace the identity source.
    #[must_use]
    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// Narrow `filter` to what `claims` may see.
    pub fn scoped_filter(&self, filter: Filter, claims: &Claims) -> Filter {
        (self.contextualise)(filter, claims)
    }

    async fn session(&self) -> Result<Box<dyn DocumentSession + '_>, CollectionError> {
        self.store.session().await
    }

    /// Persist `entity` under a freshly generated identity.
    ///
    /// Any identity already set on `entity` is overwritten.
    pub async fn create(&self, mut entity: E) -> Result<E, RecordHandlerError> {
        let id = self
            .id_generator
            .generate()
            .map_err(|err| RecordHandlerError::uuid_generation(step("generating identity", err)))?;
        entity.set_id(id);

        let document = serde_json::to_value(&entity)
            .map_err(|err| RecordHandlerError::create(step("serialising record", err)))?;
        let mut session = self
            .session()
            .await
            .map_err(|err| RecordHandlerError::create(step("acquiring session", err)))?;
        session
            .insert(E::COLLECTION, entity.id(), document)
            .await
            .map_err(|err| RecordHandlerError::create(step("inserting record", err)))?;

        debug!(collection = E::COLLECTION, id = entity.id(), "record created");
        Ok(entity)
    }

    /// Fetch the record `request.identifier` names.
    pub async fn retrieve(&self, request: RetrieveRequest) -> Result<E, RecordHandlerError> {
        let RetrieveRequest { claims, identifier } = request;
        Self::check_identified(&claims, &identifier)?;
        let filter = self.scoped_filter(identifier.to_filter(), &claims);

        let mut session = self
            .session()
            .await
            .map_err(|err| RecordHandlerError::unexpected(step("acquiring session", err)))?;
        let document = match session.find_one(E::COLLECTION, &filter).await {
            Ok(document) => document,
            Err(CollectionError::NotFound) => return Err(RecordHandlerError::not_found()),
            Err(err) => {
                return Err(RecordHandlerError::unexpected(step("retrieving record", err)));
            }
        };

        decode(document).map_err(|err| RecordHandlerError::unexpected(step("decoding record", err)))
    }

    /// Replace the record `request.identifier` names with `request.entity`.
    pub async fn update(&self, request: UpdateRequest<E>) -> Result<(), RecordHandlerError> {
        let UpdateRequest {
            claims,
            identifier,
            entity,
        } = request;
        Self::check_identified(&claims, &identifier)?;
        let filter = self.scoped_filter(identifier.to_filter(), &claims);

        let document = serde_json::to_value(&entity)
            .map_err(|err| RecordHandlerError::update(step("serialising record", err)))?;
        let mut session = self
            .session()
            .await
            .map_err(|err| RecordHandlerError::update(step("acquiring session", err)))?;
        session
            .replace_one(E::COLLECTION, &filter, document)
            .await
            .map_err(|err| RecordHandlerError::update(step("updating record", err)))?;

        debug!(collection = E::COLLECTION, "record updated");
        Ok(())
    }

    /// Remove every record `request.identifier` names.
    pub async fn delete(&self, request: DeleteRequest) -> Result<(), RecordHandlerError> {
        let DeleteRequest { claims, identifier } = request;
        Self::check_identified(&claims, &identifier)?;
        let filter = self.scoped_filter(identifier.to_filter(), &claims);

        let mut session = self
            .session()
            .await
            .map_err(|err| RecordHandlerError::delete(step("acquiring session", err)))?;
        let removed = session
            .remove(E::COLLECTION, &filter)
            .await
            .map_err(|err| RecordHandlerError::delete(step("removing record", err)))?;

        debug!(collection = E::COLLECTION, removed, "records removed");
        Ok(())
    }

    /// Count the records matching every criterion, then read one page.
    ///
    /// `total` counts the full matching set. Mismatched sort lists are
    /// logged and the page is read unsorted.
    pub async fn collect(&self, request: CollectRequest) -> Result<Page<E>, RecordHandlerError> {
        let CollectRequest {
            claims,
            criteria,
            query,
        } = request;
        Self::check_collect(&claims, &criteria)?;
        let filter = self.scoped_filter(criteria_filter(&criteria), &claims);

        let sort = query.sort_fields().unwrap_or_else(|err| {
            warn!(collection = E::COLLECTION, error = %err, "ignoring sort");
            Vec::new()
        });
        let options = FindOptions {
            offset: query.offset,
            limit: query.page_limit(),
            sort,
        };

        let mut session = self
            .session()
            .await
            .map_err(|err| RecordHandlerError::collect(step("acquiring session", err)))?;
        let total = session
            .count(E::COLLECTION, &filter)
            .await
            .map_err(|err| RecordHandlerError::collect(step("counting records", err)))?;
        let documents = session
            .find_many(E::COLLECTION, &filter, &options)
            .await
            .map_err(|err| RecordHandlerError::collect(step("retrieving records", err)))?;

        Page::new(documents, total)
            .try_map(decode::<E>)
            .map_err(|err| RecordHandlerError::collect(step("decoding record", err)))
    }

    fn check_identified(
        claims: &Claims,
        identifier: &Identifier,
    ) -> Result<(), RecordHandlerError> {
        let mut reasons = Vec::new();
        if let Err(err) = claims.validate() {
            reasons.push(err.to_string());
        }
        if let Err(err) = identifier.is_valid() {
            reasons.push(err.to_string());
        }
        if !E::is_valid_identifier(identifier) {
            reasons.push(format!(
                "identifier of type {} not supported for {} entity",
                identifier.identifier_type(),
                E::NAME
            ));
        }
        Self::reject_if_any(reasons)
    }

    fn check_collect(claims: &Claims, criteria: &[Criterion]) -> Result<(), RecordHandlerError> {
        let mut reasons = Vec::new();
        if let Err(err) = claims.validate() {
            reasons.push(err.to_string());
        }
        reasons.extend(
            criteria
                .iter()
                .filter_map(|criterion| criterion.is_valid().err())
                .map(|err| err.to_string()),
        );
        Self::reject_if_any(reasons)
    }

    fn reject_if_any(reasons: Vec<String>) -> Result<(), RecordHandlerError> {
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(RecordHandlerError::request_invalid(reasons))
        }
    }
}

#[cfg(test)]
mod tests;
