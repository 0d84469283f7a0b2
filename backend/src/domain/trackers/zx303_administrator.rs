//! Tracker use-cases that combine validation with persistence.

use std::sync::Arc;

use pagination::Page;
use tracing::debug;

use crate::domain::ports::{ValidateRequest, Validator, Zx303RecordHandler};
use crate::domain::{
    Action, AdministratorError, Claims, CollectRequest, DeleteRequest, Identifier,
    RetrieveRequest, UpdateRequest, Zx303,
};

/// Validates and persists ZX303 trackers.
///
/// Session state is owned by the device gateway, so
/// [`update_allowed_fields`](Self::update_allowed_fields) never touches
/// `loggedIn` or the timestamps.
#[derive(Clone)]
pub struct Zx303Administrator<R, V> {
    records: Arc<R>,
    validator: Arc<V>,
}

impl<R, V> Zx303Administrator<R, V> {
    /// Build an administrator over a record handler and validator.
    pub fn new(records: Arc<R>, validator: Arc<V>) -> Self {
        Self { records, validator }
    }
}

impl<R, V> Zx303Administrator<R, V>
where
    R: Zx303RecordHandler,
    V: Validator<Zx303>,
{
    async fn check(
        &self,
        claims: &Claims,
        device: &Zx303,
        action: Action,
    ) -> Result<(), AdministratorError> {
        let reasons = self
            .validator
            .validate(ValidateRequest::new(claims.clone(), device.clone(), action))
            .await?;
        if reasons.is_empty() {
            Ok(())
        } else {
            debug!(?action, count = reasons.len(), "zx303 failed validation");
            Err(AdministratorError::validation(reasons))
        }
    }

    /// Validate `device` for creation and persist it.
    pub async fn create(&self, claims: Claims, device: Zx303) -> Result<Zx303, AdministratorError> {
        self.check(&claims, &device, Action::Create).await?;
        Ok(self.records.create(device).await?)
    }

    /// Copy the SIM details, owner and assignee of `device` onto the stored
    /// record with the same id, and return the result.
    pub async fn update_allowed_fields(
        &self,
        claims: Claims,
        device: Zx303,
    ) -> Result<Zx303, AdministratorError> {
        self.check(&claims, &device, Action::UpdateAllowedFields)
            .await?;

        let identifier = Identifier::id(device.id.as_str());
        let mut stored = self
            .records
            .retrieve(RetrieveRequest::new(claims.clone(), identifier.clone()))
            .await?;
        stored.sim_country_code = device.sim_country_code;
        stored.sim_number = device.sim_number;
        stored.owner_party_type = device.owner_party_type;
        stored.owner_id = device.owner_id;
        stored.assigned_party_type = device.assigned_party_type;
        stored.assigned_id = device.assigned_id;

        self.records
            .update(UpdateRequest::new(claims, identifier, stored.clone()))
            .await?;
        Ok(stored)
    }

    /// Fetch one tracker.
    pub async fn retrieve(&self, request: RetrieveRequest) -> Result<Zx303, AdministratorError> {
        Ok(self.records.retrieve(request).await?)
    }

    /// Remove trackers.
    pub async fn delete(&self, request: DeleteRequest) -> Result<(), AdministratorError> {
        Ok(self.records.delete(request).await?)
    }

    /// Read one page of trackers.
    pub async fn collect(&self, request: CollectRequest) -> Result<Page<Zx303>, AdministratorError> {
        Ok(self.records.collect(request).await?)
    }
}
