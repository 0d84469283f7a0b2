//! Company use-cases that combine validation with persistence.

use std::sync::Arc;

use pagination::Page;
use tracing::debug;

use crate::domain::ports::{CompanyRecordHandler, ValidateRequest, Validator};
use crate::domain::{
    Action, AdministratorError, Claims, CollectRequest, Company, DeleteRequest, Identifier,
    RetrieveRequest, UpdateRequest,
};

/// Validates and persists companies.
#[derive(Clone)]
pub struct CompanyAdministrator<R, V> {
    records: Arc<R>,
    validator: Arc<V>,
}

impl<R, V> CompanyAdministrator<R, V> {
    /// Build an administrator over a record handler and validator.
    pub fn new(records: Arc<R>, validator: Arc<V>) -> Self {
        Self { records, validator }
    }
}

impl<R, V> CompanyAdministrator<R, V>
where
    R: CompanyRecordHandler,
    V: Validator<Company>,
{
    async fn check(
        &self,
        claims: &Claims,
        company: &Company,
        action: Action,
    ) -> Result<(), AdministratorError> {
        let reasons = self
            .validator
            .validate(ValidateRequest::new(claims.clone(), company.clone(), action))
            .await?;
        if reasons.is_empty() {
            Ok(())
        } else {
            debug!(?action, count = reasons.len(), "company failed validation");
            Err(AdministratorError::validation(reasons))
        }
    }

    /// Validate `company` for creation and persist it.
    pub async fn create(
        &self,
        claims: Claims,
        company: Company,
    ) -> Result<Company, AdministratorError> {
        self.check(&claims, &company, Action::Create).await?;
        Ok(self.records.create(company).await?)
    }

    /// Copy the name and admin email address of `company` onto the stored
    /// record with the same id, and return the result.
    pub async fn update_allowed_fields(
        &self,
        claims: Claims,
        company: Company,
    ) -> Result<Company, AdministratorError> {
        self.check(&claims, &company, Action::UpdateAllowedFields)
            .await?;

        let identifier = Identifier::id(company.id.as_str());
        let mut stored = self
            .records
            .retrieve(RetrieveRequest::new(claims.clone(), identifier.clone()))
            .await?;
        stored.name = company.name;
        stored.admin_email_address = company.admin_email_address;

        self.records
            .update(UpdateRequest::new(claims, identifier, stored.clone()))
            .await?;
        Ok(stored)
    }

    /// Fetch one company.
    pub async fn retrieve(&self, request: RetrieveRequest) -> Result<Company, AdministratorError> {
        Ok(self.records.retrieve(request).await?)
    }

    /// Remove companies.
    pub async fn delete(&self, request: DeleteRequest) -> Result<(), AdministratorError> {
        Ok(self.records.delete(request).await?)
    }

    /// Read one page of companies.
    pub async fn collect(
        &self,
        request: CollectRequest,
    ) -> Result<Page<Company>, AdministratorError> {
        Ok(self.records.collect(request).await?)
    }
}
