//! Rules for company records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{
    CompanyRecordHandler, CompanyRecordHandlerError, UserRecordHandler, UserRecordHandlerError,
    ValidateRequest, Validator, ValidatorError,
};
use crate::domain::validation::duplicate_reason;
use crate::domain::{
    Action, Claims, Company, Identifier, IgnoredReasons, ReasonInvalid, ReasonKind,
    RetrieveRequest,
};

/// Validates companies before they are created or updated.
///
/// Uniqueness lookups run under `system_claims` so that a conflicting
/// company in another tenant is still found.
pub struct CompanyValidator<C, U> {
    companies: Arc<C>,
    users: Arc<U>,
    system_claims: Claims,
    ignored: IgnoredReasons,
}

impl<C, U> CompanyValidator<C, U> {
    /// Build a validator over the company and user record handlers.
    pub fn new(companies: Arc<C>, users: Arc<U>, system_claims: Claims) -> Self {
        Self {
            companies,
            users,
            system_claims,
            ignored: IgnoredReasons::default().ignore(Action::Create, "id", [ReasonKind::Blank]),
        }
    }
}

impl<C, U> CompanyValidator<C, U>
where
    C: CompanyRecordHandler,
    U: UserRecordHandler,
{
    async fn name_reason(&self, company: &Company) -> Option<ReasonInvalid> {
        let lookup = self
            .companies
            .retrieve(RetrieveRequest::new(
                self.system_claims.clone(),
                Identifier::name(company.name.as_str()),
            ))
            .await;
        duplicate_reason(
            "name",
            &company.name,
            lookup,
            |err| matches!(err, CompanyRecordHandlerError::NotFound),
            |found| found.id == company.id,
        )
    }

    async fn admin_email_reasons(&self, email: &str) -> Vec<ReasonInvalid> {
        let companies = self
            .companies
            .retrieve(RetrieveRequest::new(
                self.system_claims.clone(),
                Identifier::admin_email_address(email),
            ))
            .await;
        let users = self
            .users
            .retrieve(RetrieveRequest::new(
                self.system_claims.clone(),
                Identifier::email_address(email),
            ))
            .await;

        [
            duplicate_reason(
                "adminEmailAddress",
                email,
                companies,
                |err| matches!(err, CompanyRecordHandlerError::NotFound),
                |_| false,
            ),
            duplicate_reason(
                "adminEmailAddress",
                email,
                users,
                |err| matches!(err, UserRecordHandlerError::NotFound),
                |_| false,
            ),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[async_trait]
impl<C, U> Validator<Company> for CompanyValidator<C, U>
where
    C: CompanyRecordHandler,
    U: UserRecordHandler,
{
    async fn validate(
        &self,
        request: ValidateRequest<Company>,
    ) -> Result<Vec<ReasonInvalid>, ValidatorError> {
        let ValidateRequest {
            claims,
            entity: company,
            action,
        } = request;
        claims
            .validate()
            .map_err(|err| ValidatorError::request_invalid(err.to_string()))?;

        let mut reasons = Vec::new();
        if company.id.trim().is_empty() {
            reasons.push(ReasonInvalid::blank("id", company.id.as_str()));
        }

        if company.name.trim().is_empty() {
            reasons.push(ReasonInvalid::blank("name", company.name.as_str()));
        } else {
            reasons.extend(self.name_reason(&company).await);
        }

        if company.admin_email_address.trim().is_empty() {
            reasons.push(ReasonInvalid::blank(
                "adminEmailAddress",
                company.admin_email_address.as_str(),
            ));
        } else if action == Action::Create {
            reasons.extend(self.admin_email_reasons(&company.admin_email_address).await);
        }

        if company.parent_party_type.is_none() {
            reasons.push(ReasonInvalid::blank("parentPartyType", Value::Null));
        }
        if company.parent_id.trim().is_empty() {
            reasons.push(ReasonInvalid::blank("parentId", company.parent_id.as_str()));
        }

        Ok(self.ignored.filter(action, reasons))
    }
}
