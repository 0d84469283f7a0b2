//! Rules for client records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{
    ClientRecordHandler, ClientRecordHandlerError, PartyAdministrator, UserRecordHandler,
    UserRecordHandlerError, ValidateRequest, Validator, ValidatorError,
};
use crate::domain::validation::{duplicate_reason, existence_reason};
use crate::domain::{
    Action, Claims, Client, Identifier, IgnoredReasons, ReasonInvalid, ReasonKind,
    RetrieveRequest,
};

/// Validates clients before they are created or updated.
///
/// Client names are not unique. The admin email address is unique across
/// clients and users; those lookups run under `system_claims`. The parent
/// reference is resolved under the caller's claims.
pub struct ClientValidator<C, U, P> {
    clients: Arc<C>,
    users: Arc<U>,
    parties: Arc<P>,
    system_claims: Claims,
    ignored: IgnoredReasons,
}

impl<C, U, P> ClientValidator<C, U, P> {
    /// Build a validator over the client and user record handlers.
    pub fn new(clients: Arc<C>, users: Arc<U>, parties: Arc<P>, system_claims: Claims) -> Self {
        Self {
            clients,
            users,
            parties,
            system_claims,
            ignored: IgnoredReasons::default().ignore(Action::Create, "id", [ReasonKind::Blank]),
        }
    }
}

impl<C, U, P> ClientValidator<C, U, P>
where
    C: ClientRecordHandler,
    U: UserRecordHandler,
    P: PartyAdministrator,
{
    async fn admin_email_reasons(&self, email: &str) -> Vec<ReasonInvalid> {
        let clients = self
            .clients
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
                clients,
                |err| matches!(err, ClientRecordHandlerError::NotFound),
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
impl<C, U, P> Validator<Client> for ClientValidator<C, U, P>
where
    C: ClientRecordHandler,
    U: UserRecordHandler,
    P: PartyAdministrator,
{
    async fn validate(
        &self,
        request: ValidateRequest<Client>,
    ) -> Result<Vec<ReasonInvalid>, ValidatorError> {
        let ValidateRequest {
            claims,
            entity: client,
            action,
        } = request;
        claims
            .validate()
            .map_err(|err| ValidatorError::request_invalid(err.to_string()))?;

        let mut reasons = Vec::new();
        if client.id.trim().is_empty() {
            reasons.push(ReasonInvalid::blank("id", client.id.as_str()));
        }
        if client.name.trim().is_empty() {
            reasons.push(ReasonInvalid::blank("name", client.name.as_str()));
        }

        if client.admin_email_address.trim().is_empty() {
            reasons.push(ReasonInvalid::blank(
                "adminEmailAddress",
                client.admin_email_address.as_str(),
            ));
        } else if action == Action::Create {
            reasons.extend(self.admin_email_reasons(&client.admin_email_address).await);
        }

        match client.parent_party_type {
            None => reasons.push(ReasonInvalid::blank("parentPartyType", Value::Null)),
            Some(_) if client.parent_id.trim().is_empty() => {}
            Some(parent_party_type) => {
                let lookup = self
                    .parties
                    .retrieve_party(claims, parent_party_type, client.parent_id.clone())
                    .await;
                reasons.extend(existence_reason(
                    "parentId",
                    "parent",
                    &client.parent_id,
                    lookup,
                ));
            }
        }
        if client.parent_id.trim().is_empty() {
            reasons.push(ReasonInvalid::blank("parentId", client.parent_id.as_str()));
        }

        Ok(self.ignored.filter(action, reasons))
    }
}
