//! Resolves party references across the three party collections.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    ClientRecordHandler, ClientRecordHandlerError, CompanyRecordHandler,
    CompanyRecordHandlerError, PartyAdministrator, PartyAdministratorError, SystemRecordHandler,
    SystemRecordHandlerError,
};
use crate::domain::{Claims, Identifier, Party, PartyType, RetrieveRequest};

/// [`PartyAdministrator`] backed by the system, company and client record
/// handlers.
pub struct BasicPartyAdministrator<S, C, L> {
    systems: Arc<S>,
    companies: Arc<C>,
    clients: Arc<L>,
}

impl<S, C, L> BasicPartyAdministrator<S, C, L> {
    /// Build an administrator over the three party record handlers.
    pub fn new(systems: Arc<S>, companies: Arc<C>, clients: Arc<L>) -> Self {
        Self {
            systems,
            companies,
            clients,
        }
    }
}

fn lookup_error(
    party_type: PartyType,
    party_id: String,
    not_found: bool,
    error: impl fmt::Display,
) -> PartyAdministratorError {
    if not_found {
        PartyAdministratorError::not_found(party_type, party_id)
    } else {
        PartyAdministratorError::lookup(error.to_string())
    }
}

#[async_trait]
impl<S, C, L> PartyAdministrator for BasicPartyAdministrator<S, C, L>
where
    S: SystemRecordHandler,
    C: CompanyRecordHandler,
    L: ClientRecordHandler,
{
    async fn retrieve_party(
        &self,
        claims: Claims,
        party_type: PartyType,
        party_id: String,
    ) -> Result<Party, PartyAdministratorError> {
        let request = RetrieveRequest::new(claims, Identifier::id(party_id.as_str()));
        match party_type {
            PartyType::System => self.systems.retrieve(request).await.map(Party::System).map_err(
                |err| {
                    let missing = matches!(err, SystemRecordHandlerError::NotFound);
                    lookup_error(party_type, party_id, missing, err)
                },
            ),
            PartyType::Company => self
                .companies
                .retrieve(request)
                .await
                .map(Party::Company)
                .map_err(|err| {
                    let missing = matches!(err, CompanyRecordHandlerError::NotFound);
                    lookup_error(party_type, party_id, missing, err)
                }),
            PartyType::Client => self
                .clients
                .retrieve(request)
                .await
                .map(Party::Client)
                .map_err(|err| {
                    let missing = matches!(err, ClientRecordHandlerError::NotFound);
                    lookup_error(party_type, party_id, missing, err)
                }),
        }
    }
}
