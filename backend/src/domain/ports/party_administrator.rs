//! Port for resolving a party reference of any type.

use async_trait::async_trait;

use crate::domain::{Claims, Party, PartyType};

use super::define_port_error;

define_port_error! {
    /// Errors raised when resolving a party.
    pub enum PartyAdministratorError {
        /// No party of that type and id is visible to the caller.
        NotFound { party_type: PartyType, party_id: String } =>
            "{party_type} party {party_id} not found",
        /// The lookup failed for another reason.
        Lookup { message: String } => "party lookup failed: {message}",
    }
}

/// Fetches a party given only its type and id.
///
/// Validators use this to check that `parentId`, `ownerId` and `assignedId`
/// references point at a real party.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartyAdministrator: Send + Sync {
    /// Resolve the party `party_type`/`party_id` as `claims` see it.
    async fn retrieve_party(
        &self,
        claims: Claims,
        party_type: PartyType,
        party_id: String,
    ) -> Result<Party, PartyAdministratorError>;
}
