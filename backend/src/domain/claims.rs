//! Caller tenancy and filter contextualisation.
//!
//! Every retrieve, update, delete and collect narrows its filter through a
//! [`ContextualiseFilter`] before touching the store. `System` callers see
//! everything; every other tenant only sees documents whose ownership fields
//! carry its party id.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::Filter;

/// Kind of party a caller or record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartyType {
    /// The root tenant operating the platform.
    System,
    /// A company tenant.
    Company,
    /// A client of a company.
    Client,
}

impl PartyType {
    /// Wire name of the party type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Company => "Company",
            Self::Client => "Client",
        }
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons claims are rejected before any store access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    /// The party id is empty or whitespace.
    #[error("claims party id is blank")]
    BlankPartyId,
}

/// Authenticated caller context, fixed for the duration of a request.
///
/// # Examples
/// ```
/// use brain::domain::{Claims, PartyType};
///
/// let claims = Claims::new(PartyType::Company, "company-1");
/// assert!(!claims.is_root());
/// assert!(claims.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    party_type: PartyType,
    party_id: String,
}

impl Claims {
    /// Build claims for a party.
    pub fn new(party_type: PartyType, party_id: impl Into<String>) -> Self {
        Self {
            party_type,
            party_id: party_id.into(),
        }
    }

    /// Claims for the root tenant.
    pub fn system(party_id: impl Into<String>) -> Self {
        Self::new(PartyType::System, party_id)
    }

    /// The caller's party type.
    pub const fn party_type(&self) -> PartyType {
        self.party_type
    }

    /// The caller's party id.
    pub fn party_id(&self) -> &str {
        &self.party_id
    }

    /// Whether the caller has unrestricted visibility.
    pub fn is_root(&self) -> bool {
        self.party_type == PartyType::System
    }

    /// Reject claims that cannot scope a filter.
    pub fn validate(&self) -> Result<(), ClaimsError> {
        if self.party_id.trim().is_empty() {
            return Err(ClaimsError::BlankPartyId);
        }
        Ok(())
    }
}

/// Narrows a base filter to what the caller may see.
pub type ContextualiseFilter = fn(Filter, &Claims) -> Filter;

fn narrow(filter: Filter, claims: &Claims, ownership: impl FnOnce(&str) -> Filter) -> Filter {
    if claims.is_root() {
        return filter;
    }
    Filter::and([filter, ownership(claims.party_id())])
}

/// Parties see only their own record.
pub fn contextualise_party_self(filter: Filter, claims: &Claims) -> Filter {
    narrow(filter, claims, |party_id| Filter::eq("id", party_id))
}

/// Parties see their own record and the records they parent.
pub fn contextualise_party_children(filter: Filter, claims: &Claims) -> Filter {
    narrow(filter, claims, |party_id| {
        Filter::or([Filter::eq("id", party_id), Filter::eq("parentId", party_id)])
    })
}

/// Parties see the users that belong to them or that they created.
pub fn contextualise_party_members(filter: Filter, claims: &Claims) -> Filter {
    narrow(filter, claims, |party_id| {
        Filter::or([
            Filter::eq("partyId", party_id),
            Filter::eq("parentId", party_id),
        ])
    })
}

/// Parties see assets they own or that are assigned to them.
pub fn contextualise_owned_or_assigned(filter: Filter, claims: &Claims) -> Filter {
    narrow(filter, claims, |party_id| {
        Filter::or([
            Filter::eq("ownerId", party_id),
            Filter::eq("assignedId", party_id),
        ])
    })
}
