//! Polymorphic lookup keys.
//!
//! An [`Identifier`] names exactly one record of some entity type. Each
//! variant validates itself and lowers to a [`Filter`]; which variants an
//! entity accepts is decided by the entity (see
//! [`Entity::is_valid_identifier`](crate::domain::Entity::is_valid_identifier)).
//!
//! Identifiers serialise as their wrapped `{"type", "value"}` envelope, so a
//! request body embedding one needs no extra glue.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::claims::PartyType;
use super::filter::Filter;

mod wrapped;

pub use self::wrapped::WrappedIdentifier;

/// Closed set of identifier tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierType {
    /// Record id.
    Id,
    /// Unique display name.
    Name,
    /// Login name.
    Username,
    /// Contact email address.
    EmailAddress,
    /// Administrator email address of a party.
    AdminEmailAddress,
    /// Device IMEI.
    DeviceImei,
    /// Owning party of a user.
    Party,
}

impl IdentifierType {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::Name,
        Self::Username,
        Self::EmailAddress,
        Self::AdminEmailAddress,
        Self::DeviceImei,
        Self::Party,
    ];

    /// Wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "Id",
            Self::Name => "Name",
            Self::Username => "Username",
            Self::EmailAddress => "EmailAddress",
            Self::AdminEmailAddress => "AdminEmailAddress",
            Self::DeviceImei => "DeviceIMEI",
            Self::Party => "Party",
        }
    }

    /// Resolve a wire tag. Matching is exact.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == tag)
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons an identifier cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// A required value is empty or whitespace.
    #[error("{identifier_type} identifier has blank {field}")]
    Blank {
        /// Offending identifier tag.
        identifier_type: IdentifierType,
        /// Offending payload field.
        field: &'static str,
    },
    /// The wrapped tag is not a known identifier type.
    #[error("invalid type: {tag}")]
    InvalidType {
        /// Tag as received.
        tag: String,
    },
    /// The wrapped payload does not decode into the tagged variant.
    #[error("unmarshalling {identifier_type} identifier: {message}")]
    Unmarshalling {
        /// Tag the payload was decoded as.
        identifier_type: IdentifierType,
        /// Decoder message.
        message: String,
    },
}

/// A typed lookup key.
///
/// # Examples
/// ```
/// use brain::domain::{Filter, Identifier};
///
/// let identifier = Identifier::name("Acme");
/// assert!(identifier.is_valid().is_ok());
/// assert_eq!(identifier.to_filter(), Filter::eq("name", "Acme"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WrappedIdentifier", into = "WrappedIdentifier")]
pub enum Identifier {
    /// Match on `id`.
    Id {
        /// Record id.
        id: String,
    },
    /// Match on `name`.
    Name {
        /// Display name.
        name: String,
    },
    /// Match on `username`.
    Username {
        /// Login name.
        username: String,
    },
    /// Match on `emailAddress`.
    EmailAddress {
        /// Email address.
        email_address: String,
    },
    /// Match on `adminEmailAddress`.
    AdminEmailAddress {
        /// Administrator email address.
        admin_email_address: String,
    },
    /// Match on `imei`.
    DeviceImei {
        /// Device IMEI.
        imei: String,
    },
    /// Match on `partyType` and `partyId` together.
    Party {
        /// Owning party type.
        party_type: PartyType,
        /// Owning party id.
        party_id: String,
    },
}

impl Identifier {
    /// Identify by record id.
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id { id: id.into() }
    }

    /// Identify by name.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name { name: name.into() }
    }

    /// Identify by username.
    pub fn username(username: impl Into<String>) -> Self {
        Self::Username {
            username: username.into(),
        }
    }

    /// Identify by email address.
    pub fn email_address(email_address: impl Into<String>) -> Self {
        Self::EmailAddress {
            email_address: email_address.into(),
        }
    }

    /// Identify by administrator email address.
    pub fn admin_email_address(admin_email_address: impl Into<String>) -> Self {
        Self::AdminEmailAddress {
            admin_email_address: admin_email_address.into(),
        }
    }

    /// Identify a device by IMEI.
    pub fn device_imei(imei: impl Into<String>) -> Self {
        Self::DeviceImei { imei: imei.into() }
    }

    /// Identify by owning party.
    pub fn party(party_type: PartyType, party_id: impl Into<String>) -> Self {
        Self::Party {
            party_type,
            party_id: party_id.into(),
        }
    }

    /// Tag of this variant.
    pub const fn identifier_type(&self) -> IdentifierType {
        match self {
            Self::Id { .. } => IdentifierType::Id,
            Self::Name { .. } => IdentifierType::Name,
            Self::Username { .. } => IdentifierType::Username,
            Self::EmailAddress { .. } => IdentifierType::EmailAddress,
            Self::AdminEmailAddress { .. } => IdentifierType::AdminEmailAddress,
            Self::DeviceImei { .. } => IdentifierType::DeviceImei,
            Self::Party { .. } => IdentifierType::Party,
        }
    }

    /// Check the identifier independent of any entity.
    pub fn is_valid(&self) -> Result<(), IdentifierError> {
        let (field, value) = self.key();
        if value.trim().is_empty() {
            return Err(IdentifierError::Blank {
                identifier_type: self.identifier_type(),
                field,
            });
        }
        Ok(())
    }

    /// Lower to a store filter.
    pub fn to_filter(&self) -> Filter {
        match self {
            Self::Party {
                party_type,
                party_id,
            } => Filter::and([
                Filter::eq("partyType", party_type.as_str()),
                Filter::eq("partyId", party_id.as_str()),
            ]),
            _ => {
                let (field, value) = self.key();
                Filter::eq(field, value)
            }
        }
    }

    fn key(&self) -> (&'static str, &str) {
        match self {
            Self::Id { id } => ("id", id),
            Self::Name { name } => ("name", name),
            Self::Username { username } => ("username", username),
            Self::EmailAddress { email_address } => ("emailAddress", email_address),
            Self::AdminEmailAddress {
                admin_email_address,
            } => ("adminEmailAddress", admin_email_address),
            Self::DeviceImei { imei } => ("imei", imei),
            Self::Party { party_id, .. } => ("partyId", party_id),
        }
    }
}

#[cfg(test)]
mod tests;
