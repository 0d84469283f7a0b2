//! Wire envelope for identifiers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Identifier, IdentifierError, IdentifierType};
use crate::domain::claims::PartyType;

/// `{"type": tag, "value": payload}` form of an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedIdentifier {
    /// Variant tag, kept as text so unknown tags are reported explicitly.
    #[serde(rename = "type")]
    pub identifier_type: String,
    /// Variant payload.
    pub value: Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IdPayload {
    id: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NamePayload {
    name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UsernamePayload {
    username: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct EmailAddressPayload {
    email_address: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct AdminEmailAddressPayload {
    admin_email_address: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceImeiPayload {
    imei: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct PartyPayload {
    party_type: PartyType,
    party_id: String,
}

impl WrappedIdentifier {
    /// Wrap a concrete identifier.
    pub fn wrap(identifier: &Identifier) -> Self {
        let value = match identifier {
            Identifier::Id { id } => json!({ "id": id }),
            Identifier::Name { name } => json!({ "name": name }),
            Identifier::Username { username } => json!({ "username": username }),
            Identifier::EmailAddress { email_address } => {
                json!({ "emailAddress": email_address })
            }
            Identifier::AdminEmailAddress {
                admin_email_address,
            } => json!({ "adminEmailAddress": admin_email_address }),
            Identifier::DeviceImei { imei } => json!({ "imei": imei }),
            Identifier::Party {
                party_type,
                party_id,
            } => json!({ "partyType": party_type, "partyId": party_id }),
        };
        Self {
            identifier_type: identifier.identifier_type().as_str().to_owned(),
            value,
        }
    }

    /// Reconstruct the concrete identifier and validate it.
    ///
    /// Fails closed: an unknown tag, a payload that does not decode, or a
    /// decoded identifier that is not valid all return an error.
    pub fn unwrap(self) -> Result<Identifier, IdentifierError> {
        let identifier_type =
            IdentifierType::parse(&self.identifier_type).ok_or(IdentifierError::InvalidType {
                tag: self.identifier_type,
            })?;
        let value = self.value;

        let identifier = match identifier_type {
            IdentifierType::Id => {
                let IdPayload { id } = decode(identifier_type, value)?;
                Identifier::Id { id }
            }
            IdentifierType::Name => {
                let NamePayload { name } = decode(identifier_type, value)?;
                Identifier::Name { name }
            }
            IdentifierType::Username => {
                let UsernamePayload { username } = decode(identifier_type, value)?;
                Identifier::Username { username }
            }
            IdentifierType::EmailAddress => {
                let EmailAddressPayload { email_address } = decode(identifier_type, value)?;
                Identifier::EmailAddress { email_address }
            }
            IdentifierType::AdminEmailAddress => {
                let AdminEmailAddressPayload {
                    admin_email_address,
                } = decode(identifier_type, value)?;
                Identifier::AdminEmailAddress {
                    admin_email_address,
                }
            }
            IdentifierType::DeviceImei => {
                let DeviceImeiPayload { imei } = decode(identifier_type, value)?;
                Identifier::DeviceImei { imei }
            }
            IdentifierType::Party => {
                let PartyPayload {
                    party_type,
                    party_id,
                } = decode(identifier_type, value)?;
                Identifier::Party {
                    party_type,
                    party_id,
                }
            }
        };

        identifier.is_valid()?;
        Ok(identifier)
    }
}

fn decode<T: DeserializeOwned>(
    identifier_type: IdentifierType,
    value: Value,
) -> Result<T, IdentifierError> {
    serde_json::from_value(value).map_err(|err| IdentifierError::Unmarshalling {
        identifier_type,
        message: err.to_string(),
    })
}

impl From<Identifier> for WrappedIdentifier {
    fn from(value: Identifier) -> Self {
        Self::wrap(&value)
    }
}

impl TryFrom<WrappedIdentifier> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: WrappedIdentifier) -> Result<Self, Self::Error> {
        value.unwrap()
    }
}
