//! Party records: the platform operator, companies and their clients.
//!
//! Parties own users and devices. A company is parented by the system party;
//! a client is parented by a company (or by the system party directly).

use serde::{Deserialize, Serialize};

use super::claims::PartyType;
use super::entity::{Entity, IndexSpec};
use super::identifier::Identifier;

mod administrator;
mod client_validator;
mod company_administrator;
mod company_validator;

pub use self::administrator::BasicPartyAdministrator;
pub use self::client_validator::ClientValidator;
pub use self::company_administrator::CompanyAdministrator;
pub use self::company_validator::CompanyValidator;

/// The root party operating the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct System {
    /// Record id.
    pub id: String,
    /// Unique display name.
    pub name: String,
    /// Administrator contact.
    pub admin_email_address: String,
}

impl System {
    /// Unique indexes for the collection.
    pub fn unique_indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::unique(["name"])]
    }
}

impl Entity for System {
    const COLLECTION: &'static str = "system";
    const NAME: &'static str = "system";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn is_valid_identifier(identifier: &Identifier) -> bool {
        matches!(identifier, Identifier::Id { .. } | Identifier::Name { .. })
    }
}

/// A company tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    /// Record id.
    pub id: String,
    /// Unique display name.
    pub name: String,
    /// Administrator contact, unique across companies.
    pub admin_email_address: String,
    /// Type of the parent party.
    pub parent_party_type: Option<PartyType>,
    /// Id of the parent party.
    pub parent_id: String,
}

impl Company {
    /// Unique indexes for the collection.
    pub fn unique_indexes() -> Vec<IndexSpec> {
        vec![
            IndexSpec::unique(["name"]),
            IndexSpec::unique(["adminEmailAddress"]),
        ]
    }
}

impl Entity for Company {
    const COLLECTION: &'static str = "company";
    const NAME: &'static str = "company";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn is_valid_identifier(identifier: &Identifier) -> bool {
        matches!(
            identifier,
            Identifier::Id { .. } | Identifier::Name { .. } | Identifier::AdminEmailAddress { .. }
        )
    }
}

/// A client of a company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Administrator contact, unique across clients.
    pub admin_email_address: String,
    /// Type of the parent party.
    pub parent_party_type: Option<PartyType>,
    /// Id of the parent party.
    pub parent_id: String,
}

impl Client {
    /// Unique indexes for the collection.
    pub fn unique_indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::unique(["adminEmailAddress"])]
    }
}

impl Entity for Client {
    const COLLECTION: &'static str = "client";
    const NAME: &'static str = "client";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn is_valid_identifier(identifier: &Identifier) -> bool {
        matches!(
            identifier,
            Identifier::Id { .. }
                | Identifier::EmailAddress { .. }
                | Identifier::AdminEmailAddress { .. }
        )
    }
}

/// Any party, as returned by a party lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Party {
    /// The platform operator.
    System(System),
    /// A company.
    Company(Company),
    /// A client.
    Client(Client),
}

impl Party {
    /// Type of the wrapped party.
    pub const fn party_type(&self) -> PartyType {
        match self {
            Self::System(_) => PartyType::System,
            Self::Company(_) => PartyType::Company,
            Self::Client(_) => PartyType::Client,
        }
    }

    /// Id of the wrapped party.
    pub fn id(&self) -> &str {
        match self {
            Self::System(system) => &system.id,
            Self::Company(company) => &company.id,
            Self::Client(client) => &client.id,
        }
    }
}
