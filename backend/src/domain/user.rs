//! User records.

use serde::{Deserialize, Serialize};

use super::claims::PartyType;
use super::entity::{Entity, IndexSpec};
use super::identifier::Identifier;

/// A person acting on behalf of a party.
///
/// `username` is omitted from the stored document until the user registers,
/// so the sparse username index only constrains registered users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Record id.
    pub id: String,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Login name, blank until registration.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// Contact email address, unique across users.
    pub email_address: String,
    /// Type of the party the user belongs to.
    pub party_type: Option<PartyType>,
    /// Id of the party the user belongs to.
    pub party_id: String,
    /// Type of the party that created the user.
    pub parent_party_type: Option<PartyType>,
    /// Id of the party that created the user.
    pub parent_id: String,
    /// Whether the user completed registration.
    pub registered: bool,
    /// Role names granted to the user.
    pub roles: Vec<String>,
}

impl User {
    /// Unique indexes for the collection.
    pub fn unique_indexes() -> Vec<IndexSpec> {
        vec![
            IndexSpec::unique(["username"]).sparse(),
            IndexSpec::unique(["emailAddress"]),
        ]
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "user";
    const NAME: &'static str = "user";

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
                | Identifier::Username { .. }
                | Identifier::EmailAddress { .. }
                | Identifier::Party { .. }
        )
    }
}
