//! Contract shared by every persisted record type.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::identifier::Identifier;

/// A persisted business object with exactly one engine-assigned identity.
///
/// Documents are stored as the entity's serde JSON form in the collection
/// named by [`Entity::COLLECTION`]; the identity lives in the `id` field.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection holding this entity's documents.
    const COLLECTION: &'static str;
    /// Entity name used in error reasons.
    const NAME: &'static str;

    /// Current identity. Empty before creation.
    fn id(&self) -> &str;

    /// Replace the identity. Only the record handler calls this, on create.
    fn set_id(&mut self, id: String);

    /// Whether `identifier` may be used to look this entity up.
    fn is_valid_identifier(identifier: &Identifier) -> bool;
}

/// Index requested on a collection at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Dotted field paths making up the index key.
    pub fields: Vec<String>,
    /// Reject two documents with the same key.
    pub unique: bool,
    /// Skip documents missing any indexed field.
    pub sparse: bool,
}

impl IndexSpec {
    /// Unique index on `fields`.
    pub fn unique<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            unique: true,
            sparse: false,
        }
    }

    /// Mark the index sparse.
    #[must_use]
    pub const fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    /// Stable index name for `collection`, e.g. `company_name_uniq`.
    pub fn name(&self, collection: &str) -> String {
        let key = self
            .fields
            .iter()
            .map(|field| field.replace('.', "_"))
            .collect::<Vec<_>>()
            .join("_");
        let suffix = if self.unique { "uniq" } else { "idx" };
        format!("{collection}_{key}_{suffix}").to_lowercase()
    }
}
