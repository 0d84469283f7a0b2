//! Field-level validation facts and action-scoped ignore tables.
//!
//! Validators evaluate every rule for a candidate record and return the full
//! list of [`ReasonInvalid`] facts. Each validator owns an [`IgnoredReasons`]
//! table and drops the facts that are tolerable for the current [`Action`],
//! such as a blank `id` on create, which the record handler assigns.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parties::Party;
use super::ports::PartyAdministratorError;

/// Closed set of reasons a field can be invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonKind {
    /// Required value is empty.
    Blank,
    /// Value is malformed or inconsistent.
    Invalid,
    /// Value collides with another record.
    Duplicate,
    /// Referenced record does not exist.
    MustExist,
    /// Value must not be set in this context.
    MustNotBeSet,
    /// The rule could not be evaluated.
    Unknown,
}

impl fmt::Display for ReasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Blank => "blank",
            Self::Invalid => "invalid",
            Self::Duplicate => "duplicate",
            Self::MustExist => "must exist",
            Self::MustNotBeSet => "must not be set",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Why a candidate record failed one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonInvalid {
    /// Offending field, as named on the wire.
    pub field: String,
    /// Kind of violation.
    #[serde(rename = "type")]
    pub kind: ReasonKind,
    /// Message for the caller.
    pub help: String,
    /// The offending value.
    pub data: Value,
}

impl ReasonInvalid {
    /// Build a reason.
    pub fn new(
        field: impl Into<String>,
        kind: ReasonKind,
        help: impl Into<String>,
        data: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            kind,
            help: help.into(),
            data: data.into(),
        }
    }

    /// Shorthand for a [`ReasonKind::Blank`] reason.
    pub fn blank(field: impl Into<String>, data: impl Into<Value>) -> Self {
        Self::new(field, ReasonKind::Blank, "required", data)
    }
}

impl fmt::Display for ReasonInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is {}: {}", self.field, self.kind, self.help)
    }
}

/// Write operation a candidate is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// New record; the record handler assigns the identity.
    Create,
    /// Whole-record replacement.
    Update,
    /// Replacement restricted to the fields an administrator may change.
    UpdateAllowedFields,
}

/// Per-action table of `(field, kind)` pairs a validator tolerates.
///
/// An action with no entry tolerates nothing.
///
/// # Examples
/// ```
/// use brain::domain::{Action, IgnoredReasons, ReasonInvalid, ReasonKind};
///
/// let ignored = IgnoredReasons::default().ignore(Action::Create, "id", [ReasonKind::Blank]);
/// let blank_id = ReasonInvalid::blank("id", "");
///
/// assert!(ignored.can_ignore(Action::Create, &blank_id));
/// assert!(!ignored.can_ignore(Action::Update, &blank_id));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoredReasons {
    by_action: HashMap<Action, HashMap<String, HashSet<ReasonKind>>>,
}

impl IgnoredReasons {
    /// Tolerate `kinds` on `field` for `action`.
    #[must_use]
    pub fn ignore(
        mut self,
        action: Action,
        field: impl Into<String>,
        kinds: impl IntoIterator<Item = ReasonKind>,
    ) -> Self {
        self.by_action
            .entry(action)
            .or_default()
            .entry(field.into())
            .or_default()
            .extend(kinds);
        self
    }

    /// Whether `reason` is tolerated for `action`.
    pub fn can_ignore(&self, action: Action, reason: &ReasonInvalid) -> bool {
        self.by_action
            .get(&action)
            .and_then(|fields| fields.get(&reason.field))
            .is_some_and(|kinds| kinds.contains(&reason.kind))
    }

    /// Keep only the reasons not tolerated for `action`, in order.
    pub fn filter(&self, action: Action, reasons: Vec<ReasonInvalid>) -> Vec<ReasonInvalid> {
        reasons
            .into_iter()
            .filter(|reason| !self.can_ignore(action, reason))
            .collect()
    }
}

/// Reason for a uniqueness lookup of `field` = `value`, if any.
///
/// A found record conflicts unless `is_same` says it is the candidate
/// itself. A missing record is the expected outcome; any other lookup
/// failure yields [`ReasonKind::Unknown`].
pub(crate) fn duplicate_reason<T, E: fmt::Display>(
    field: &str,
    value: &str,
    lookup: Result<T, E>,
    is_not_found: impl FnOnce(&E) -> bool,
    is_same: impl FnOnce(&T) -> bool,
) -> Option<ReasonInvalid> {
    match lookup {
        Ok(found) if is_same(&found) => None,
        Ok(_) => Some(ReasonInvalid::new(
            field,
            ReasonKind::Duplicate,
            "already exists",
            value,
        )),
        Err(err) if is_not_found(&err) => None,
        Err(err) => Some(ReasonInvalid::new(
            field,
            ReasonKind::Unknown,
            format!("unknown error: {err}"),
            value,
        )),
    }
}

/// Reason for a party reference `field` = `party_id`, if any.
///
/// `role` names the reference in help text, as in "owner party must exist".
pub(crate) fn existence_reason(
    field: &str,
    role: &str,
    party_id: &str,
    lookup: Result<Party, PartyAdministratorError>,
) -> Option<ReasonInvalid> {
    match lookup {
        Ok(_) => None,
        Err(PartyAdministratorError::NotFound { .. }) => Some(ReasonInvalid::new(
            field,
            ReasonKind::MustExist,
            format!("{role} party must exist"),
            party_id,
        )),
        Err(err) => Some(ReasonInvalid::new(
            field,
            ReasonKind::Unknown,
            format!("error retrieving {role} party: {err}"),
            party_id,
        )),
    }
}

#[cfg(test)]
mod tests;
