//! Domain primitives, the record engine and the rules layered on it.
//!
//! Purpose: describe the fleet-management records (parties, users, trackers
//! and readings), how callers address them ([`Identifier`], [`Criterion`]),
//! how a caller's tenancy narrows every query ([`Claims`]), and the generic
//! [`RecordHandler`] that persists them through the [`ports`].
//!
//! Public surface:
//! - [`Reasons`]: ordered failure explanations.
//! - [`Identifier`] and [`Criterion`]: tagged addressing values with
//!   `{type, value}` wire forms.
//! - [`RecordHandler`]: CRUD and paging for any [`Entity`].
//! - Validators and administrators for companies, clients and trackers.

pub mod claims;
pub mod criterion;
pub mod entity;
pub mod error;
pub mod filter;
pub mod identifier;
pub mod parties;
pub mod ports;
pub mod record_handler;
pub mod trackers;
pub mod user;
pub mod validation;

mod administrator;

pub use self::administrator::AdministratorError;
pub use self::claims::{
    Claims, ClaimsError, ContextualiseFilter, PartyType, contextualise_owned_or_assigned,
    contextualise_party_children, contextualise_party_members, contextualise_party_self,
};
pub use self::criterion::{
    Criterion, CriterionError, CriterionType, RangeValue, WrappedCriterion, criteria_filter,
};
pub use self::entity::{Entity, IndexSpec};
pub use self::error::Reasons;
pub use self::filter::{Bound, Filter};
pub use self::identifier::{Identifier, IdentifierError, IdentifierType, WrappedIdentifier};
pub use self::parties::{
    BasicPartyAdministrator, Client, ClientValidator, Company, CompanyAdministrator,
    CompanyValidator, Party, System,
};
pub use self::record_handler::{
    CollectRequest, DeleteRequest, RecordHandler, RecordHandlerError, RetrieveRequest,
    UpdateRequest,
};
pub use self::trackers::{DeviceType, Reading, Zx303, Zx303Administrator, Zx303Validator};
pub use self::user::User;
pub use self::validation::{Action, IgnoredReasons, ReasonInvalid, ReasonKind};
