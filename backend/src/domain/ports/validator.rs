//! Port for entity validators.
//!
//! A validator evaluates every rule for a candidate record, drops the facts
//! its ignore table tolerates for the requested [`Action`], and returns the
//! rest. An empty list means the candidate may be written.

use async_trait::async_trait;

use crate::domain::{Action, Claims, ReasonInvalid, Reasons};

use super::define_port_error;

define_port_error! {
    /// Errors raised while validating, as opposed to validation findings.
    pub enum ValidatorError {
        /// The request itself was unusable.
        RequestInvalid { reasons: Reasons } => "validate request invalid: {reasons}",
        /// A lookup the rules depend on failed outright.
        Lookup { message: String } => "validation lookup failed: {message}",
    }
}

/// Candidate record to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateRequest<E> {
    /// Caller tenancy.
    pub claims: Claims,
    /// Candidate record.
    pub entity: E,
    /// Write the candidate is destined for.
    pub action: Action,
}

impl<E> ValidateRequest<E> {
    /// Build a validate request.
    pub const fn new(claims: Claims, entity: E, action: Action) -> Self {
        Self {
            claims,
            entity,
            action,
        }
    }
}

/// Rule set for records of type `E`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Validator<E: Send + Sync + 'static>: Send + Sync {
    /// Return every reason `request.entity` may not be written.
    async fn validate(
        &self,
        request: ValidateRequest<E>,
    ) -> Result<Vec<ReasonInvalid>, ValidatorError>;
}
