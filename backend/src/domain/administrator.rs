//! Errors shared by the entity administrators.
//!
//! Administrators sit above the typed record handler ports: they validate a
//! candidate, then delegate. Each typed port error is folded into
//! [`AdministratorError`] through [`records_error!`] so callers match on one
//! taxonomy regardless of entity.

use super::ports::{ValidatorError, define_port_error};
use super::{ReasonInvalid, Reasons};

define_port_error! {
    /// Errors raised by company and tracker administrators.
    pub enum AdministratorError {
        /// The candidate failed validation; nothing was written.
        Validation { reasons: Vec<ReasonInvalid> } => "validation failed: {reasons:?}",
        /// The request was rejected by the record handler.
        RequestInvalid { reasons: Reasons } => "request invalid: {reasons}",
        /// The addressed record does not exist for the caller.
        NotFound => "record not found",
        /// The record handler failed.
        Records { message: String } => "record handler failed: {message}",
        /// The validator could not evaluate the candidate.
        Validator { message: String } => "validator failed: {message}",
    }
}

impl From<ValidatorError> for AdministratorError {
    fn from(error: ValidatorError) -> Self {
        Self::validator(error.to_string())
    }
}

/// Fold a typed record handler error into [`AdministratorError`].
macro_rules! records_error {
    ($error:ident) => {
        impl From<$crate::domain::ports::$error> for $crate::domain::AdministratorError {
            fn from(error: $crate::domain::ports::$error) -> Self {
                use $crate::domain::ports::$error as Typed;
                match error {
                    Typed::NotFound => Self::NotFound,
                    Typed::RequestInvalid { reasons } => Self::RequestInvalid { reasons },
                    other => Self::records(other.to_string()),
                }
            }
        }
    };
}

records_error!(CompanyRecordHandlerError);
records_error!(Zx303RecordHandlerError);
