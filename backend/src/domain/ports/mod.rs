//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`DocumentStore`], [`IdGenerator`]) are implemented by
//! outbound adapters. The typed record handler ports, [`Validator`] and
//! [`PartyAdministrator`] are consumed by the administrators and validators
//! and mocked in their tests.

mod macros;
pub(crate) use macros::{define_port_error, define_record_handler_port};

mod document_store;
mod id_generator;
mod party_administrator;
mod record_handlers;
mod validator;

#[cfg(test)]
pub use document_store::MockDocumentSession;
pub use document_store::{CollectionError, DocumentSession, DocumentStore, FindOptions};
#[cfg(test)]
pub use id_generator::MockIdGenerator;
pub use id_generator::{IdGenerationError, IdGenerator, UuidIdGenerator};
#[cfg(test)]
pub use party_administrator::MockPartyAdministrator;
pub use party_administrator::{PartyAdministrator, PartyAdministratorError};
#[cfg(test)]
pub use record_handlers::{
    MockClientRecordHandler, MockCompanyRecordHandler, MockReadingRecordHandler,
    MockSystemRecordHandler, MockUserRecordHandler, MockZx303RecordHandler,
};
pub use record_handlers::{
    ClientRecordHandler, ClientRecordHandlerError, CompanyRecordHandler, CompanyRecordHandlerError,
    ReadingRecordHandler, ReadingRecordHandlerError, SystemRecordHandler, SystemRecordHandlerError,
    UserRecordHandler, UserRecordHandlerError, Zx303RecordHandler, Zx303RecordHandlerError,
};
#[cfg(test)]
pub use validator::MockValidator;
pub use validator::{ValidateRequest, Validator, ValidatorError};
