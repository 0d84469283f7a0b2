//! Typed record handler ports, one per persisted entity.
//!
//! Each port is implemented by [`RecordHandler`](crate::domain::RecordHandler)
//! at its entity type and mocked in tests of the code that consumes it.

use crate::domain::{Client, Company, Reading, System, User, Zx303};

use super::define_record_handler_port;

define_record_handler_port! {
    /// Persistence for the system party.
    pub trait SystemRecordHandler for System;
    /// Errors raised by [`SystemRecordHandler`].
    pub enum SystemRecordHandlerError;
}

define_record_handler_port! {
    /// Persistence for companies.
    pub trait CompanyRecordHandler for Company;
    /// Errors raised by [`CompanyRecordHandler`].
    pub enum CompanyRecordHandlerError;
}

define_record_handler_port! {
    /// Persistence for clients.
    pub trait ClientRecordHandler for Client;
    /// Errors raised by [`ClientRecordHandler`].
    pub enum ClientRecordHandlerError;
}

define_record_handler_port! {
    /// Persistence for users.
    pub trait UserRecordHandler for User;
    /// Errors raised by [`UserRecordHandler`].
    pub enum UserRecordHandlerError;
}

define_record_handler_port! {
    /// Persistence for ZX303 trackers.
    pub trait Zx303RecordHandler for Zx303;
    /// Errors raised by [`Zx303RecordHandler`].
    pub enum Zx303RecordHandlerError;
}

define_record_handler_port! {
    /// Persistence for device readings.
    pub trait ReadingRecordHandler for Reading;
    /// Errors raised by [`ReadingRecordHandler`].
    pub enum ReadingRecordHandlerError;
}
