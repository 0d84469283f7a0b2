//! Multi-tenant fleet record core.
//!
//! [`domain`] holds the records, the generic record engine, tenancy scoping
//! and validation. [`outbound`] provides the document store adapters, and
//! [`bootstrap`] wires both together for the binary.

pub mod bootstrap;
pub mod domain;
pub mod outbound;
pub mod settings;
