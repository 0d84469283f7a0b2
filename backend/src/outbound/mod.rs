//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: document stores backing the record handlers, one over
//!   PostgreSQL via Diesel and one in memory.
//!
//! Adapters translate between domain types and storage representations and
//! hold no business rules.

pub mod persistence;
