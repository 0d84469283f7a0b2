//! Document persistence adapters.
//!
//! [`DieselDocumentStore`] keeps every collection in one PostgreSQL table
//! through `diesel-async` and a `bb8` pool. [`InMemoryDocumentStore`] offers
//! the same port without a database for tests and local runs.
//!
//! # Example
//!
//! ```ignore
//! use brain::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/brain")).await?;
//! let store = DieselDocumentStore::new(pool);
//! ```

mod diesel_document_store;
mod diesel_error_mapping;
pub mod json_path;
mod memory_document_store;
mod migrations;
mod pool;

pub use diesel_document_store::DieselDocumentStore;
pub use memory_document_store::InMemoryDocumentStore;
pub use migrations::{MIGRATIONS, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
