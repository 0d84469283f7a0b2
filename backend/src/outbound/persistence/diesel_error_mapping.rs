//! Map pool and Diesel failures onto [`CollectionError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::CollectionError;

use super::pool::PoolError;

/// Map a pool failure to a connection error.
pub fn map_pool_error(error: PoolError) -> CollectionError {
    CollectionError::connection(error.into_message())
}

/// Map a Diesel failure during `operation`, logging the driver detail.
///
/// Unique violations become [`CollectionError::Duplicate`] so the record
/// handler can report them as create or update failures.
pub fn map_diesel_error(error: DieselError, operation: &str) -> CollectionError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        other => debug!(error_message = %other, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => CollectionError::not_found(),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            CollectionError::duplicate(
                info.constraint_name()
                    .map_or_else(|| info.message().to_owned(), str::to_owned),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CollectionError::connection(format!("{operation}: database connection closed"))
        }
        other => CollectionError::query(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, CollectionError::connection("timed out"));
    }

    #[rstest]
    fn diesel_not_found_is_preserved() {
        assert_eq!(
            map_diesel_error(DieselError::NotFound, "find one"),
            CollectionError::NotFound
        );
    }

    #[rstest]
    fn other_failures_name_the_operation() {
        let err = map_diesel_error(DieselError::RollbackTransaction, "insert");
        assert!(matches!(err, CollectionError::Query { ref message } if message.starts_with("insert: ")));
    }
}
