//! Error handling utilities for repositories

use parley_core::{DomainError, Snowflake};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
///
/// Any failure that is not a constraint violation leaves the caller unable to
/// tell whether the store is healthy, so it surfaces as `StoreUnavailable`.
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::StoreUnavailable(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

/// A message referencing a user row that does not exist
pub fn map_missing_participant(e: SqlxError, sender: Snowflake, receiver: Snowflake) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            let missing = match db_err.constraint() {
                Some(name) if name.contains("sender") => sender,
                _ => receiver,
            };
            return DomainError::UserNotFound(missing);
        }
    }
    map_db_error(e)
}
