// tabrules-store-sqlite/src/error.rs
// ============================================================================
// Module: SQLite Store Errors
// Description: Structured error taxonomy for the SQLite-backed key-value
//              store, with conversions into the scheduler's and core's
//              error types.
// ============================================================================

use thiserror::Error;

/// `SQLite` store errors.
///
/// # Invariants
/// - Messages never embed raw stored values (they may be arbitrary JSON).
#[derive(Debug, Clone, Error)]
pub enum SqliteStoreError {
    /// The store path or its parent directory could not be prepared.
    #[error("sqlite store io error: {0}")]
    Io(String),

    /// The `SQLite` engine reported a failure executing a statement.
    #[error("sqlite store db error: {0}")]
    Db(String),

    /// The store configuration or a stored value was invalid.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}
