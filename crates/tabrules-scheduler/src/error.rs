// tabrules-scheduler/src/error.rs
// ============================================================================
// Module: Scheduler Errors
// Description: Structured failures for trigger persistence and install.
// ============================================================================

use thiserror::Error;

/// Failures the scheduler can report.
///
/// Per the error handling design, a `StorageError` here is logged and the
/// scheduler continues; a failed persist of a one-shot trigger downgrades
/// to in-memory only, with a warning, rather than aborting the install.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The trigger store failed to read persisted triggers.
    #[error("failed to read scheduled triggers: {0}")]
    StoreRead(String),

    /// The trigger store failed to write persisted triggers.
    #[error("failed to write scheduled triggers: {0}")]
    StoreWrite(String),

    /// A persisted trigger record failed to (de)serialize.
    #[error("malformed scheduled trigger record: {0}")]
    Malformed(String),
}
