// tabrules-core/src/error.rs
// ============================================================================
// Module: Engine Error Taxonomy
// Description: Structured error types for rule validation, driver calls,
//              storage, and action conflicts.
// Purpose: Give every failure path a typed, loggable shape instead of a
//          stringly-typed catch-all.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Five error families: validation, driver, storage, conflict, and fatal.
//! Only [`EngineError`] propagates out of `run_rule` as a `Result` err; the
//! rest are captured as data inside [`crate::model::RuleRunResult::errors`].

use thiserror::Error;

use crate::model::TabId;

/// A malformed rule: unknown operator, unknown action, invalid regex, or a
/// type-mismatched comparison value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A condition referenced an operator the compiler doesn't recognize.
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// A condition referenced a path the compiler doesn't recognize.
    #[error("unknown path: {0}")]
    UnknownPath(String),

    /// An action record named a type the dispatcher doesn't recognize.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A regex-based condition failed to compile.
    #[error("invalid regex in condition: {0}")]
    InvalidRegex(String),

    /// A comparison value didn't match the type the operator expects.
    #[error("type mismatch for operator {operator} at path {path}")]
    TypeMismatch {
        /// Offending operator.
        operator: String,
        /// Offending path.
        path: String,
    },
}

/// A browser driver call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The referenced tab no longer exists.
    #[error("tab not found: {0}")]
    TabNotFound(TabId),

    /// The driver denied the call (permission, rate limit, or similar).
    #[error("driver call failed for tab {tab_id}: {message}")]
    CallFailed {
        /// The tab the call targeted.
        tab_id: TabId,
        /// Driver-supplied failure message.
        message: String,
    },
}

/// A key-value store get/set/remove call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A read failed.
    #[error("storage read failed for key {key}: {message}")]
    ReadFailed {
        /// Key that failed to read.
        key: String,
        /// Store-supplied failure message.
        message: String,
    },

    /// A write failed.
    #[error("storage write failed for key {key}: {message}")]
    WriteFailed {
        /// Key that failed to write.
        key: String,
        /// Store-supplied failure message.
        message: String,
    },
}

/// An action-list conflict the validator detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    /// Two actions in the same `then` list contradict each other.
    #[error("conflicting actions: {first} and {second}")]
    Contradictory {
        /// First action name in the pair.
        first: String,
        /// Second action name in the pair.
        second: String,
    },

    /// An action follows a `close` targeting the same tab.
    #[error("action {action} scheduled after close on the same tab")]
    AfterClose {
        /// The action that follows a close.
        action: String,
    },
}

/// Unrecoverable setup failure: the engine could not even begin a run.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The requested rule id is not known to the rule store.
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    /// The rule document failed to parse or validate before evaluation
    /// could start.
    #[error("rule spec invalid: {0}")]
    InvalidSpec(#[from] ValidationError),

    /// The rule store itself failed to answer.
    #[error("rule store error: {0}")]
    Store(#[from] StorageError),
}

/// One error entry attached to a [`crate::model::RuleRunResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    /// Tab the error concerns, if any (some errors are rule-wide).
    pub tab_id: Option<TabId>,
    /// Action name the error concerns, if any.
    pub action: String,
    /// Human-readable message.
    pub message: String,
}

impl RunError {
    /// Builds a run error from a driver error tied to one tab.
    #[must_use]
    pub fn from_driver(action: impl Into<String>, error: &DriverError) -> Self {
        let tab_id = match error {
            DriverError::TabNotFound(id) | DriverError::CallFailed { tab_id: id, .. } => {
                Some(*id)
            }
        };
        Self {
            tab_id,
            action: action.into(),
            message: error.to_string(),
        }
    }

    /// Builds a run error with no specific tab.
    #[must_use]
    pub fn rule_wide(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tab_id: None,
            action: action.into(),
            message: message.into(),
        }
    }
}
