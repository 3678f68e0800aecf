// tabrules-logic/src/error.rs
// ============================================================================
// Module: Requirement Error Definitions
// Description: Structured diagnostics for the requirement system.
// Purpose: Provide errors for requirement tree construction and validation.
// Dependencies: std::fmt
// ============================================================================

//! ## Overview
//! Centralizes the requirement construction errors so evaluation and
//! higher-level compiler layers remain decoupled while still exposing
//! actionable diagnostics.

use std::fmt;

/// Errors that can occur while constructing or validating a requirement tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementError {
    /// The requirement tree exceeded the maximum supported nesting depth.
    TooDeep {
        /// Maximum allowed recursion depth.
        max_depth: usize,
        /// Depth encountered while validating.
        actual_depth: usize,
    },

    /// Invalid requirement structure was encountered.
    InvalidStructure(String),

    /// An error occurred that doesn't fit other categories.
    Other(String),
}

impl fmt::Display for RequirementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooDeep {
                max_depth,
                actual_depth,
            } => {
                write!(f, "requirement tree too deep: {actual_depth} levels (max {max_depth})")
            }
            Self::InvalidStructure(msg) => write!(f, "invalid requirement structure: {msg}"),
            Self::Other(msg) => write!(f, "requirement error: {msg}"),
        }
    }
}

impl std::error::Error for RequirementError {}

impl RequirementError {
    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure(message.into())
    }
}

impl From<String> for RequirementError {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}

impl From<&str> for RequirementError {
    fn from(message: &str) -> Self {
        Self::Other(message.to_string())
    }
}

/// Convenient Result type for requirement operations.
pub type RequirementResult<T = ()> = Result<T, RequirementError>;
