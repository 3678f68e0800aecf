// tabrules-logic/src/lib.rs
// ============================================================================
// Module: Requirement Root
// Description: Public API surface for the generic boolean requirement subsystem.
// Purpose: Wire together core modules and re-exports for domain-agnostic use.
// Dependencies: crate::{builder, error, requirement}
// ============================================================================

//! ## Overview
//! A small, domain-agnostic boolean algebra over typed leaf predicates:
//! `All`, `Any`, `Not`, and `Predicate`. Domains plug in a leaf predicate
//! type and an evaluation context; this crate only owns the tree shape and
//! its short-circuiting evaluation order.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod builder;
pub mod error;
pub mod requirement;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::RequirementError;
pub use error::RequirementResult;
pub use requirement::PredicateEval;
pub use requirement::Requirement;

// ============================================================================
// SECTION: Convenience DSL
// ============================================================================

/// Convenience functions for creating requirements without builders
pub mod convenience {
    use super::Requirement;

    /// Creates a requirement requiring all of the given requirements
    #[must_use]
    pub fn all<P>(requirements: Vec<Requirement<P>>) -> Requirement<P> {
        Requirement::all(requirements)
    }

    /// Creates a requirement requiring any of the given requirements
    #[must_use]
    pub fn any<P>(requirements: Vec<Requirement<P>>) -> Requirement<P> {
        Requirement::any(requirements)
    }

    /// Creates a requirement that inverts another requirement
    #[must_use]
    pub fn not<P>(requirement: Requirement<P>) -> Requirement<P> {
        Requirement::negate(requirement)
    }

    /// Creates a requirement from a predicate
    #[must_use]
    pub const fn predicate<P>(predicate: P) -> Requirement<P> {
        Requirement::predicate(predicate)
    }
}
