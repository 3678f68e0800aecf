// tabrules-logic/src/builder.rs
// ============================================================================
// Module: Requirement Builders
// Description: Fluent builders over the universal requirement tree.
// Purpose: Provide ergonomic, type-safe APIs for composing boolean requirements.
// Dependencies: crate::requirement::Requirement
// ============================================================================

//! ## Overview
//! Fluent builders simplify composing requirement trees by enabling chained
//! calls for `all`, `any`, and `not` while preserving the same invariants as
//! the core [`Requirement`] algebra.

use std::ops::Not;

use crate::requirement::Requirement;

/// Fluent builder for constructing requirements programmatically.
pub struct RequirementBuilder<P> {
    /// Root requirement under construction.
    requirement: Requirement<P>,
}

impl<P> RequirementBuilder<P> {
    /// Creates a new builder with the given requirement as the root.
    pub const fn new(requirement: Requirement<P>) -> Self {
        Self {
            requirement,
        }
    }

    /// Creates a builder starting with a predicate.
    #[must_use]
    pub const fn predicate(predicate: P) -> Self {
        Self::new(Requirement::Predicate(predicate))
    }

    /// Creates a builder starting with an `All` requirement.
    #[must_use]
    pub const fn all() -> AllBuilder<P> {
        AllBuilder::<P>::new()
    }

    /// Creates a builder starting with an `Any` requirement.
    #[must_use]
    pub const fn any() -> AnyBuilder<P> {
        AnyBuilder::<P>::new()
    }

    /// Combines this requirement with another using `All`.
    #[must_use]
    pub fn and_also(self, other: Requirement<P>) -> Self {
        Self::new(Requirement::all(vec![self.requirement, other]))
    }

    /// Combines this requirement with another using `Any`.
    #[must_use]
    pub fn or_else(self, other: Requirement<P>) -> Self {
        Self::new(Requirement::any(vec![self.requirement, other]))
    }

    /// Builds the final requirement.
    pub fn build(self) -> Requirement<P> {
        self.requirement
    }
}

impl<P> Not for RequirementBuilder<P> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::new(Requirement::negate(self.requirement))
    }
}

/// Builder for `All` requirements with fluent chaining.
pub struct AllBuilder<P> {
    /// Requirements collected for the `All` clause.
    requirements: Vec<Requirement<P>>,
}

impl<P> AllBuilder<P> {
    /// Creates a new `All` builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requirements: Vec::new(),
        }
    }

    /// Adds a requirement to the `All` clause.
    #[must_use]
    pub fn with(mut self, requirement: Requirement<P>) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Adds a predicate to the `All` clause.
    #[must_use]
    pub fn with_predicate(mut self, predicate: P) -> Self {
        self.requirements.push(Requirement::Predicate(predicate));
        self
    }

    /// Builds the `All` requirement.
    #[must_use]
    pub fn build(self) -> Requirement<P> {
        Requirement::all(self.requirements)
    }
}

impl<P> Default for AllBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Any` requirements with fluent chaining.
pub struct AnyBuilder<P> {
    /// Requirements collected for the `Any` clause.
    requirements: Vec<Requirement<P>>,
}

impl<P> AnyBuilder<P> {
    /// Creates a new `Any` builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requirements: Vec::new(),
        }
    }

    /// Adds a requirement to the `Any` clause.
    #[must_use]
    pub fn with(mut self, requirement: Requirement<P>) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Adds a predicate to the `Any` clause.
    #[must_use]
    pub fn with_predicate(mut self, predicate: P) -> Self {
        self.requirements.push(Requirement::Predicate(predicate));
        self
    }

    /// Builds the `Any` requirement.
    #[must_use]
    pub fn build(self) -> Requirement<P> {
        Requirement::any(self.requirements)
    }
}

impl<P> Default for AnyBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
