// tabrules-logic/src/requirement.rs
// ============================================================================
// Module: Requirement Core Types
// Description: Boolean algebra over typed predicates (All / Any / Not / leaf).
// Purpose: Define `Requirement` and its evaluation, independent of any domain.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! This module defines the core requirement tree: universal logical
//! combinators (`All`, `Any`, `Not`) plus a `Predicate` leaf where
//! domain-specific semantics are injected. Evaluation short-circuits the
//! way any reasonable boolean evaluator would.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

// ============================================================================
// SECTION: Predicate Evaluation Trait
// ============================================================================

/// Domain-specific leaf evaluation contract.
///
/// A leaf predicate evaluates against a borrowed context `Ctx` (for this
/// workspace, an enriched tab plus its execution context) and returns a
/// plain boolean — there is no "unknown" state in this domain (missing
/// data is coerced to a concrete boolean at the leaf, see
/// `tabrules_core::predicate`).
pub trait PredicateEval<Ctx> {
    /// Evaluates this predicate against the given context.
    fn eval(&self, ctx: &Ctx) -> bool;
}

// ============================================================================
// SECTION: Requirement Definition
// ============================================================================

/// Universal requirement tree with domain-specific leaves
///
/// # Invariants
/// - Evaluation of `All`/`Any` short-circuits on the first determining leaf.
/// - An empty `All` is conventionally treated as "no tab matches" by callers
///   in this workspace (see `tabrules_core::predicate`), even though the
///   bare boolean algebra here would call empty-`All` vacuously true; the
///   domain layer enforces the documented "empty condition matches nothing"
///   policy before handing a tree to [`Requirement::eval`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement<P> {
    /// Logical AND: all sub-requirements must be satisfied.
    All(SmallVec<[Box<Self>; 4]>),

    /// Logical OR: at least one sub-requirement must be satisfied.
    Any(SmallVec<[Box<Self>; 4]>),

    /// Logical NOT: inverts the result of the sub-requirement.
    Not(Box<Self>),

    /// Domain-specific atomic predicate.
    Predicate(P),
}

impl<P> Requirement<P> {
    /// Evaluates this requirement with short-circuiting.
    pub fn eval<Ctx>(&self, ctx: &Ctx) -> bool
    where
        P: PredicateEval<Ctx>,
    {
        match self {
            Self::Predicate(predicate) => predicate.eval(ctx),
            Self::Not(requirement) => !requirement.eval(ctx),
            Self::All(requirements) => requirements.iter().all(|req| req.eval(ctx)),
            Self::Any(requirements) => requirements.iter().any(|req| req.eval(ctx)),
        }
    }

    /// Returns the number of nodes in this requirement tree.
    #[must_use]
    pub fn complexity(&self) -> usize {
        match self {
            Self::Predicate(_) => 1,
            Self::Not(req) => 1 + req.complexity(),
            Self::All(reqs) | Self::Any(reqs) => {
                1 + reqs.iter().map(|r| r.complexity()).sum::<usize>()
            }
        }
    }
}

// ============================================================================
// SECTION: Constructor Helpers
// ============================================================================

impl<P> Requirement<P> {
    /// Creates a logical AND (`all`) of the given requirements.
    pub fn all(requirements: Vec<Self>) -> Self {
        Self::All(requirements.into_iter().map(Box::new).collect())
    }

    /// Creates a logical OR (`any`) of the given requirements.
    pub fn any(requirements: Vec<Self>) -> Self {
        Self::Any(requirements.into_iter().map(Box::new).collect())
    }

    /// Creates a logical NOT of the given requirement.
    pub fn negate(requirement: Self) -> Self {
        Self::Not(Box::new(requirement))
    }

    /// Creates a requirement from a leaf predicate.
    pub const fn predicate(predicate: P) -> Self {
        Self::Predicate(predicate)
    }

    /// Returns whether this requirement is an empty `All` (the
    /// "empty condition" case the host domain treats specially).
    #[must_use]
    pub fn is_empty_all(&self) -> bool {
        matches!(self, Self::All(reqs) if reqs.is_empty())
    }
}

impl<P> std::ops::Not for Requirement<P> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

// ============================================================================
// SECTION: Default Implementation
// ============================================================================

impl<P> Default for Requirement<P> {
    /// Creates an empty `All` requirement.
    ///
    /// Note this is the *algebraic* identity (vacuously true); the domain
    /// layer in `tabrules-core` overrides this at the policy level to mean
    /// "match no tab" per the documented safety-first reading.
    fn default() -> Self {
        Self::All(SmallVec::new())
    }
}
