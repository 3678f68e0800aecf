// tabrules-core/src/predicate/mod.rs
// ============================================================================
// Module: Predicate Compiler
// Description: Compiles a `Condition` tree into a `Requirement<TabPredicate>`
//              evaluator.
// Purpose: Turn rule-document JSON into a fast, reusable evaluator closure
//          over enriched tabs.
// Dependencies: tabrules_logic, regex, crate::model
// ============================================================================

//! ## Overview
//! Compilation resolves every leaf's path and operator once, so evaluation
//! never re-parses the rule document. Unknown operators, unknown paths, and
//! invalid regex are compile-time diagnostics (`tracing::warn!`) that
//! degrade the offending subtree to an always-false leaf rather than
//! aborting the whole tree — one malformed condition must not sink the
//! rest of the rule's evaluation.

pub mod comparator;
pub mod condition;
pub mod operator;

use regex::Regex;
use tabrules_logic::requirement::PredicateEval;
use tabrules_logic::requirement::Requirement;

use self::comparator::FieldValue;
use self::comparator::Literal;
use self::condition::Condition;
use self::operator::Operator;
use crate::model::EnrichedTab;
use crate::model::Indices;
use crate::model::TimestampMs;

/// Borrowed evaluation context for one predicate: the tab under test plus
/// the snapshot-wide indices and clock it was enriched against.
pub struct EvalContext<'a> {
    /// The tab being tested.
    pub tab: &'a EnrichedTab,
    /// Indices derived from the full snapshot.
    pub indices: &'a Indices,
    /// The snapshot's reference time.
    pub now: TimestampMs,
}

/// A resolved, compiled leaf predicate.
#[derive(Debug, Clone)]
pub enum TabPredicate {
    /// A non-regex comparison against a resolved path.
    Compare {
        /// Resolved path.
        path: Path,
        /// Resolved operator.
        op: Operator,
        /// Coerced literal operand.
        literal: Literal,
    },
    /// A regex comparison, precompiled at compile time.
    Regex {
        /// Resolved path.
        path: Path,
        /// Precompiled pattern.
        regex: Regex,
        /// Whether this is the negated form (`not_regex`).
        negate: bool,
    },
    /// Always evaluates to `false`; the degraded form for unknown
    /// operators, unknown paths, and invalid regex.
    AlwaysFalse,
}

impl PredicateEval<EvalContext<'_>> for TabPredicate {
    fn eval(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            Self::Compare { path, op, literal } => {
                let field = resolve_path(*path, ctx);
                comparator::evaluate(&field, *op, literal)
            }
            Self::Regex { path, regex, negate } => {
                let field = resolve_path(*path, ctx);
                let matched = match field {
                    FieldValue::Str(s) => regex.is_match(&s),
                    FieldValue::Missing => return *negate,
                    _ => false,
                };
                if *negate {
                    !matched
                } else {
                    matched
                }
            }
            Self::AlwaysFalse => false,
        }
    }
}

/// A resolved dotted path into the tab/window/index data the compiler can
/// read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Path {
    /// `tab.url`.
    Url,
    /// `tab.title`.
    Title,
    /// `tab.domain`.
    Domain,
    /// `tab.pinned` / `tab.isPinned`.
    Pinned,
    /// `tab.active` / `tab.isActive`.
    Active,
    /// `tab.audible` / `tab.isAudible`.
    Audible,
    /// `tab.muted` / `tab.isMuted`.
    Muted,
    /// `tab.age`, milliseconds.
    Age,
    /// `tab.last_access`, milliseconds since last access.
    LastAccess,
    /// `tab.isDupe`.
    IsDupe,
    /// `tab.category`.
    Category,
    /// `tab.countPerOrigin:domain`.
    CountPerDomain,
    /// `tab.countPerOrigin:origin`.
    CountPerOrigin,
    /// `tab.countPerOrigin:dupeKey`.
    CountPerDupeKey,
    /// `window.tabCount`.
    WindowTabCount,
}

impl Path {
    /// Parses a dotted path string, returning `None` if unrecognized.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "tab.url" => Self::Url,
            "tab.title" => Self::Title,
            "tab.domain" => Self::Domain,
            "tab.pinned" | "tab.isPinned" => Self::Pinned,
            "tab.active" | "tab.isActive" => Self::Active,
            "tab.audible" | "tab.isAudible" => Self::Audible,
            "tab.muted" | "tab.isMuted" => Self::Muted,
            "tab.age" => Self::Age,
            "tab.last_access" => Self::LastAccess,
            "tab.isDupe" => Self::IsDupe,
            "tab.category" => Self::Category,
            "tab.countPerOrigin:domain" => Self::CountPerDomain,
            "tab.countPerOrigin:origin" => Self::CountPerOrigin,
            "tab.countPerOrigin:dupeKey" => Self::CountPerDupeKey,
            "window.tabCount" => Self::WindowTabCount,
            _ => return None,
        })
    }

    /// Whether this path is duration-valued, making `"30m"`-style literals
    /// eligible for millisecond coercion.
    #[must_use]
    pub const fn is_duration_valued(self) -> bool {
        matches!(self, Self::Age | Self::LastAccess)
    }
}

fn resolve_path(path: Path, ctx: &EvalContext<'_>) -> FieldValue {
    let tab = ctx.tab;
    match path {
        Path::Url => FieldValue::Str(tab.tab.url.clone()),
        Path::Title => FieldValue::Str(tab.tab.title.clone()),
        Path::Domain => FieldValue::Str(tab.domain.clone()),
        Path::Pinned => FieldValue::Bool(tab.tab.pinned),
        Path::Active => FieldValue::Bool(tab.tab.active),
        Path::Audible => FieldValue::Bool(tab.tab.audible),
        Path::Muted => FieldValue::Bool(tab.tab.muted),
        Path::Age => FieldValue::Num(tab.age_ms as f64),
        Path::LastAccess => tab
            .tab
            .last_accessed
            .map_or(FieldValue::Missing, |last| FieldValue::Num((ctx.now - last) as f64)),
        Path::IsDupe => FieldValue::Bool(tab.is_dupe),
        Path::Category => FieldValue::Str(tab.category.clone()),
        Path::CountPerDomain => count_for(&ctx.indices.by_domain, &tab.domain),
        Path::CountPerOrigin => count_for(&ctx.indices.by_origin, &tab.origin),
        Path::CountPerDupeKey => count_for(&ctx.indices.by_dupe_key, &tab.dupe_key),
        Path::WindowTabCount => ctx
            .indices
            .tab_count_by_window
            .get(&tab.tab.window_id)
            .map_or(FieldValue::Missing, |count| FieldValue::Num(*count as f64)),
    }
}

fn count_for(index: &std::collections::HashMap<String, Vec<crate::model::TabId>>, key: &str) -> FieldValue {
    index
        .get(key)
        .map_or(FieldValue::Num(0.0), |tabs| FieldValue::Num(tabs.len() as f64))
}

fn coerce_literal(path: Path, value: &serde_json::Value) -> Literal {
    if path.is_duration_valued() {
        if let Some(text) = value.as_str() {
            if let Some(ms) = crate::duration::parse_duration_ms(text) {
                return Literal::Num(ms as f64);
            }
        }
    }
    match value {
        serde_json::Value::String(s) => Literal::Str(s.clone()),
        serde_json::Value::Bool(b) => Literal::Bool(*b),
        serde_json::Value::Number(n) => Literal::Num(n.as_f64().unwrap_or_default()),
        serde_json::Value::Array(items) => {
            Literal::List(items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        }
        _ => Literal::Str(value.to_string()),
    }
}

/// Compiles a parsed [`Condition`] tree into an evaluator.
///
/// Unknown operators, unknown paths, and invalid regex degrade their
/// subtree to [`TabPredicate::AlwaysFalse`] with a `tracing::warn!` rather
/// than failing the whole compile: one bad clause must not sink the rest
/// of the rule.
#[must_use]
pub fn compile(condition: &Condition) -> Requirement<TabPredicate> {
    match condition {
        Condition::MatchAll => Requirement::all(Vec::new()),
        Condition::All(children) => Requirement::all(children.iter().map(compile).collect()),
        Condition::Any(children) => Requirement::any(children.iter().map(compile).collect()),
        Condition::None(children) => {
            Requirement::negate(Requirement::any(children.iter().map(compile).collect()))
        }
        Condition::Not(inner) => Requirement::negate(compile(inner)),
        Condition::Compare { path, op, value } => compile_leaf(path, op, value),
    }
}

fn compile_leaf(path: &str, op: &str, value: &serde_json::Value) -> Requirement<TabPredicate> {
    let Some(resolved_path) = Path::parse(path) else {
        tracing::warn!(path, "unknown condition path; subtree always false");
        return Requirement::predicate(TabPredicate::AlwaysFalse);
    };
    let Some(resolved_op) = Operator::parse(op) else {
        tracing::warn!(op, "unknown condition operator; subtree always false");
        return Requirement::predicate(TabPredicate::AlwaysFalse);
    };

    if matches!(resolved_op, Operator::Regex | Operator::NotRegex) {
        let Some(pattern) = value.as_str() else {
            tracing::warn!(path, "regex condition value must be a string; subtree always false");
            return Requirement::predicate(TabPredicate::AlwaysFalse);
        };
        let pattern = pattern.strip_prefix('/').and_then(|p| p.strip_suffix('/')).unwrap_or(pattern);
        return match Regex::new(pattern) {
            Ok(regex) => Requirement::predicate(TabPredicate::Regex {
                path: resolved_path,
                regex,
                negate: matches!(resolved_op, Operator::NotRegex),
            }),
            Err(error) => {
                tracing::warn!(path, pattern, %error, "invalid regex; subtree always false");
                Requirement::predicate(TabPredicate::AlwaysFalse)
            }
        };
    }

    let literal = coerce_literal(resolved_path, value);
    Requirement::predicate(TabPredicate::Compare {
        path: resolved_path,
        op: resolved_op,
        literal,
    })
}

/// Evaluates a compiled requirement tree, applying the documented
/// "empty `all` matches no tab" policy override before handing off to the
/// underlying boolean algebra.
#[must_use]
pub fn evaluate(requirement: &Requirement<TabPredicate>, condition: &Condition, ctx: &EvalContext<'_>) -> bool {
    if matches!(condition, Condition::All(children) if children.is_empty()) {
        return false;
    }
    requirement.eval(ctx)
}
