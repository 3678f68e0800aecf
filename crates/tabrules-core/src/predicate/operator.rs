// tabrules-core/src/predicate/operator.rs
// ============================================================================
// Module: Comparison Operators
// Description: The canonical operator set plus the UI-form synonym map.
// Purpose: Translate rule-document operator tokens (canonical or UI
//          synonyms) into a closed `Operator` enum.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The condition grammar accepts both the canonical operator tokens
//! (`eq`, `gt`, …) and a UI-friendly synonym (`equals`, `greater_than`, …).
//! Translation from synonym to canonical token is lossless: every synonym
//! maps to exactly one canonical operator and round-trips through
//! [`Operator::as_str`].

use std::fmt;

/// A resolved comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equality.
    Eq,
    /// Inequality.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Substring containment.
    Contains,
    /// Negated substring containment.
    NotContains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Regex match.
    Regex,
    /// Negated regex match.
    NotRegex,
    /// Set membership.
    In,
    /// Negated set membership.
    NotIn,
    /// Identity/boolean check (`{is: [path, bool]}`).
    Is,
}

impl Operator {
    /// Parses a canonical operator token, returning `None` if unrecognized.
    #[must_use]
    pub fn parse_canonical(token: &str) -> Option<Self> {
        Some(match token {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "not_contains" => Self::NotContains,
            "starts_with" => Self::StartsWith,
            "ends_with" => Self::EndsWith,
            "regex" => Self::Regex,
            "not_regex" => Self::NotRegex,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "is" => Self::Is,
            _ => return None,
        })
    }

    /// Parses either a canonical token or a UI-form synonym.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::parse_canonical(token).or_else(|| Self::parse_synonym(token))
    }

    fn parse_synonym(token: &str) -> Option<Self> {
        Some(match token {
            "equals" => Self::Eq,
            "not_equals" => Self::Neq,
            "greater_than" => Self::Gt,
            "greater_than_or_equal" => Self::Gte,
            "less_than" => Self::Lt,
            "less_than_or_equal" => Self::Lte,
            "includes" => Self::Contains,
            "excludes" => Self::NotContains,
            "begins_with" => Self::StartsWith,
            "matches" => Self::Regex,
            "does_not_match" => Self::NotRegex,
            "one_of" => Self::In,
            "none_of" => Self::NotIn,
            _ => return None,
        })
    }

    /// Returns the canonical token for this operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Regex => "regex",
            Self::NotRegex => "not_regex",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Is => "is",
        }
    }

    /// Whether a missing path should make this operator succeed rather
    /// than fail. Every operator fails closed on a missing path except
    /// `neq`/`not_contains`, which treat "absent" as "not equal"/"does not
    /// contain".
    #[must_use]
    pub const fn succeeds_on_missing(self) -> bool {
        matches!(self, Self::Neq | Self::NotContains)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Operator;

    #[test]
    fn synonyms_resolve_to_canonical() {
        assert_eq!(Operator::parse("equals"), Some(Operator::Eq));
        assert_eq!(Operator::parse("greater_than"), Some(Operator::Gt));
        assert_eq!(Operator::parse("matches"), Some(Operator::Regex));
    }

    #[test]
    fn canonical_round_trips_through_as_str() {
        for token in ["eq", "neq", "gt", "gte", "lt", "lte", "contains", "not_contains", "starts_with", "ends_with", "regex", "not_regex", "in", "not_in", "is"] {
            let op = Operator::parse_canonical(token).expect("known token");
            assert_eq!(op.as_str(), token);
        }
    }

    #[test]
    fn unknown_token_is_none() {
        assert_eq!(Operator::parse("frobnicate"), None);
    }
}
