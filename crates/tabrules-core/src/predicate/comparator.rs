// tabrules-core/src/predicate/comparator.rs
// ============================================================================
// Module: Comparator
// Description: Evaluates one resolved comparison operator against a tab
//              field value and a literal.
// Purpose: Isolate the per-operator comparison semantics, including the
//          missing-path fail-open/fail-closed split.
// Dependencies: regex
// ============================================================================

//! ## Overview
//! One function per operator family, a shared "missing" fallback, and a
//! non-suspending, side-effect-free evaluation contract. There is no
//! tri-state "insufficient evidence" result here — a path is either present
//! or the comparison fails closed (see [`super::operator::Operator::succeeds_on_missing`]).

use super::operator::Operator;

/// A tab field's resolved value, or absence.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A string field.
    Str(String),
    /// A boolean field.
    Bool(bool),
    /// A numeric field (durations, ages, counts).
    Num(f64),
    /// The path resolved to nothing for this tab.
    Missing,
}

/// A comparison's literal operand, coerced from the rule document's JSON
/// value at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A string literal.
    Str(String),
    /// A boolean literal.
    Bool(bool),
    /// A numeric literal (including duration literals converted to ms).
    Num(f64),
    /// A list literal, for `in`/`not_in`.
    List(Vec<String>),
}

/// Evaluates `field <op> literal`.
#[must_use]
pub fn evaluate(field: &FieldValue, op: Operator, literal: &Literal) -> bool {
    if matches!(field, FieldValue::Missing) {
        return op.succeeds_on_missing();
    }

    match op {
        Operator::Eq => fields_equal(field, literal),
        Operator::Neq => !fields_equal(field, literal),
        Operator::Gt => numeric_cmp(field, literal).is_some_and(|ord| ord == std::cmp::Ordering::Greater),
        Operator::Gte => numeric_cmp(field, literal).is_some_and(|ord| ord != std::cmp::Ordering::Less),
        Operator::Lt => numeric_cmp(field, literal).is_some_and(|ord| ord == std::cmp::Ordering::Less),
        Operator::Lte => numeric_cmp(field, literal).is_some_and(|ord| ord != std::cmp::Ordering::Greater),
        Operator::Contains => string_op(field, literal, |haystack, needle| haystack.contains(needle)),
        Operator::NotContains => !string_op(field, literal, |haystack, needle| haystack.contains(needle)),
        Operator::StartsWith => string_op(field, literal, str::starts_with),
        Operator::EndsWith => string_op(field, literal, str::ends_with),
        Operator::In => match (field, literal) {
            (FieldValue::Str(s), Literal::List(items)) => items.contains(s),
            _ => false,
        },
        Operator::NotIn => match (field, literal) {
            (FieldValue::Str(s), Literal::List(items)) => !items.contains(s),
            _ => true,
        },
        Operator::Is => fields_equal(field, literal),
        // Regex/NotRegex are evaluated by the caller against a precompiled
        // `Regex`, never through this generic literal path.
        Operator::Regex | Operator::NotRegex => false,
    }
}

fn fields_equal(field: &FieldValue, literal: &Literal) -> bool {
    match (field, literal) {
        (FieldValue::Str(a), Literal::Str(b)) => a == b,
        (FieldValue::Bool(a), Literal::Bool(b)) => a == b,
        (FieldValue::Num(a), Literal::Num(b)) => (a - b).abs() < f64::EPSILON,
        _ => false,
    }
}

fn numeric_cmp(field: &FieldValue, literal: &Literal) -> Option<std::cmp::Ordering> {
    let (FieldValue::Num(a), Literal::Num(b)) = (field, literal) else {
        return None;
    };
    a.partial_cmp(b)
}

fn string_op(field: &FieldValue, literal: &Literal, f: impl Fn(&str, &str) -> bool) -> bool {
    match (field, literal) {
        (FieldValue::Str(a), Literal::Str(b)) => f(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::evaluate;
    use super::FieldValue;
    use super::Literal;
    use crate::predicate::operator::Operator;

    #[test]
    fn missing_fails_closed_except_neq_and_not_contains() {
        assert!(!evaluate(&FieldValue::Missing, Operator::Eq, &Literal::Str("x".into())));
        assert!(evaluate(&FieldValue::Missing, Operator::Neq, &Literal::Str("x".into())));
        assert!(evaluate(&FieldValue::Missing, Operator::NotContains, &Literal::Str("x".into())));
        assert!(!evaluate(&FieldValue::Missing, Operator::Contains, &Literal::Str("x".into())));
    }

    #[test]
    fn numeric_ordering() {
        let field = FieldValue::Num(10.0);
        assert!(evaluate(&field, Operator::Gt, &Literal::Num(5.0)));
        assert!(!evaluate(&field, Operator::Lt, &Literal::Num(5.0)));
        assert!(evaluate(&field, Operator::Gte, &Literal::Num(10.0)));
    }

    #[test]
    fn in_and_not_in() {
        let field = FieldValue::Str("dev".into());
        let list = Literal::List(vec!["dev".into(), "news".into()]);
        assert!(evaluate(&field, Operator::In, &list));
        assert!(!evaluate(&field, Operator::NotIn, &list));
    }
}
