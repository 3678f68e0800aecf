// tabrules-core/src/predicate/condition.rs
// ============================================================================
// Module: Condition Tree
// Description: The JSON-shaped condition grammar and its parser.
// Purpose: Parse rule-document conditions (junction, comparison, UI form)
//          into a structural `Condition` tree ahead of compilation.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Parsing here is deliberately lenient: an unrecognized operator token is
//! *not* a parse failure. It becomes a subtree that always evaluates false,
//! with a compile-time warning — see [`crate::predicate::compile`]. Only a
//! structurally unrecognizable JSON shape fails to parse.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A parsed condition node. Operator tokens are kept as raw strings; they
/// are resolved against [`super::operator::Operator`] during compilation so
/// that an unknown token can degrade to "always false" instead of aborting
/// the whole tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Condition {
    /// A bare `{}` with no `all`/`any`/comparison key at all: "no
    /// restriction given", which selects every tab. Distinct from an
    /// explicit `{all: []}` (see below) — see
    /// [`crate::predicate::evaluate`] for why the two shapes diverge.
    MatchAll,
    /// `{all: [...]}`. An explicitly empty list is the documented
    /// "matches no tab" case (the safety-first override of naive vacuous
    /// truth) — only this shape triggers that override, not a bare `{}`.
    All(Vec<Condition>),
    /// `{any: [...]}`.
    Any(Vec<Condition>),
    /// `{none: [...]}`, sugar for `not(any(...))`.
    None(Vec<Condition>),
    /// `{not: C}`.
    Not(Box<Condition>),
    /// `{op: [path, value]}` or its UI-form equivalent.
    Compare {
        /// Dotted path, e.g. `tab.url`.
        path: String,
        /// Raw operator token (canonical or synonym).
        op: String,
        /// Literal comparison value.
        value: Value,
    },
}

/// Error parsing a condition document into a [`Condition`] tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized condition shape: {0}")]
pub struct ConditionParseError(String);

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Value> for Condition {
    type Error = ConditionParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ConditionParseError(format!(
                "expected a JSON object, got {value}"
            )));
        };

        if map.is_empty() {
            return Ok(Self::MatchAll);
        }

        if let Some(children) = map.get("all") {
            return Ok(Self::All(parse_children(children)?));
        }
        if let Some(children) = map.get("any") {
            return Ok(Self::Any(parse_children(children)?));
        }
        if let Some(children) = map.get("none") {
            return Ok(Self::None(parse_children(children)?));
        }
        if let Some(inner) = map.get("not") {
            return Ok(Self::Not(Box::new(Self::try_from(inner.clone())?)));
        }
        if map.contains_key("subject") {
            let subject = map
                .get("subject")
                .and_then(Value::as_str)
                .ok_or_else(|| ConditionParseError("UI-form condition missing \"subject\"".to_string()))?;
            let operator = map
                .get("operator")
                .and_then(Value::as_str)
                .ok_or_else(|| ConditionParseError("UI-form condition missing \"operator\"".to_string()))?;
            let value = map.get("value").cloned().unwrap_or(Value::Null);
            return Ok(Self::Compare {
                path: subject.to_string(),
                op: operator.to_string(),
                value,
            });
        }

        if map.len() == 1 {
            let Some((key, inner)) = map.into_iter().next() else {
                return Err(ConditionParseError("empty comparison object".to_string()));
            };
            if let Value::Array(items) = inner {
                if items.len() == 2 {
                    let path = items[0]
                        .as_str()
                        .ok_or_else(|| ConditionParseError(format!("comparison path must be a string, key {key}")))?
                        .to_string();
                    return Ok(Self::Compare {
                        path,
                        op: key,
                        value: items[1].clone(),
                    });
                }
            }
            return Err(ConditionParseError(format!(
                "comparison under key \"{key}\" must be a 2-element array"
            )));
        }

        Err(ConditionParseError(
            "object did not match any recognized condition shape".to_string(),
        ))
    }
}

fn parse_children(value: &Value) -> Result<Vec<Condition>, ConditionParseError> {
    let Value::Array(items) = value else {
        return Err(ConditionParseError("junction body must be an array".to_string()));
    };
    items.iter().cloned().map(Condition::try_from).collect()
}
