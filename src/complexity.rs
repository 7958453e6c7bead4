//! Order-of-magnitude complexity estimate for a sample response.
//!
//! The walk visits the sample level by level:
//! - every visited value adds 1
//! - an array field multiplies the running score of its level by the array's
//!   length, and only its first element is visited on the next level
//!   (arrays are assumed homogeneous)
//! - a nested object is visited on the next level
//! - scalar fields add nothing
//! - the `pageInfo` field is skipped entirely
//!
//! The result is an order-of-magnitude estimate, not an exact server cost.

use serde_json::Value;

use crate::config::PAGE_INFO_FIELD;

/// Shape of a response value, as far as cost estimation cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticValue {
    /// Strings, numbers, booleans and null
    Scalar,
    /// An ordered list of values
    Array(Vec<SemanticValue>),
    /// Named fields, in response order
    Object(Vec<(String, SemanticValue)>),
}

impl From<&Value> for SemanticValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Array(items) => SemanticValue::Array(items.iter().map(Self::from).collect()),
            Value::Object(fields) => SemanticValue::Object(
                fields
                    .iter()
                    .map(|(key, field)| (key.clone(), Self::from(field)))
                    .collect(),
            ),
            _ => SemanticValue::Scalar,
        }
    }
}

/// Placeholder visited for an empty array, which has no representative element.
static EMPTY_SAMPLE: SemanticValue = SemanticValue::Scalar;

/// Scores a sequence of sample values.
///
/// Pure: the same structure always yields the same score.
pub fn score<'a, I>(objects: I) -> u64
where
    I: IntoIterator<Item = &'a SemanticValue>,
{
    let mut total: u64 = 0;
    let mut level: Vec<&SemanticValue> = objects.into_iter().collect();

    while !level.is_empty() {
        let mut complexity: u64 = 0;
        let mut next = Vec::new();

        for value in level {
            complexity += 1;
            match value {
                SemanticValue::Object(fields) => {
                    for (key, field) in fields {
                        if key != PAGE_INFO_FIELD {
                            visit_child(field, &mut complexity, &mut next);
                        }
                    }
                }
                SemanticValue::Array(items) => {
                    for item in items {
                        visit_child(item, &mut complexity, &mut next);
                    }
                }
                SemanticValue::Scalar => {}
            }
        }

        total = total.saturating_add(complexity);
        level = next;
    }

    total
}

fn visit_child<'a>(child: &'a SemanticValue, complexity: &mut u64, next: &mut Vec<&'a SemanticValue>) {
    match child {
        SemanticValue::Array(items) => {
            *complexity = complexity.saturating_mul(items.len() as u64);
            next.push(items.first().unwrap_or(&EMPTY_SAMPLE));
        }
        SemanticValue::Object(_) => next.push(child),
        SemanticValue::Scalar => {}
    }
}

/// Scores JSON samples directly.
pub fn score_json<'a, I>(objects: I) -> u64
where
    I: IntoIterator<Item = &'a Value>,
{
    let shapes: Vec<SemanticValue> = objects.into_iter().map(SemanticValue::from).collect();
    score(&shapes)
}

/// Scores one response payload.
///
/// The payload's top-level fields are the samples, so the wrapping response
/// object itself is not counted. A non-object payload is scored on its own.
pub fn score_payload(payload: &Value) -> u64 {
    match payload {
        Value::Object(fields) => score_json(fields.values()),
        other => score_json([other]),
    }
}
