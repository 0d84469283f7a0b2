//! Store-neutral predicate tree.
//!
//! Identifiers and criteria lower into a [`Filter`]; claims contextualisation
//! narrows it; document store adapters translate it into their native query
//! form. Field names are dotted JSON paths such as `"owner.id"`.
//!
//! [`Filter::matches`] is the reference evaluation used by the in-memory
//! store. Other adapters must agree with it.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

/// One side of a [`Filter::Range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bound {
    /// Bound value, compared numerically.
    pub value: i64,
    /// Whether documents equal to `value` satisfy the bound.
    pub inclusive: bool,
}

impl Bound {
    /// Bound that admits `value` itself.
    pub const fn inclusive(value: i64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    /// Bound that excludes `value` itself.
    pub const fn exclusive(value: i64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// Predicate over a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals value. Array fields match when any element is equal.
    Eq {
        /// Dotted path.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Case-insensitive substring match on a string field.
    Contains {
        /// Dotted path.
        field: String,
        /// Substring to look for.
        text: String,
    },
    /// Field equals one of the listed values.
    In {
        /// Dotted path.
        field: String,
        /// Accepted values. An empty list matches nothing.
        values: Vec<Value>,
    },
    /// Numeric field within optional bounds.
    Range {
        /// Dotted path.
        field: String,
        /// Lower bound, if any.
        lower: Option<Bound>,
        /// Upper bound, if any.
        upper: Option<Bound>,
    },
    /// Every child matches.
    And(Vec<Filter>),
    /// At least one child matches. An empty disjunction matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    /// Equality on `field`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive substring on `field`.
    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Set membership on `field`.
    pub fn one_of(field: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Numeric range on `field`.
    pub fn range(field: impl Into<String>, lower: Option<Bound>, upper: Option<Bound>) -> Self {
        Self::Range {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// Conjunction of `filters`.
    ///
    /// `All` children are dropped and nested conjunctions are flattened, so an
    /// empty input yields `All` and a single child is returned unchanged.
    pub fn and(filters: impl IntoIterator<Item = Self>) -> Self {
        let mut parts = Vec::new();
        for filter in filters {
            match filter {
                Self::All => {}
                Self::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match <[Self; 1]>::try_from(parts) {
            Ok([only]) => only,
            Err(parts) if parts.is_empty() => Self::All,
            Err(parts) => Self::And(parts),
        }
    }

    /// Disjunction of `filters`.
    pub fn or(filters: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// Evaluate the filter against `document`.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => lookup(document, field).is_some_and(|found| {
                values_equal(found, value)
                    || found
                        .as_array()
                        .is_some_and(|items| items.iter().any(|item| values_equal(item, value)))
            }),
            Self::Contains { field, text } => lookup(document, field)
                .and_then(Value::as_str)
                .is_some_and(|found| found.to_lowercase().contains(&text.to_lowercase())),
            Self::In { field, values } => lookup(document, field)
                .is_some_and(|found| values.iter().any(|value| values_equal(found, value))),
            Self::Range {
                field,
                lower,
                upper,
            } => lookup(document, field)
                .and_then(Value::as_i64)
                .is_some_and(|found| within(found, *lower, *upper)),
            Self::And(children) => children.iter().all(|child| child.matches(document)),
            Self::Or(children) => children.iter().any(|child| child.matches(document)),
        }
    }
}

fn within(value: i64, lower: Option<Bound>, upper: Option<Bound>) -> bool {
    let above = lower.is_none_or(|bound| {
        if bound.inclusive {
            value >= bound.value
        } else {
            value > bound.value
        }
    });
    let below = upper.is_none_or(|bound| {
        if bound.inclusive {
            value <= bound.value
        } else {
            value < bound.value
        }
    });
    above && below
}

/// Resolve a dotted path inside `document`.
///
/// Missing segments and JSON `null` both resolve to `None`.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
        .filter(|value| !value.is_null())
}

/// JSON equality that treats numerically equal numbers as equal.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => {
            compare_present(left, right) == Ordering::Equal
        }
        _ => left == right,
    }
}

/// Total order used for sorting documents on a field.
///
/// Missing values sort first, then numbers, strings, objects, arrays and
/// booleans.
pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => compare_present(left, right),
    }
}

fn compare_present(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a
                .as_f64()
                .zip(b.as_f64())
                .and_then(|(a, b)| a.partial_cmp(&b))
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

#[cfg(test)]
mod tests;
