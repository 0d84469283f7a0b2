//! Wire envelope for criteria.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Criterion, CriterionError, CriterionType, RangeValue};

/// `{"type": tag, "value": payload}` form of a [`Criterion`].
///
/// `Or` payloads hold wrapped children: `{"criteria": [{"type", "value"}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedCriterion {
    /// Variant tag, kept as text so unknown tags are reported explicitly.
    #[serde(rename = "type")]
    pub criterion_type: String,
    /// Variant payload.
    pub value: Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TextPayload {
    field: String,
    text: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListTextPayload {
    field: String,
    list: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct DateRangePayload {
    field: String,
    #[serde(default = "RangeValue::ignored")]
    start_date: RangeValue,
    #[serde(default = "RangeValue::ignored")]
    end_date: RangeValue,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OrPayload {
    criteria: Vec<WrappedCriterion>,
}

fn range_value(value: RangeValue) -> Value {
    json!({
        "date": value.date,
        "inclusive": value.inclusive,
        "ignore": value.ignore,
    })
}

impl WrappedCriterion {
    /// Wrap a concrete criterion. `Or` children are wrapped recursively.
    pub fn wrap(criterion: &Criterion) -> Self {
        let value = match criterion {
            Criterion::ExactText { field, text } | Criterion::SubstringText { field, text } => {
                json!({ "field": field, "text": text })
            }
            Criterion::ListText { field, list } => json!({ "field": field, "list": list }),
            Criterion::DateRange {
                field,
                start_date,
                end_date,
            } => json!({
                "field": field,
                "startDate": range_value(*start_date),
                "endDate": range_value(*end_date),
            }),
            Criterion::Or { criteria } => {
                let children: Vec<Value> = criteria
                    .iter()
                    .map(|child| Self::wrap(child).into_value())
                    .collect();
                json!({ "criteria": children })
            }
        };
        Self {
            criterion_type: criterion.criterion_type().as_str().to_owned(),
            value,
        }
    }

    /// Render the envelope as a JSON value.
    pub fn into_value(self) -> Value {
        json!({ "type": self.criterion_type, "value": self.value })
    }

    /// Reconstruct the concrete criterion and validate it.
    ///
    /// Fails closed on unknown tags, undecodable payloads and invalid
    /// criteria. `Or` children are unwrapped first and their errors surface
    /// unchanged.
    pub fn unwrap(self) -> Result<Criterion, CriterionError> {
        let criterion_type =
            CriterionType::parse(&self.criterion_type).ok_or(CriterionError::InvalidType {
                tag: self.criterion_type,
            })?;
        let value = self.value;

        let criterion = match criterion_type {
            CriterionType::ExactText => {
                let TextPayload { field, text } = decode(criterion_type, value)?;
                Criterion::ExactText { field, text }
            }
            CriterionType::SubstringText => {
                let TextPayload { field, text } = decode(criterion_type, value)?;
                Criterion::SubstringText { field, text }
            }
            CriterionType::ListText => {
                let ListTextPayload { field, list } = decode(criterion_type, value)?;
                Criterion::ListText { field, list }
            }
            CriterionType::DateRange => {
                let DateRangePayload {
                    field,
                    start_date,
                    end_date,
                } = decode(criterion_type, value)?;
                Criterion::DateRange {
                    field,
                    start_date,
                    end_date,
                }
            }
            CriterionType::Or => {
                let OrPayload { criteria } = decode(criterion_type, value)?;
                let criteria = criteria
                    .into_iter()
                    .map(Self::unwrap)
                    .collect::<Result<Vec<_>, _>>()?;
                Criterion::Or { criteria }
            }
        };

        criterion.is_valid()?;
        Ok(criterion)
    }
}

fn decode<T: DeserializeOwned>(
    criterion_type: CriterionType,
    value: Value,
) -> Result<T, CriterionError> {
    serde_json::from_value(value).map_err(|err| CriterionError::Unmarshalling {
        criterion_type,
        message: err.to_string(),
    })
}

impl From<Criterion> for WrappedCriterion {
    fn from(value: Criterion) -> Self {
        Self::wrap(&value)
    }
}

impl TryFrom<WrappedCriterion> for Criterion {
    type Error = CriterionError;

    fn try_from(value: WrappedCriterion) -> Result<Self, Self::Error> {
        value.unwrap()
    }
}
