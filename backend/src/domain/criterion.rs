//! Polymorphic query predicates for collection reads.
//!
//! A [`Criterion`] names a field and the data to match it against. A list of
//! criteria always composes conjunctively through [`criteria_filter`]; only an
//! explicit [`Criterion::Or`] introduces a disjunction.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::{Bound, Filter};

mod wrapped;

pub use self::wrapped::WrappedCriterion;

/// Closed set of criterion tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionType {
    /// Exact text equality.
    ExactText,
    /// Case-insensitive substring.
    SubstringText,
    /// Membership in a list of texts.
    ListText,
    /// Numeric date window.
    DateRange,
    /// Disjunction of nested criteria.
    Or,
}

impl CriterionType {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::ExactText,
        Self::SubstringText,
        Self::ListText,
        Self::DateRange,
        Self::Or,
    ];

    /// Wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactText => "ExactText",
            Self::SubstringText => "Text",
            Self::ListText => "ListText",
            Self::DateRange => "DateRange",
            Self::Or => "Or",
        }
    }

    /// Resolve a wire tag. Matching is exact.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == tag)
    }
}

impl fmt::Display for CriterionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a criterion cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriterionError {
    /// A required value is empty or whitespace.
    #[error("{criterion_type} criterion has blank {field}")]
    Blank {
        /// Offending criterion tag.
        criterion_type: CriterionType,
        /// Offending payload field.
        field: &'static str,
    },
    /// The criterion is structurally unusable.
    #[error("{criterion_type} criterion is invalid: {reason}")]
    Invalid {
        /// Offending criterion tag.
        criterion_type: CriterionType,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The wrapped tag is not a known criterion type.
    #[error("invalid type: {tag}")]
    InvalidType {
        /// Tag as received.
        tag: String,
    },
    /// The wrapped payload does not decode into the tagged variant.
    #[error("unmarshalling {criterion_type} criterion: {message}")]
    Unmarshalling {
        /// Tag the payload was decoded as.
        criterion_type: CriterionType,
        /// Decoder message.
        message: String,
    },
}

/// One side of a date range, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangeValue {
    /// Bound value.
    pub date: i64,
    /// Whether the bound admits `date` itself.
    pub inclusive: bool,
    /// Whether the bound is omitted entirely.
    pub ignore: bool,
}

impl RangeValue {
    /// A bound that admits `date`.
    pub const fn inclusive(date: i64) -> Self {
        Self {
            date,
            inclusive: true,
            ignore: false,
        }
    }

    /// A bound that excludes `date`.
    pub const fn exclusive(date: i64) -> Self {
        Self {
            date,
            inclusive: false,
            ignore: false,
        }
    }

    /// An omitted bound.
    pub const fn ignored() -> Self {
        Self {
            date: 0,
            inclusive: false,
            ignore: true,
        }
    }

    const fn bound(self) -> Option<Bound> {
        if self.ignore {
            None
        } else {
            Some(Bound {
                value: self.date,
                inclusive: self.inclusive,
            })
        }
    }
}

/// A typed query predicate.
///
/// # Examples
/// ```
/// use brain::domain::{Criterion, Filter};
///
/// let criterion = Criterion::exact_text("type", "ZX303");
/// assert!(criterion.is_valid().is_ok());
/// assert_eq!(criterion.to_filter(), Filter::eq("type", "ZX303"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WrappedCriterion", into = "WrappedCriterion")]
pub enum Criterion {
    /// `field` equals `text`.
    ExactText {
        /// Dotted field path.
        field: String,
        /// Expected text.
        text: String,
    },
    /// `field` contains `text`, ignoring case.
    SubstringText {
        /// Dotted field path.
        field: String,
        /// Text to look for.
        text: String,
    },
    /// `field` is one of `list`.
    ListText {
        /// Dotted field path.
        field: String,
        /// Accepted texts.
        list: Vec<String>,
    },
    /// `field` lies between the active bounds.
    DateRange {
        /// Dotted field path.
        field: String,
        /// Lower bound.
        start_date: RangeValue,
        /// Upper bound.
        end_date: RangeValue,
    },
    /// Any of `criteria` holds.
    Or {
        /// Alternatives; must not be empty.
        criteria: Vec<Criterion>,
    },
}

impl Criterion {
    /// Exact text match.
    pub fn exact_text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ExactText {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Case-insensitive substring match.
    pub fn substring_text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::SubstringText {
            field: field.into(),
            text: text.into(),
        }
    }

    /// List membership.
    pub fn list_text<I, S>(field: impl Into<String>, list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ListText {
            field: field.into(),
            list: list.into_iter().map(Into::into).collect(),
        }
    }

    /// Date window.
    pub fn date_range(field: impl Into<String>, start_date: RangeValue, end_date: RangeValue) -> Self {
        Self::DateRange {
            field: field.into(),
            start_date,
            end_date,
        }
    }

    /// Disjunction.
    pub fn or(criteria: impl IntoIterator<Item = Self>) -> Self {
        Self::Or {
            criteria: criteria.into_iter().collect(),
        }
    }

    /// Tag of this variant.
    pub const fn criterion_type(&self) -> CriterionType {
        match self {
            Self::ExactText { .. } => CriterionType::ExactText,
            Self::SubstringText { .. } => CriterionType::SubstringText,
            Self::ListText { .. } => CriterionType::ListText,
            Self::DateRange { .. } => CriterionType::DateRange,
            Self::Or { .. } => CriterionType::Or,
        }
    }

    /// Check the criterion before it is lowered to a filter.
    pub fn is_valid(&self) -> Result<(), CriterionError> {
        let criterion_type = self.criterion_type();
        let invalid = |reason| CriterionError::Invalid {
            criterion_type,
            reason,
        };
        let blank = |field| CriterionError::Blank {
            criterion_type,
            field,
        };

        match self {
            Self::ExactText { field, text } | Self::SubstringText { field, text } => {
                require(field, blank("field"))?;
                require(text, blank("text"))
            }
            Self::ListText { field, list } => {
                require(field, blank("field"))?;
                if list.is_empty() {
                    return Err(invalid("list is empty"));
                }
                if list.iter().any(|entry| entry.trim().is_empty()) {
                    return Err(blank("list"));
                }
                Ok(())
            }
            Self::DateRange {
                field,
                start_date,
                end_date,
            } => {
                require(field, blank("field"))?;
                if start_date.ignore && end_date.ignore {
                    return Err(invalid("both bounds are ignored"));
                }
                if !start_date.ignore && !end_date.ignore && start_date.date > end_date.date {
                    return Err(invalid("startDate is after endDate"));
                }
                Ok(())
            }
            Self::Or { criteria } => {
                if criteria.is_empty() {
                    return Err(invalid("no criteria given"));
                }
                criteria.iter().try_for_each(Self::is_valid)
            }
        }
    }

    /// Lower to a store filter.
    pub fn to_filter(&self) -> Filter {
        match self {
            Self::ExactText { field, text } => Filter::eq(field.as_str(), text.as_str()),
            Self::SubstringText { field, text } => Filter::contains(field.as_str(), text.as_str()),
            Self::ListText { field, list } => {
                Filter::one_of(field.as_str(), list.iter().map(|entry| Value::from(entry.as_str())))
            }
            Self::DateRange {
                field,
                start_date,
                end_date,
            } => Filter::range(field.as_str(), start_date.bound(), end_date.bound()),
            Self::Or { criteria } => Filter::or(criteria.iter().map(Self::to_filter)),
        }
    }
}

fn require(value: &str, error: CriterionError) -> Result<(), CriterionError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}

/// AND-compose a criteria list. An empty list matches everything.
pub fn criteria_filter(criteria: &[Criterion]) -> Filter {
    Filter::and(criteria.iter().map(Criterion::to_filter))
}
