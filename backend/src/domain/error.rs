//! Domain-level error payloads shared by record handler ports.
//!
//! These errors are transport agnostic. Each failing step contributes a short
//! reason ("inserting record") followed by the underlying message, so callers
//! can report the chain without string-matching store-specific sentinels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered list of human-readable reasons attached to an error.
///
/// # Examples
/// ```
/// use brain::domain::Reasons;
///
/// let reasons = Reasons::from(["inserting record", "duplicate key"]);
/// assert_eq!(reasons.to_string(), "inserting record; duplicate key");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reasons(Vec<String>);

impl Reasons {
    /// Build reasons from any sequence of messages.
    pub fn new<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(reasons.into_iter().map(Into::into).collect())
    }

    /// Borrow the reasons in order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Whether any reason mentions `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.0.iter().any(|reason| reason.contains(needle))
    }
}

impl fmt::Display for Reasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

impl From<Vec<String>> for Reasons {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<String> for Reasons {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<&str> for Reasons {
    fn from(value: &str) -> Self {
        Self(vec![value.to_owned()])
    }
}

impl<const N: usize> From<[&str; N]> for Reasons {
    fn from(value: [&str; N]) -> Self {
        Self::new(value)
    }
}

impl From<Reasons> for Vec<String> {
    fn from(value: Reasons) -> Self {
        value.0
    }
}
