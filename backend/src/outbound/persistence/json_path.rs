//! Render domain filters as SQL/JSON path predicates.
//!
//! The PostgreSQL store evaluates filters with
//! `jsonb_path_match(body, <path>::jsonpath, <vars>::jsonb)`. Every compared
//! value travels in the `vars` object as `$v0`, `$v1`, ...; only field names
//! and `like_regex` patterns are spliced into the path text. Field names must
//! be plain dotted identifiers and patterns are emitted as quoted literals
//! with the `q` (literal) flag.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::{Bound, Filter};

static FIELD_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn field_name_regex() -> &'static Regex {
    FIELD_NAME_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("field name regex failed to compile: {error}"))
    })
}

const MATCH_ALL: &str = "(1 == 1)";
const MATCH_NONE: &str = "(1 == 2)";

/// A field name that cannot be spliced into a path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field name {field:?} is not a dotted identifier")]
pub struct InvalidFieldName {
    /// The rejected name.
    pub field: String,
}

/// A rendered predicate and the variables it references.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPathPredicate {
    /// Path text to cast to `jsonpath`.
    pub path: String,
    /// Object bound as the `vars` argument.
    pub vars: Value,
}

/// Whether `field` may be used as a path or index expression.
pub fn is_field_name(field: &str) -> bool {
    field_name_regex().is_match(field)
}

/// Check `field` and return it unchanged.
pub fn checked_field(field: &str) -> Result<&str, InvalidFieldName> {
    if is_field_name(field) {
        Ok(field)
    } else {
        Err(InvalidFieldName {
            field: field.to_owned(),
        })
    }
}

/// The `{a,b}` text-array literal addressing `field` with `#>`/`#>>`.
pub fn pg_path_literal(field: &str) -> Result<String, InvalidFieldName> {
    let field = checked_field(field)?;
    Ok(format!("'{{{}}}'", field.replace('.', ",")))
}

/// Render `filter` into a path predicate.
pub fn render(filter: &Filter) -> Result<JsonPathPredicate, InvalidFieldName> {
    let mut renderer = Renderer::default();
    let path = renderer.render(filter)?;
    Ok(JsonPathPredicate {
        path,
        vars: Value::Object(renderer.vars),
    })
}

#[derive(Default)]
struct Renderer {
    vars: Map<String, Value>,
}

impl Renderer {
    fn bind(&mut self, value: Value) -> String {
        let name = format!("v{}", self.vars.len());
        self.vars.insert(name.clone(), value);
        format!("${name}")
    }

    fn accessor(field: &str) -> Result<String, InvalidFieldName> {
        let field = checked_field(field)?;
        let segments: Vec<String> = field
            .split('.')
            .map(|segment| format!("\"{segment}\""))
            .collect();
        Ok(format!("$.{}", segments.join(".")))
    }

    fn join(
        &mut self,
        children: &[Filter],
        operator: &str,
        empty: &str,
    ) -> Result<String, InvalidFieldName> {
        if children.is_empty() {
            return Ok(empty.to_owned());
        }
        let parts = children
            .iter()
            .map(|child| self.render(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("({})", parts.join(operator)))
    }

    fn bound(&mut self, accessor: &str, bound: Bound, strict: &str, inclusive: &str) -> String {
        let operator = if bound.inclusive { inclusive } else { strict };
        let var = self.bind(Value::from(bound.value));
        format!("{accessor} {operator} {var}")
    }

    fn render(&mut self, filter: &Filter) -> Result<String, InvalidFieldName> {
        match filter {
            Filter::All => Ok(MATCH_ALL.to_owned()),
            Filter::Eq { field, value } => {
                let accessor = Self::accessor(field)?;
                let var = self.bind(value.clone());
                Ok(format!("({accessor} == {var})"))
            }
            Filter::Contains { field, text } => {
                let accessor = Self::accessor(field)?;
                let pattern = quote(text);
                Ok(format!("({accessor} like_regex {pattern} flag \"iq\")"))
            }
            Filter::In { field, values } => {
                let accessor = Self::accessor(field)?;
                if values.is_empty() {
                    return Ok(MATCH_NONE.to_owned());
                }
                let parts: Vec<String> = values
                    .iter()
                    .map(|value| {
                        let var = self.bind(value.clone());
                        format!("{accessor} == {var}")
                    })
                    .collect();
                Ok(format!("({})", parts.join(" || ")))
            }
            Filter::Range {
                field,
                lower,
                upper,
            } => {
                let accessor = Self::accessor(field)?;
                let mut parts = vec![format!("{accessor}.type() == \"number\"")];
                if let Some(lower) = lower {
                    parts.push(self.bound(&accessor, *lower, ">", ">="));
                }
                if let Some(upper) = upper {
                    parts.push(self.bound(&accessor, *upper, "<", "<="));
                }
                Ok(format!("({})", parts.join(" && ")))
            }
            Filter::And(children) => self.join(children, " && ", MATCH_ALL),
            Filter::Or(children) => self.join(children, " || ", MATCH_NONE),
        }
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
