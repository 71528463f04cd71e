//! Declarative queries with named parameters.
//!
//! A [`QuerySpec`] pairs a [`Filter`] tree with a set of named parameters, in
//! the style of managed document databases:
//!
//! ```rust
//! use users_api::store::{Filter, QuerySpec};
//! use serde_json::json;
//!
//! let spec = QuerySpec::new(Filter::eq_param("type", "@type").and(Filter::eq_param("id", "@userId")))
//!     .with_parameter("@type", json!("user"))
//!     .with_parameter("@userId", json!("u1"));
//!
//! assert_eq!(spec.to_string(), "SELECT * FROM c WHERE c.type = @type AND c.id = @userId");
//! assert!(spec.matches(&json!({"id": "u1", "type": "user"})));
//! ```
//!
//! A comparison against a parameter that was never supplied evaluates to
//! false, so optional criteria can be left out by simply not declaring them.

use crate::store::StoreError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Right-hand side of an equality comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A named parameter such as `@email`.
    Param(String),
    /// An inline constant.
    Literal(Value),
}

/// Boolean filter over document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `c.<field> = <operand>`; `field` may use dot notation for nesting.
    Eq { field: String, operand: Operand },
    /// All sub-filters must match. An empty conjunction matches everything.
    And(Vec<Filter>),
    /// At least one sub-filter must match. An empty disjunction matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    /// Compare a field against a named parameter.
    pub fn eq_param(field: impl Into<String>, name: impl Into<String>) -> Self {
        Filter::Eq {
            field: field.into(),
            operand: Operand::Param(name.into()),
        }
    }

    /// Compare a field against a constant.
    pub fn eq_literal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            operand: Operand::Literal(value.into()),
        }
    }

    /// Conjunction of `self` and `other`, flattening nested `And`s.
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            filter => Filter::And(vec![filter, other]),
        }
    }

    /// Disjunction of `self` and `other`, flattening nested `Or`s.
    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            filter => Filter::Or(vec![filter, other]),
        }
    }

    /// Evaluate the filter against a document.
    pub fn matches(&self, document: &Value, parameters: &BTreeMap<String, Value>) -> bool {
        match self {
            Filter::Eq { field, operand } => {
                let expected = match operand {
                    Operand::Param(name) => parameters.get(name),
                    Operand::Literal(value) => Some(value),
                };
                match (field_value(document, field), expected) {
                    (Some(actual), Some(expected)) => actual == expected,
                    _ => false,
                }
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(document, parameters)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(document, parameters)),
        }
    }

    fn collect_params<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Filter::Eq {
                operand: Operand::Param(name),
                ..
            } => names.push(name),
            Filter::Eq { .. } => {}
            Filter::And(filters) | Filter::Or(filters) => {
                for filter in filters {
                    filter.collect_params(names);
                }
            }
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(filters) | Filter::Or(filters) if filters.len() > 1 => {
                write!(f, "(")?;
                fmt::Display::fmt(self, f)?;
                write!(f, ")")
            }
            _ => fmt::Display::fmt(self, f),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Eq { field, operand } => match operand {
                Operand::Param(name) => write!(f, "c.{} = {}", field, name),
                Operand::Literal(Value::String(s)) => write!(f, "c.{} = '{}'", field, s),
                Operand::Literal(value) => write!(f, "c.{} = {}", field, value),
            },
            Filter::And(filters) | Filter::Or(filters) if filters.is_empty() => {
                let constant = matches!(self, Filter::And(_));
                write!(f, "{}", constant)
            }
            Filter::And(filters) | Filter::Or(filters) => {
                let separator = if matches!(self, Filter::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                for (index, filter) in filters.iter().enumerate() {
                    if index > 0 {
                        write!(f, "{}", separator)?;
                    }
                    filter.fmt_nested(f)?;
                }
                Ok(())
            }
        }
    }
}

/// A filter plus its named parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    filter: Filter,
    parameters: BTreeMap<String, Value>,
}

impl QuerySpec {
    /// Create a query with no parameters.
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            parameters: BTreeMap::new(),
        }
    }

    /// Declare a named parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Declare a named parameter only when a value is present.
    pub fn with_optional_parameter(self, name: impl Into<String>, value: Option<&Value>) -> Self {
        match value {
            Some(value) => self.with_parameter(name, value.clone()),
            None => self,
        }
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// Whether a document satisfies this query.
    pub fn matches(&self, document: &Value) -> bool {
        self.filter.matches(document, &self.parameters)
    }

    /// Check parameter naming. Referenced-but-undeclared parameters are allowed.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut referenced = Vec::new();
        self.filter.collect_params(&mut referenced);

        let invalid = referenced
            .into_iter()
            .chain(self.parameters.keys().map(String::as_str))
            .find(|name| !is_parameter_name(name));

        match invalid {
            Some(name) => Err(StoreError::InvalidQuery {
                message: "parameter names must start with '@'".to_string(),
                parameter: Some(name.to_string()),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM c WHERE {}", self.filter)
    }
}

fn is_parameter_name(name: &str) -> bool {
    name.len() > 1 && name.starts_with('@')
}

/// Resolve a dot-separated field path, descending into arrays by index.
pub(crate) fn field_value<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(index) if current.is_array() => current.get(index)?,
            _ => current.get(part)?,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conflict_spec(email: Option<Value>, username: Option<Value>) -> QuerySpec {
        QuerySpec::new(
            Filter::eq_literal("type", "user").and(
                Filter::eq_param("email", "@email").or(Filter::eq_param("username", "@username")),
            ),
        )
        .with_optional_parameter("@email", email.as_ref())
        .with_optional_parameter("@username", username.as_ref())
    }

    #[test]
    fn test_display_renders_nested_groups() {
        let spec = conflict_spec(None, None);
        assert_eq!(
            spec.to_string(),
            "SELECT * FROM c WHERE c.type = 'user' AND (c.email = @email OR c.username = @username)"
        );
    }

    #[test]
    fn test_missing_parameter_never_matches() {
        let document = json!({"id": "u2", "type": "user", "username": "bob"});

        let without_username = conflict_spec(Some(json!("a@x.com")), None);
        assert!(!without_username.matches(&document));

        let with_username = conflict_spec(Some(json!("a@x.com")), Some(json!("bob")));
        assert!(with_username.matches(&document));
    }

    #[test]
    fn test_missing_field_never_matches_null_parameter() {
        let document = json!({"id": "u2", "type": "user"});
        let spec = conflict_spec(Some(Value::Null), None);
        assert!(!spec.matches(&document));
    }

    #[test]
    fn test_literal_requires_exact_type() {
        let document = json!({"id": "u1", "type": "user"});
        assert!(!QuerySpec::new(Filter::eq_literal("type", "group")).matches(&document));
        assert!(!QuerySpec::new(Filter::eq_literal("id", 1)).matches(&document));
        assert!(QuerySpec::new(Filter::eq_literal("id", "u1")).matches(&document));
    }

    #[test]
    fn test_empty_groups() {
        let document = json!({"id": "u1"});
        assert!(QuerySpec::new(Filter::And(vec![])).matches(&document));
        assert!(!QuerySpec::new(Filter::Or(vec![])).matches(&document));
        assert_eq!(Filter::And(vec![]).to_string(), "true");
    }

    #[test]
    fn test_and_flattens() {
        let filter = Filter::eq_param("a", "@a")
            .and(Filter::eq_param("b", "@b"))
            .and(Filter::eq_param("c", "@c"));
        match filter {
            Filter::And(filters) => assert_eq!(filters.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_parameter_names() {
        let spec = QuerySpec::new(Filter::eq_param("email", "email"));
        assert!(matches!(
            spec.validate(),
            Err(StoreError::InvalidQuery { parameter: Some(name), .. }) if name == "email"
        ));

        let spec = QuerySpec::new(Filter::eq_param("email", "@email"))
            .with_parameter("username", json!("bob"));
        assert!(spec.validate().is_err());

        assert!(conflict_spec(None, None).validate().is_ok());
    }

    #[test]
    fn test_field_value_paths() {
        let document = json!({
            "profile": {"city": "Anytown"},
            "followers": ["u2", "u3"]
        });
        assert_eq!(field_value(&document, "profile.city"), Some(&json!("Anytown")));
        assert_eq!(field_value(&document, "followers.1"), Some(&json!("u3")));
        assert_eq!(field_value(&document, "followers.9"), None);
        assert_eq!(field_value(&document, "missing"), None);
    }
}
