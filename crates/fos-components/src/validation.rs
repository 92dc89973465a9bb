//! Element Validation
//!
//! The validation contract run at the end of element construction, plus a
//! small rule set evaluated by the default provider.

use std::fmt;
use std::sync::Arc;

use crate::inflect::humanize;
use crate::element::SlotValue;
use crate::tree::{ElementId, ElementTree};
use crate::value::Value;

/// Predicate used by [`Rule::Custom`]
pub type Check = Arc<dyn Fn(&ElementTree, ElementId) -> bool + Send + Sync>;

/// Declared validation rule
#[derive(Clone)]
pub enum Rule {
    /// Value must not be blank; a slot must hold at least one child
    Presence,
    /// Character count (strings) or item count (lists) bounds
    Length { min: Option<usize>, max: Option<usize> },
    /// Arbitrary check with the message reported on failure
    Custom { message: String, check: Check },
}

impl Rule {
    /// Build a custom rule
    pub fn custom<F>(message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ElementTree, ElementId) -> bool + Send + Sync + 'static,
    {
        Rule::Custom {
            message: message.into(),
            check: Arc::new(check),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Presence => f.write_str("Presence"),
            Rule::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Rule::Custom { message, .. } => f.debug_tuple("Custom").field(message).finish(),
        }
    }
}

/// Aggregated validation errors, keyed by attribute or slot name
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {}", join_messages(.errors))]
pub struct ValidationFailure {
    errors: Vec<(String, String)>,
}

impl ValidationFailure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `name`
    pub fn add(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.errors.push((name.into(), message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Raw `(name, message)` pairs
    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    /// Messages prefixed with the humanized name, e.g. `Foo can't be blank`
    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|(name, message)| full_message(name, message))
            .collect()
    }

    /// `Ok` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn full_message(name: &str, message: &str) -> String {
    format!("{} {}", humanize(name), message)
}

fn join_messages(errors: &[(String, String)]) -> String {
    errors
        .iter()
        .map(|(name, message)| full_message(name, message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validation support
pub trait ValidationProvider {
    /// Check the element; a failure aborts its construction
    fn validate(&self, tree: &ElementTree, id: ElementId) -> Result<(), ValidationFailure>;
}

/// Default provider: evaluates the rules declared on the element's schema
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

/// What a rule is checked against
enum Field<'a> {
    Value(&'a Value),
    Children(usize),
    Missing,
}

impl Field<'_> {
    fn is_blank(&self) -> bool {
        match self {
            Field::Value(v) => v.is_blank(),
            Field::Children(n) => *n == 0,
            Field::Missing => true,
        }
    }

    fn length(&self) -> usize {
        match self {
            Field::Value(Value::Str(s)) => s.chars().count(),
            Field::Value(Value::List(items)) => items.len(),
            Field::Value(Value::Map(map)) => map.len(),
            Field::Value(Value::Null) | Field::Missing => 0,
            Field::Value(other) => other.to_string().chars().count(),
            Field::Children(n) => *n,
        }
    }
}

impl ValidationProvider for RuleValidator {
    fn validate(&self, tree: &ElementTree, id: ElementId) -> Result<(), ValidationFailure> {
        let Some(element) = tree.get(id) else {
            return Ok(());
        };

        let mut failure = ValidationFailure::new();
        for (name, rule) in element.schema().rules() {
            let field = match (element.get(name), element.slot(name)) {
                (Some(value), _) => Field::Value(value),
                (None, Some(SlotValue::Single(child))) => Field::Children(usize::from(child.is_some())),
                (None, Some(SlotValue::Repeated(children))) => Field::Children(children.len()),
                (None, None) => Field::Missing,
            };

            match rule {
                Rule::Presence => {
                    if field.is_blank() {
                        failure.add(name, "can't be blank");
                    }
                }
                Rule::Length { min, max } => {
                    let len = field.length();
                    if let Some(min) = min.filter(|&min| len < min) {
                        failure.add(name, format!("is too short (minimum is {} characters)", min));
                    } else if let Some(max) = max.filter(|&max| len > max) {
                        failure.add(name, format!("is too long (maximum is {} characters)", max));
                    }
                }
                Rule::Custom { message, check } => {
                    if !check(tree, id) {
                        failure.add(name, message.clone());
                    }
                }
            }
        }

        failure.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        let mut failure = ValidationFailure::new();
        failure.add("foo", "can't be blank");
        failure.add("first_name", "can't be blank");
        assert_eq!(
            failure.to_string(),
            "Validation failed: Foo can't be blank, First name can't be blank"
        );
    }

    #[test]
    fn test_empty_failure_is_ok() {
        assert!(ValidationFailure::new().into_result().is_ok());
    }

    #[test]
    fn test_field_blank() {
        assert!(Field::Missing.is_blank());
        assert!(Field::Children(0).is_blank());
        assert!(!Field::Children(2).is_blank());
        assert!(Field::Value(&Value::from("")).is_blank());
        assert_eq!(Field::Value(&Value::from("héllo")).length(), 5);
    }
}
