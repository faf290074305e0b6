// Engine errors and the per-field failure collector

use std::fmt;
use thiserror::Error;

/// Configuration and programming errors raised while evaluating rules.
///
/// Rule *failures* are never reported through this type; they are collected
/// in [`FieldErrors`] and surface as `Ok(false)`.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("undefined scenario: {0}")]
    UndefinedScenario(String),

    #[error("unknown validator: {0}")]
    UnknownValidator(String),

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid argument {arg:?} for rule '{rule}': {reason}")]
    InvalidArgument {
        rule: String,
        arg: String,
        reason: String,
    },

    /// A host value could not be turned into a record.
    #[error("cannot build record: {0}")]
    Record(String),
}

impl ValidationError {
    pub(crate) fn invalid_argument(
        rule: &str,
        arg: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            rule: rule.to_string(),
            arg: arg.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Failure messages grouped by field.
///
/// Fields appear in the order of their first failure; messages within a
/// field appear in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields with at least one failure.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of failure messages across all fields.
    pub fn message_count(&self) -> usize {
        self.entries.iter().map(|(_, msgs)| msgs.len()).sum()
    }

    /// Append a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field, vec![message])),
        }
    }

    /// Messages recorded for one field, if it failed at all.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    /// First message of a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `{"errors": {"field": ["message", ...]}}`, fields in failure order.
    pub fn to_json(&self) -> serde_json::Value {
        let errors: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(field, messages)| (field.clone(), serde_json::json!(messages)))
            .collect();
        serde_json::json!({ "errors": errors })
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, messages) in &self.entries {
            for message in messages {
                writeln!(f, "{}: {}", field, message)?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a (String, Vec<String>);
    type IntoIter = std::slice::Iter<'a, (String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_rule_order() {
        let mut errors = FieldErrors::new();
        errors.add("age", "must be a number");
        errors.add("name", "is required");
        errors.add("age", "must be greater than 15");

        assert_eq!(
            errors.get("age").unwrap(),
            ["must be a number", "must be greater than 15"]
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["age", "name"]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.message_count(), 3);
        assert_eq!(errors.first("name"), Some("is required"));
    }

    #[test]
    fn test_untouched_field_is_absent() {
        let errors = FieldErrors::new();
        assert!(errors.is_empty());
        assert!(errors.get("age").is_none());
        assert!(!errors.contains("age"));
    }

    #[test]
    fn test_to_json() {
        let mut errors = FieldErrors::new();
        errors.add("phone", "not a mobile number");

        let json = errors.to_json();
        assert_eq!(json["errors"]["phone"][0], "not a mobile number");
    }

    #[test]
    fn test_display() {
        let mut errors = FieldErrors::new();
        errors.add("zip", "bad zip");
        assert_eq!(errors.to_string(), "zip: bad zip\n");
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::UndefinedScenario("delete".into());
        assert_eq!(err.to_string(), "undefined scenario: delete");

        let err = ValidationError::invalid_argument("afterDate", "soon", "not a date");
        assert!(err.to_string().contains("afterDate"));
    }
}
