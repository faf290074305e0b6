// Validator call context and record conversion

use crate::value::{record_from_json, record_from_serialize};
use crate::{Record, Result, Value};
use std::sync::Arc;
use std::time::Duration;

/// A validator function: built-in or user extension.
///
/// Returns `Ok(true)` when the value satisfies the rule, `Ok(false)` when it
/// does not, and `Err` only for configuration problems (bad pattern, bad
/// argument) which abort the whole check.
pub type ValidatorFn = Arc<dyn Fn(&RuleContext<'_>) -> Result<bool> + Send + Sync>;

/// Everything a validator sees for one rule invocation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Argument string after alias and named-pattern resolution
    pub args: &'a str,
    /// The field's value, `""` when the record lacks the field
    pub value: &'a Value,
    pub field: &'a str,
    /// The full record under validation
    pub record: &'a Record,
    /// Whether the field's rule list contains `require`
    pub is_required: bool,
    pub options: &'a ValidationOptions,
}

impl<'a> RuleContext<'a> {
    /// Required-skip policy: a non-required field left empty passes.
    ///
    /// Every built-in except `require` starts with this check; extensions
    /// are expected to do the same.
    pub fn skips(&self) -> bool {
        !self.is_required && self.value.is_empty()
    }

    /// Another field of the record, `Null` when absent.
    pub fn other(&self, field: &str) -> &'a Value {
        static NULL: Value = Value::Null;
        self.record.get(field).unwrap_or(&NULL)
    }

    /// The value when it is a string.
    pub fn str_value(&self) -> Option<&'a str> {
        self.value.as_str()
    }
}

/// Tuning for built-in validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Upper bound on the `availableUrl` DNS lookup
    pub dns_timeout: Duration,
}

impl ValidationOptions {
    pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            dns_timeout: Self::DEFAULT_DNS_TIMEOUT,
        }
    }
}

/// Types that can be checked as a record.
pub trait IntoRecord {
    fn into_record(self) -> Result<Record>;
}

impl IntoRecord for Record {
    fn into_record(self) -> Result<Record> {
        Ok(self)
    }
}

impl IntoRecord for serde_json::Value {
    fn into_record(self) -> Result<Record> {
        record_from_json(self)
    }
}

impl<K: Into<String>, V: Into<Value>> IntoRecord for Vec<(K, V)> {
    fn into_record(self) -> Result<Record> {
        Ok(self
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }
}

/// Wrapper that checks any `Serialize` type by going through JSON.
pub struct Serialized<'a, T: ?Sized>(pub &'a T);

impl<T: serde::Serialize + ?Sized> IntoRecord for Serialized<'_, T> {
    fn into_record(self) -> Result<Record> {
        record_from_serialize(self.0)
    }
}
