//! Dynamically typed field values.
//!
//! Records coming from forms, JSON bodies or query strings carry loosely
//! typed scalars. [`Value`] is the closed set of shapes a validator can
//! observe; each validator decides explicitly which shapes it accepts.

use crate::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Field name to value mapping checked by a scenario.
pub type Record = HashMap<String, Value>;

/// A field value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Loose emptiness: `null`, `false`, `0`, `0.0`, `""`, `"0"` and `[]`.
    ///
    /// Non-required fields holding an empty value skip every rule except
    /// `require`.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty() || s == "0",
            Value::List(items) => items.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the variant, for log output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
        }
    }

    /// Truthiness used when a comparison involves a boolean.
    pub fn to_bool(&self) -> bool {
        !self.is_empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => f.write_str("1"),
            Value::Bool(false) => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::List(_) => f.write_str("Array"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i as i64)
            }
        })*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x as f64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            // Nested objects are only ever inspected as collections.
            serde_json::Value::Object(map) => {
                Value::List(map.into_iter().map(|(_, v)| Value::from(v)).collect())
            }
        }
    }
}

/// Build a [`Record`] from a JSON object.
pub fn record_from_json(json: serde_json::Value) -> Result<Record> {
    match json {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(field, value)| (field, Value::from(value)))
            .collect()),
        other => Err(ValidationError::Record(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

/// Build a [`Record`] from any serializable struct or map.
pub fn record_from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Record> {
    let json = serde_json::to_value(data).map_err(|e| ValidationError::Record(e.to_string()))?;
    record_from_json(json)
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Build a [`Record`] inline.
///
/// ```
/// use palisade_validation::{record, Value};
///
/// let data = record! {
///     "name" => "alice",
///     "age" => 30,
///     "tags" => vec!["a", "b"],
/// };
/// assert_eq!(data["age"], Value::Int(30));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(record.insert(::std::string::String::from($field), $crate::Value::from($value));)+
        record
    }};
}
