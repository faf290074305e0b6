//! Fuzz target for ad-hoc verification with arbitrary values and rules.
//!
//! Validators must never panic: they either answer or report a
//! configuration error.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use palisade_validation::rule::RuleToken;
use palisade_validation::{Value, ValidatorRegistry};

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl From<FuzzValue> for Value {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Null => Value::Null,
            FuzzValue::Bool(b) => Value::Bool(b),
            FuzzValue::Int(i) => Value::Int(i),
            FuzzValue::Float(f) => Value::Float(f),
            FuzzValue::Text(s) => Value::String(s),
            FuzzValue::List(items) => Value::from(items),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    value: FuzzValue,
    rules: Vec<String>,
}

fuzz_target!(|input: FuzzInput| {
    let registry = ValidatorRegistry::new();
    let value = Value::from(input.value);

    // skip rules that would hit the network
    let rules: Vec<&str> = input
        .rules
        .iter()
        .map(String::as_str)
        .filter(|rule| RuleToken::parse(rule).resolved().name != "availableUrl")
        .collect();

    for rule in &rules {
        let _ = registry.verify(value.clone(), rule);
    }
    let _ = registry.verify_batch(value, rules.iter().copied());
});
