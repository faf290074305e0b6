//! Loose comparison between dynamically typed values.
//!
//! Rule arguments are always strings (`gt:15`, `in:2,3,4`) while field values
//! may be numbers, strings, booleans or lists. Every validator that compares a
//! value against an argument or another field goes through this module so the
//! coercion policy lives in one place:
//!
//! 1. Two numbers compare numerically.
//! 2. A number and a *numeric string* compare numerically; a number and a
//!    non-numeric string compare as strings (the number is formatted first).
//! 3. Two strings compare numerically when both are numeric, otherwise
//!    byte-wise.
//! 4. A boolean on either side turns both sides into booleans.
//! 5. `null` against a string compares as `""`; against anything else it is
//!    `false` under rule 4.
//! 6. Lists compare by length first, then element-wise; a list is greater than
//!    any scalar.
//!
//! Numeric strings follow the usual form: optional surrounding whitespace,
//! optional sign, digits with an optional fraction, optional exponent
//! (`" 12"`, `"-3.5"`, `"1e3"`). `"0x1A"`, `"12abc"` and `"inf"` are not
//! numeric.

use crate::Value;
use std::cmp::Ordering;

/// A parsed number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

/// Parse a numeric string, or `None` when the string is not numeric.
pub fn parse_numeric(s: &str) -> Option<Number> {
    let t = s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C'));
    let bytes = t.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    let mut integral = true;

    if i < bytes.len() && bytes[i] == b'.' {
        integral = false;
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return None;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        integral = false;
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }

    if integral {
        if let Ok(n) = t.parse::<i64>() {
            return Some(Number::Int(n));
        }
    }
    t.parse::<f64>().ok().map(Number::Float)
}

/// The value as a number: native numbers, or numeric strings.
pub fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Int(i) => Some(Number::Int(*i)),
        Value::Float(f) => Some(Number::Float(*f)),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Order two values under the loose policy. `None` when unordered (NaN).
pub fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    use Value::*;

    match (a, b) {
        (Null, Null) => Some(Ordering::Equal),
        (Bool(_), _) | (_, Bool(_)) => Some(a.to_bool().cmp(&b.to_bool())),
        (Null, String(s)) => Some("".cmp(s.as_str())),
        (String(s), Null) => Some(s.as_str().cmp("")),
        (Null, _) | (_, Null) => Some(a.to_bool().cmp(&b.to_bool())),

        (List(x), List(y)) => match x.len().cmp(&y.len()) {
            Ordering::Equal => {
                for (l, r) in x.iter().zip(y) {
                    match loose_cmp(l, r)? {
                        Ordering::Equal => continue,
                        other => return Some(other),
                    }
                }
                Some(Ordering::Equal)
            }
            other => Some(other),
        },
        (List(_), _) => Some(Ordering::Greater),
        (_, List(_)) => Some(Ordering::Less),

        (String(x), String(y)) => match (parse_numeric(x), parse_numeric(y)) {
            (Some(l), Some(r)) => l.compare(r),
            _ => Some(x.as_bytes().cmp(y.as_bytes())),
        },
        (Int(_) | Float(_), String(s)) => match (as_number(a), parse_numeric(s)) {
            (Some(l), Some(r)) => l.compare(r),
            _ => Some(a.to_string().as_bytes().cmp(s.as_bytes())),
        },
        (String(s), Int(_) | Float(_)) => match (parse_numeric(s), as_number(b)) {
            (Some(l), Some(r)) => l.compare(r),
            _ => Some(s.as_bytes().cmp(b.to_string().as_bytes())),
        },
        (Int(_) | Float(_), Int(_) | Float(_)) => as_number(a)?.compare(as_number(b)?),
    }
}

/// Loose equality: `"32" == 32`, `"1e1" == "10"`, `true == "yes"`.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    loose_cmp(a, b) == Some(Ordering::Equal)
}

/// Compare a value against a rule argument taken verbatim.
pub fn cmp_arg(value: &Value, arg: &str) -> Option<Ordering> {
    loose_cmp(value, &Value::String(arg.to_string()))
}

/// Loose membership test against rule argument items.
pub fn in_list<'a>(value: &Value, items: impl IntoIterator<Item = &'a str>) -> bool {
    items
        .into_iter()
        .any(|item| loose_eq(value, &Value::String(item.to_string())))
}
