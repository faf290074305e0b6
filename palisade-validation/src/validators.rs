// Built-in validators
//
// Every function here has the `ValidatorFn` shape. All of them except
// `require` begin with the required-skip check.

use crate::compare::{as_number, cmp_arg, in_list, loose_cmp, loose_eq, parse_numeric};
use crate::rule::{split_bounds, split_list};
use crate::{Result, RuleContext, ValidationError, ValidatorFn, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr, ToSocketAddrs};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

static PATTERN_CACHE: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(Default::default);

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$").unwrap()
});

const ACCEPTED: [&str; 3] = ["1", "on", "yes"];
const DENIED: [&str; 3] = ["0", "off", "no"];

const DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

type BuiltinFn = fn(&RuleContext<'_>) -> Result<bool>;

const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("require", require),
    ("in", in_),
    ("notIn", not_in),
    ("between", between),
    ("notBetween", not_between),
    ("lengthRange", length_range),
    ("startWith", start_with),
    ("endWith", end_with),
    ("contain", contain),
    ("sameField", same_field),
    ("max", max),
    ("min", min),
    ("number", number),
    ("string", string),
    ("float", float),
    ("int", int),
    ("array", array),
    ("bool", boolean),
    ("accepted", accepted),
    ("denied", denied),
    ("isDate", is_date),
    ("afterDate", after_date),
    ("beforeDate", before_date),
    ("gt", gt),
    ("egt", egt),
    ("lt", lt),
    ("elt", elt),
    ("eq", eq),
    ("availableUrl", available_url),
    ("email", email),
    ("ipv4", ipv4),
    ("ipv6", ipv6),
    ("regex", regex),
    ("fileExt", file_ext),
];

static BUILTIN_TABLE: Lazy<HashMap<&'static str, ValidatorFn>> = Lazy::new(|| {
    BUILTINS
        .iter()
        .map(|&(name, f)| (name, Arc::new(f) as ValidatorFn))
        .collect()
});

/// Built-in validator by canonical name.
pub fn builtin(name: &str) -> Option<ValidatorFn> {
    BUILTIN_TABLE.get(name).cloned()
}

/// Canonical names of all built-in validators.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

// ============================================================================
// Helpers
// ============================================================================

fn is_ge(ord: Option<Ordering>) -> bool {
    matches!(ord, Some(Ordering::Greater | Ordering::Equal))
}

fn is_le(ord: Option<Ordering>) -> bool {
    matches!(ord, Some(Ordering::Less | Ordering::Equal))
}

fn bound(raw: Option<&str>, default: i64) -> Value {
    raw.map_or(Value::Int(default), Value::from)
}

/// Inclusive `lo <= value <= hi` with open sides defaulting to the i64 range.
fn within(value: &Value, args: &str) -> bool {
    let (lo, hi) = split_bounds(args);
    is_ge(loose_cmp(value, &bound(lo, i64::MIN))) && is_le(loose_cmp(value, &bound(hi, i64::MAX)))
}

fn first_arg(args: &str) -> &str {
    args.split(',').next().unwrap_or(args)
}

/// Parse a date or date-time in one of the accepted layouts.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.naive_utc());
    }

    DATE_TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(input, layout).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn date_arg(rule: &str, args: &str) -> Result<NaiveDateTime> {
    parse_datetime(args)
        .ok_or_else(|| ValidationError::invalid_argument(rule, args, "not a recognizable date"))
}

const FLAGS: &str = "imsxuUD";

fn closing_delimiter(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    }
}

/// Translate a delimited pattern (`/^\d+$/i`, `#^a#`) into regex syntax.
///
/// A pattern that does not start with a delimiter, or whose tail after the
/// closing delimiter is not made of known flags, is used as-is.
pub fn translate_pattern(pattern: &str) -> String {
    let Some(open) = pattern.chars().next() else {
        return String::new();
    };
    if open.is_alphanumeric() || open == '\\' || open.is_whitespace() {
        return pattern.to_string();
    }

    let close = closing_delimiter(open);
    let body_start = open.len_utf8();
    let Some(end) = pattern[body_start..].rfind(close).map(|i| i + body_start) else {
        return pattern.to_string();
    };
    let flags = &pattern[end + close.len_utf8()..];
    if !flags.chars().all(|c| FLAGS.contains(c)) {
        return pattern.to_string();
    }

    let inline: String = flags.chars().filter(|c| "imsxU".contains(*c)).collect();
    let body = &pattern[body_start..end];
    if inline.is_empty() {
        body.to_string()
    } else {
        format!("(?{}){}", inline, body)
    }
}

/// Compile a rule pattern; failures are configuration errors.
///
/// Compiled patterns are cached by their rule argument.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    if let Some(regex) = PATTERN_CACHE.read().get(pattern) {
        return Ok(regex.clone());
    }

    let regex = Regex::new(&translate_pattern(pattern)).map_err(|e| {
        ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        }
    })?;
    PATTERN_CACHE
        .write()
        .insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Host part of a bare host name or URL.
fn host_of(input: &str) -> &str {
    let rest = input
        .split_once("://")
        .map_or(input, |(_, after)| after);
    let authority = rest
        .split(|c: char| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or(rest);
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    if let Some(bracketed) = host_port.strip_prefix('[') {
        return bracketed.split(']').next().unwrap_or(bracketed);
    }
    match host_port.split_once(':') {
        Some((host, port)) if !port.contains(':') => host,
        _ => host_port,
    }
}

/// Resolve a host on a helper thread, giving up after `timeout`.
fn host_resolves(input: &str, timeout: Duration) -> bool {
    let host = host_of(input.trim()).to_string();
    if host.is_empty() {
        return false;
    }

    let (tx, rx) = mpsc::channel();
    let lookup = host.clone();
    let spawned = thread::Builder::new()
        .name("palisade-dns".into())
        .spawn(move || {
            let found = (lookup.as_str(), 0u16)
                .to_socket_addrs()
                .map(|mut addrs| addrs.next().is_some())
                .unwrap_or(false);
            let _ = tx.send(found);
        });
    if spawned.is_err() {
        return false;
    }

    match rx.recv_timeout(timeout) {
        Ok(found) => found,
        Err(_) => {
            palisade_log::debug!(
                target: palisade_log::TARGET_ENGINE,
                "DNS lookup for '{}' exceeded {:?}",
                host,
                timeout
            );
            false
        }
    }
}

/// Text after the last `.` of the last path segment, or `""`.
fn extension_of(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.rsplit_once('.').map_or("", |(_, ext)| ext)
}

// ============================================================================
// Presence
// ============================================================================

/// `require`: the record's value for the field must be non-empty.
///
/// A field with no record entry is empty, so ad-hoc verification against
/// the empty record always fails.
pub fn require(ctx: &RuleContext<'_>) -> Result<bool> {
    if !ctx.is_required && ctx.value.is_empty() {
        return Ok(true);
    }
    Ok(ctx.record.get(ctx.field).is_some_and(|stored| !stored.is_empty()))
}

// ============================================================================
// Membership and ranges
// ============================================================================

pub fn in_(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(split_list(ctx.args).is_some_and(|items| in_list(ctx.value, items)))
}

pub fn not_in(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(split_list(ctx.args).is_some_and(|items| !in_list(ctx.value, items)))
}

pub fn between(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(within(ctx.value, ctx.args))
}

pub fn not_between(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    let (lo, hi) = split_bounds(ctx.args);
    let below = loose_cmp(ctx.value, &bound(lo, i64::MIN)) == Some(Ordering::Less);
    let above = loose_cmp(ctx.value, &bound(hi, i64::MAX)) == Some(Ordering::Greater);
    Ok(below || above)
}

/// `lengthRange:lo,hi` on the character count of a string.
pub fn length_range(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    let Some(s) = ctx.str_value() else {
        return Ok(false);
    };
    let length = Value::Int(s.chars().count() as i64);
    Ok(within(&length, ctx.args))
}

pub fn max(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(is_le(cmp_arg(ctx.value, first_arg(ctx.args))))
}

pub fn min(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(is_ge(cmp_arg(ctx.value, first_arg(ctx.args))))
}

// ============================================================================
// Strings
// ============================================================================

pub fn start_with(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(ctx.str_value().is_some_and(|s| s.starts_with(ctx.args)))
}

pub fn end_with(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(ctx.str_value().is_some_and(|s| s.ends_with(ctx.args)))
}

pub fn contain(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(ctx.str_value().is_some_and(|s| s.contains(ctx.args)))
}

/// `sameField:other` passes when both fields are loosely equal.
pub fn same_field(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(loose_eq(ctx.value, ctx.other(ctx.args)))
}

pub fn regex(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    let Some(s) = ctx.str_value() else {
        return Ok(false);
    };
    Ok(compile_pattern(ctx.args)?.is_match(s))
}

pub fn email(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(ctx.str_value().is_some_and(|s| EMAIL_REGEX.is_match(s)))
}

pub fn ipv4(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(ctx.str_value().is_some_and(|s| s.parse::<Ipv4Addr>().is_ok()))
}

pub fn ipv6(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(ctx.str_value().is_some_and(|s| s.parse::<Ipv6Addr>().is_ok()))
}

pub fn available_url(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(ctx
        .str_value()
        .is_some_and(|s| host_resolves(s, ctx.options.dns_timeout)))
}

/// `fileExt:jpg,png`, case-insensitive.
pub fn file_ext(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    let Some(s) = ctx.str_value() else {
        return Ok(false);
    };
    let ext = extension_of(s).to_lowercase();
    let allowed = ctx.args.to_lowercase();
    Ok(allowed.split(',').any(|candidate| candidate.trim() == ext))
}

// ============================================================================
// Types
// ============================================================================

pub fn number(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(match ctx.value {
        Value::String(s) => parse_numeric(s).is_some(),
        other => as_number(other).is_some(),
    })
}

pub fn string(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(matches!(ctx.value, Value::String(_)))
}

pub fn float(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(matches!(ctx.value, Value::Float(_)))
}

pub fn int(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(matches!(ctx.value, Value::Int(_)))
}

pub fn array(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(matches!(ctx.value, Value::List(_)))
}

/// Strict: `true`, `false`, `0`, `1`, `"0"`, `"1"`.
pub fn boolean(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(match ctx.value {
        Value::Bool(_) => true,
        Value::Int(i) => *i == 0 || *i == 1,
        Value::String(s) => s == "0" || s == "1",
        _ => false,
    })
}

pub fn accepted(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(in_list(ctx.value, ACCEPTED))
}

pub fn denied(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(in_list(ctx.value, DENIED))
}

// ============================================================================
// Dates
// ============================================================================

pub fn is_date(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(ctx.str_value().and_then(parse_datetime).is_some())
}

pub fn after_date(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    let Some(s) = ctx.str_value() else {
        return Ok(false);
    };
    let threshold = date_arg("afterDate", ctx.args)?;
    Ok(parse_datetime(s).is_some_and(|at| at >= threshold))
}

pub fn before_date(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    let Some(s) = ctx.str_value() else {
        return Ok(false);
    };
    let threshold = date_arg("beforeDate", ctx.args)?;
    Ok(parse_datetime(s).is_some_and(|at| at <= threshold))
}

// ============================================================================
// Comparisons against a literal
// ============================================================================

pub fn gt(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(cmp_arg(ctx.value, ctx.args) == Some(Ordering::Greater))
}

pub fn egt(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(is_ge(cmp_arg(ctx.value, ctx.args)))
}

pub fn lt(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(cmp_arg(ctx.value, ctx.args) == Some(Ordering::Less))
}

pub fn elt(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(is_le(cmp_arg(ctx.value, ctx.args)))
}

pub fn eq(ctx: &RuleContext<'_>) -> Result<bool> {
    if ctx.skips() {
        return Ok(true);
    }
    Ok(cmp_arg(ctx.value, ctx.args) == Some(Ordering::Equal))
}
