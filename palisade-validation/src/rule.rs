// Rule grammar and name resolution

use crate::Value;
use std::borrow::Cow;
use std::fmt;

/// Canonical name of the generic pattern validator.
pub const REGEX: &str = "regex";

/// The rule that marks a field as required.
pub const REQUIRE: &str = "require";

/// Operator aliases, applied before registry lookup.
pub const ALIASES: &[(&str, &str)] = &[
    (">", "gt"),
    (">=", "egt"),
    ("<", "lt"),
    ("<=", "elt"),
    ("=", "eq"),
    ("same", "eq"),
];

/// Named pattern shortcuts. A rule named after one of these runs the
/// `regex` validator with the listed pattern as its argument.
pub const NAMED_PATTERNS: &[(&str, &str)] = &[
    ("alpha", r"/^[A-Za-z]+$/"),
    ("alphaNum", r"/^[A-Za-z0-9]+$/"),
    ("alphaDash", r"/^[A-Za-z0-9\-\_]+$/"),
    ("chinese", r"/^[\x{4e00}-\x{9fa5}]+$/u"),
    ("chineseAlpha", r"/^[\x{4e00}-\x{9fa5}a-zA-Z]+$/u"),
    ("chineseAlphaNum", r"/^[\x{4e00}-\x{9fa5}a-zA-Z0-9]+$/u"),
    ("chineseDash", r"/^[\x{4e00}-\x{9fa5}a-zA-Z0-9\_\-]+$/u"),
    ("mobile", r"/^1[3-9][0-9]\d{8}$/"),
    (
        "idCard",
        r"/(^[1-9]\d{5}(18|19|([23]\d))\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{3}[0-9Xx]$)|(^[1-9]\d{5}\d{2}((0[1-9])|(10|11|12))(([0-2][1-9])|10|20|30|31)\d{2}$)/",
    ),
    ("zip", r"/\d{6}/"),
];

/// Canonical validator name for an operator alias.
pub fn alias(method: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(from, _)| *from == method)
        .map(|(_, to)| *to)
}

/// Pattern registered under a shortcut name.
pub fn named_pattern(method: &str) -> Option<&'static str> {
    NAMED_PATTERNS
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, pattern)| *pattern)
}

/// Resolve aliases first, then named patterns.
pub fn resolve<'a>(method: &'a str, args: &'a str) -> (Cow<'a, str>, Cow<'a, str>) {
    let method = alias(method).unwrap_or(method);

    match named_pattern(method) {
        Some(pattern) => (Cow::Borrowed(REGEX), Cow::Borrowed(pattern)),
        None => (Cow::Borrowed(method), Cow::Borrowed(args)),
    }
}

/// A parsed rule token: `method`, `method:arg` or `method:a,b`.
///
/// Only the first `:` separates the method; everything after it is the
/// argument string, colons included, so `afterDate:2012-9-16 14:25:55`
/// keeps its time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleToken<'a> {
    pub method: &'a str,
    pub args: &'a str,
}

impl<'a> RuleToken<'a> {
    pub fn parse(token: &'a str) -> Self {
        match token.split_once(':') {
            Some((method, args)) => Self { method, args },
            None => Self {
                method: token,
                args: "",
            },
        }
    }

    /// Canonical validator name and effective argument string.
    pub fn resolved(&self) -> ResolvedRule<'a> {
        let (name, args) = resolve(self.method, self.args);
        ResolvedRule { name, args }
    }
}

impl fmt::Display for RuleToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(self.method)
        } else {
            write!(f, "{}:{}", self.method, self.args)
        }
    }
}

/// Rule after alias and named-pattern substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRule<'a> {
    pub name: Cow<'a, str>,
    pub args: Cow<'a, str>,
}

/// Split a comma list argument, `None` for an empty argument.
pub(crate) fn split_list(args: &str) -> Option<std::str::Split<'_, char>> {
    if args.is_empty() { None } else { Some(args.split(',')) }
}

/// Split `lo,hi`; missing or loosely empty sides (`""`, `"0"`) are `None`.
pub(crate) fn split_bounds(args: &str) -> (Option<&str>, Option<&str>) {
    fn bound(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !Value::from(*s).is_empty())
    }

    let mut parts = args.splitn(2, ',');
    let lo = bound(parts.next());
    let hi = bound(parts.next().map(|rest| rest.split(',').next().unwrap_or(rest)));
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_method() {
        let rule = RuleToken::parse("require");
        assert_eq!(rule.method, "require");
        assert_eq!(rule.args, "");
    }

    #[test]
    fn test_parse_single_colon() {
        let rule = RuleToken::parse("in:2,3,4");
        assert_eq!(rule.method, "in");
        assert_eq!(rule.args, "2,3,4");

        let rule = RuleToken::parse("gt:");
        assert_eq!(rule.method, "gt");
        assert_eq!(rule.args, "");
    }

    #[test]
    fn test_parse_keeps_later_colons() {
        let rule = RuleToken::parse("afterDate:2012-9-16 14:25:55");
        assert_eq!(rule.method, "afterDate");
        assert_eq!(rule.args, "2012-9-16 14:25:55");

        let rule = RuleToken::parse("regex:#^a:b$#");
        assert_eq!(rule.args, "#^a:b$#");
    }

    #[test]
    fn test_aliases() {
        assert_eq!(RuleToken::parse(">:15").resolved().name, "gt");
        assert_eq!(RuleToken::parse(">=:15").resolved().name, "egt");
        assert_eq!(RuleToken::parse("<").resolved().name, "lt");
        assert_eq!(RuleToken::parse("<=").resolved().name, "elt");
        assert_eq!(RuleToken::parse("=:1").resolved().name, "eq");
        assert_eq!(RuleToken::parse("same:1").resolved().name, "eq");
        // not an alias
        assert_eq!(RuleToken::parse("sameField:pwd").resolved().name, "sameField");
    }

    #[test]
    fn test_named_pattern_rewrites_args() {
        let resolved = RuleToken::parse("mobile:ignored").resolved();
        assert_eq!(resolved.name, REGEX);
        assert_eq!(resolved.args, r"/^1[3-9][0-9]\d{8}$/");
    }

    #[test]
    fn test_plain_rule_passes_through() {
        let resolved = RuleToken::parse("lengthRange:,9").resolved();
        assert_eq!(resolved.name, "lengthRange");
        assert_eq!(resolved.args, ",9");
    }

    #[test]
    fn test_display_round_trips() {
        assert_eq!(RuleToken::parse("between:1,5").to_string(), "between:1,5");
        assert_eq!(RuleToken::parse("number").to_string(), "number");
    }

    #[test]
    fn test_split_bounds() {
        assert_eq!(split_bounds("2,4"), (Some("2"), Some("4")));
        assert_eq!(split_bounds(",4"), (None, Some("4")));
        assert_eq!(split_bounds("2,"), (Some("2"), None));
        assert_eq!(split_bounds("7"), (Some("7"), None));
        assert_eq!(split_bounds(""), (None, None));
        assert_eq!(split_bounds("1,2,3"), (Some("1"), Some("2")));
        assert_eq!(split_bounds("0,5"), (None, Some("5")));
        assert_eq!(split_bounds("-5,0"), (Some("-5"), None));
        assert_eq!(split_bounds(" 0 , "), (None, None));
    }

    #[test]
    fn test_split_list() {
        assert!(split_list("").is_none());
        assert_eq!(split_list("a,,b").unwrap().collect::<Vec<_>>(), ["a", "", "b"]);
    }
}
