//! Fuzz target for rule token parsing and name resolution.

#![no_main]

use libfuzzer_sys::fuzz_target;
use palisade_validation::rule::RuleToken;

fuzz_target!(|token: &str| {
    let parsed = RuleToken::parse(token);

    // method never contains the separator; args keep every later colon
    assert!(!parsed.method.contains(':'));
    if token.contains(':') {
        assert_eq!(format!("{}:{}", parsed.method, parsed.args), token);
    } else {
        assert_eq!(parsed.method, token);
        assert!(parsed.args.is_empty());
    }

    let _ = parsed.resolved();
});
