//! Integration tests for palisade-validation

use palisade_validation::*;

fn signup_scenario() -> Scenario {
    Scenario::new()
        .field(
            "name",
            FieldRules::new()
                .rule("require", "name is required")
                .rule("lengthRange:,9", "name is at most 9 characters"),
        )
        .field(
            "age",
            FieldRules::new()
                .rule("number", "age must be a number")
                .rule(">:15", "age must be over 15")
                .rule("notIn:2,3,4", "age cannot be 2, 3 or 4"),
        )
        .field(
            "times",
            FieldRules::new()
                .rule("require", "times is required")
                .rule(r"regex:#^\d+$#", "times must be digits"),
        )
        .field("pwd", FieldRules::new().rule("require", "pwd is required"))
        .field(
            "pwd_confirm",
            FieldRules::new()
                .rule("require", "pwd_confirm is required")
                .rule("sameField:pwd", "passwords differ"),
        )
        .field(
            "date",
            FieldRules::new().rule("afterDate:2012-9-16 14:25:55", "date too early"),
        )
        .field("isArray", FieldRules::new().rule("array", "must be a list"))
        .field(
            "phone",
            FieldRules::new()
                .rule("require", "phone is required")
                .rule("mobile", "not a mobile number"),
        )
}

fn signup_data() -> Record {
    record! {
        "name" => "123456789",
        "date" => "2012-9-16 14:25:56",
        "age" => "3",
        "times" => "56",
        "pwd" => "32",
        "pwd_confirm" => "32",
        "phone" => "15255655858",
        "isArray" => Vec::<Value>::new(),
    }
}

fn engine() -> Validator {
    let registry = ValidatorRegistry::new();
    registry.register("number", |ctx| {
        Ok(ctx.str_value().is_some_and(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
        }))
    });

    let mut validator = Validator::with_registry(registry);
    validator.load_scenario(SCENE_ADD, signup_scenario());
    validator
}

#[test]
fn test_signup_only_age_fails() {
    let mut validator = engine();

    assert!(!validator.check(SCENE_ADD, &signup_data()).unwrap());

    let errors = validator.errors();
    assert_eq!(errors.fields().collect::<Vec<_>>(), ["age"]);
    assert_eq!(
        errors.get("age").unwrap(),
        ["age must be over 15", "age cannot be 2, 3 or 4"]
    );
}

#[test]
fn test_result_matches_error_collector() {
    let mut validator = engine();

    let mut data = signup_data();
    data.insert("age".into(), Value::from("20"));
    assert!(validator.check(SCENE_ADD, &data).unwrap());
    assert!(validator.errors().is_empty());

    data.insert("phone".into(), Value::from("12"));
    assert!(!validator.check(SCENE_ADD, &data).unwrap());
    assert!(!validator.errors().is_empty());
    assert!(validator.field_errors("age").is_none());
}

#[test]
fn test_messages_follow_rule_order() {
    let mut validator = Validator::with_registry(ValidatorRegistry::new());
    validator.load_scenario(
        "s",
        Scenario::new().field(
            "code",
            FieldRules::new()
                .rule("lengthRange:5", "too short")
                .rule("alpha", "letters only")
                .rule("startWith:X", "must start with X"),
        ),
    );

    assert!(!validator.check("s", &record! { "code" => "ab1" }).unwrap());
    assert_eq!(
        validator.field_errors("code").unwrap(),
        ["too short", "letters only", "must start with X"]
    );
}

#[test]
fn test_optional_empty_field_skips_rules() {
    let mut validator = Validator::with_registry(ValidatorRegistry::new());
    validator.load_scenario(
        "s",
        Scenario::new().field(
            "email",
            FieldRules::new()
                .rule("email", "bad email")
                .rule("lengthRange:100", "too short")
                .rule("in:a,b", "not listed"),
        ),
    );

    for empty in [Value::from(""), Value::from("0"), Value::Null, Value::Int(0), Value::List(vec![])] {
        assert!(validator.check("s", &record! { "email" => empty }).unwrap());
    }
    assert!(validator.check("s", &Record::new()).unwrap());
    assert!(!validator.check("s", &record! { "email" => "x" }).unwrap());
    assert_eq!(validator.errors().message_count(), 3);
}

#[test]
fn test_require_ignores_other_rules() {
    let mut validator = Validator::with_registry(ValidatorRegistry::new());
    validator.load_scenario(
        "s",
        Scenario::new().field(
            "name",
            FieldRules::new()
                .rule("require", "required")
                .rule("alpha", "letters only"),
        ),
    );

    assert!(!validator.check("s", &record! { "name" => "" }).unwrap());
    assert_eq!(validator.field_errors("name").unwrap(), ["required", "letters only"]);

    assert!(!validator.check("s", &record! { "name" => "123" }).unwrap());
    assert_eq!(validator.field_errors("name").unwrap(), ["letters only"]);
}

#[test]
fn test_aliases_match_canonical_rules() {
    let registry = ValidatorRegistry::new();
    let pairs = [(">", "gt"), (">=", "egt"), ("<", "lt"), ("<=", "elt"), ("=", "eq"), ("same", "eq")];

    for value in [Value::Int(10), Value::from("15"), Value::Float(20.5), Value::from("abc")] {
        for (alias, canonical) in pairs {
            assert_eq!(
                registry.verify(value.clone(), &format!("{}:15", alias)).unwrap(),
                registry.verify(value.clone(), &format!("{}:15", canonical)).unwrap(),
                "{} vs {} on {:?}",
                alias,
                canonical,
                value
            );
        }
    }
}

#[test]
fn test_named_patterns_match_regex_rule() {
    let registry = ValidatorRegistry::new();
    let cases = [
        ("alpha", "abcXYZ", true),
        ("alpha", "abc1", false),
        ("alphaNum", "abc123", true),
        ("alphaDash", "a_b-c", true),
        ("alphaDash", "a b", false),
        ("chinese", "中文", true),
        ("chinese", "中a", false),
        ("chineseAlpha", "中a", true),
        ("chineseAlphaNum", "中a1", true),
        ("chineseDash", "中_a-1", true),
        ("mobile", "15255655858", true),
        ("mobile", "12255655858", false),
        ("idCard", "11010519491231002X", true),
        ("idCard", "123", false),
        ("zip", "100000", true),
        ("zip", "1000", false),
    ];

    for (name, input, expected) in cases {
        let pattern = rule::named_pattern(name).unwrap();
        assert_eq!(registry.verify(input, name).unwrap(), expected, "{} on {}", name, input);
        assert_eq!(
            registry.verify(input, &format!("regex:{}", pattern)).unwrap(),
            expected
        );
    }
}

#[test]
fn test_between_open_bounds() {
    let registry = ValidatorRegistry::new();
    assert!(registry.verify(i32::MIN, "between:,5").unwrap());
    assert!(registry.verify(5, "between:,5").unwrap());
    assert!(!registry.verify(6, "between:,5").unwrap());
    assert!(registry.verify(i32::MAX, "between:5,").unwrap());
    assert!(registry.verify(-3, "between:0,5").unwrap());
    assert!(!registry.verify(-3, "notBetween:0,5").unwrap());
}

#[test]
fn test_length_range() {
    let registry = ValidatorRegistry::new();
    assert!(registry.verify("123456789", "lengthRange:,9").unwrap());
    assert!(!registry.verify("1234567890", "lengthRange:,9").unwrap());
    assert!(registry.verify("1234567", "lengthRange:7").unwrap());
    assert!(!registry.verify("123456", "lengthRange:7").unwrap());
    assert!(registry.verify("12345678", "lengthRange:7,9").unwrap());
}

#[test]
fn test_same_field_loose_equality() {
    let mut validator = Validator::with_registry(ValidatorRegistry::new());
    validator.load_scenario(
        "s",
        Scenario::new().field(
            "pwd_confirm",
            FieldRules::new().rule("sameField:pwd", "passwords differ"),
        ),
    );

    assert!(validator
        .check("s", &record! { "pwd" => "32", "pwd_confirm" => 32 })
        .unwrap());
    assert!(!validator
        .check("s", &record! { "pwd" => "32", "pwd_confirm" => "33" })
        .unwrap());
}

#[test]
fn test_verify_batch_stops_at_first_failure() {
    let registry = ValidatorRegistry::new();
    assert!(!registry.verify_batch("4", [">:2", "notIn:2,3,4"]).unwrap());
    assert!(registry.verify_batch("5", [">:2", "notIn:2,3,4"]).unwrap());
    assert!(registry
        .verify("2012-9-16 14:25:59", "afterDate:2012-9-16 14:25:56")
        .unwrap());
}

#[test]
fn test_undefined_scenario_is_an_error() {
    let mut validator = engine();
    let err = validator.check(SCENE_EDIT, &signup_data()).unwrap_err();
    assert!(matches!(err, ValidationError::UndefinedScenario(_)));
    assert_eq!(err.to_string(), "undefined scenario: edit");
}

#[test]
fn test_extension_overrides_builtin() {
    let registry = ValidatorRegistry::new();
    registry.register("email", |ctx| Ok(ctx.str_value() == Some("admin")));

    let mut validator = Validator::with_registry(registry.clone());
    validator.load_scenario(
        "s",
        Scenario::new().field("email", FieldRules::new().rule("email", "bad email")),
    );

    assert!(validator.check("s", &record! { "email" => "admin" }).unwrap());
    assert!(!validator.check("s", &record! { "email" => "a@b.com" }).unwrap());

    // other registries keep the built-in
    assert!(ValidatorRegistry::new().verify("a@b.com", "email").unwrap());
}

#[test]
fn test_invalid_pattern_aborts_check() {
    let mut validator = Validator::with_registry(ValidatorRegistry::new());
    validator.load_scenario(
        "s",
        Scenario::new().field("code", FieldRules::new().rule("regex:/[a-/", "bad")),
    );

    let err = validator.check("s", &record! { "code" => "x" }).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidPattern { .. }));
}

#[test]
fn test_scenarios_from_json_keep_order() {
    let store: ScenarioStore = serde_json::from_str(
        r#"{
            "edit": {
                "id": {"require": "id required", "int": "id must be an integer"},
                "name": {"lengthRange:2,": "name too short"}
            }
        }"#,
    )
    .unwrap();

    let mut validator = Validator::with_registry(ValidatorRegistry::new());
    validator.import_scenarios(store);

    let data = record_from_json(serde_json::json!({"id": "7", "name": "x"})).unwrap();
    assert!(!validator.check(SCENE_EDIT, &data).unwrap());
    assert_eq!(validator.errors().fields().collect::<Vec<_>>(), ["id", "name"]);
    assert_eq!(
        validator.errors().to_json(),
        serde_json::json!({
            "errors": {
                "id": ["id must be an integer"],
                "name": ["name too short"],
            }
        })
    );
}

#[test]
fn test_check_record_from_pairs() {
    let mut validator = Validator::with_registry(ValidatorRegistry::new());
    validator.load_scenario(
        "s",
        Scenario::new()
            .field("ip", FieldRules::new().rule("ipv4", "bad ip"))
            .field("file", FieldRules::new().rule("fileExt:png,jpg", "bad file")),
    );

    assert!(validator
        .check_record("s", vec![("ip", "10.0.0.1"), ("file", "cat.PNG")])
        .unwrap());
    assert!(!validator
        .check_record("s", vec![("ip", "10.0.0.300"), ("file", "cat.gif")])
        .unwrap());
    assert_eq!(validator.errors().len(), 2);
}
