//! Integration tests for palisade-config

use palisade_config::*;
use palisade_validation::{record, ValidatorRegistry, SCENE_ADD, SCENE_EDIT};
use std::env;
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

// Serializes tests that read or write PALISADE_DNS_TIMEOUT_MS.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const ADD_TOML: &str = r#"
[settings]
dns_timeout_ms = 1500

[scenarios.add.name]
require = "name is required"
"lengthRange:,9" = "name is at most 9 characters"

[scenarios.add.age]
number = "age must be a number"
">:15" = "age must be over 15"
"notIn:2,3,4" = "age cannot be 2, 3 or 4"
"#;

const EDIT_JSON: &str = r#"{
    "scenarios": {
        "edit": {
            "id": {"require": "id is required", "int": "id must be an integer"}
        }
    }
}"#;

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).unwrap();
}

#[test]
fn test_load_toml_file_and_check() {
    let _guard = ENV_LOCK.lock().unwrap();
    let dir = TempDir::new().unwrap();
    write(&dir, "rules.toml", ADD_TOML);

    let config = load(dir.path().join("rules.toml")).unwrap();
    assert_eq!(config.settings.dns_timeout_ms, 1500);

    let mut validator = config.build(ValidatorRegistry::new()).unwrap();
    let passed = validator
        .check(SCENE_ADD, &record! { "name" => "alice", "age" => "3" })
        .unwrap();

    assert!(!passed);
    assert_eq!(validator.errors().fields().collect::<Vec<_>>(), ["age"]);
    assert_eq!(
        validator.field_errors("age").unwrap(),
        ["age must be over 15", "age cannot be 2, 3 or 4"]
    );
}

#[test]
fn test_load_dir_merges_files() {
    let _guard = ENV_LOCK.lock().unwrap();
    let dir = TempDir::new().unwrap();
    write(&dir, "10-add.toml", ADD_TOML);
    write(&dir, "20-edit.json", EDIT_JSON);
    write(&dir, "README.md", "not rules");

    let config = load_dir(dir.path()).unwrap();
    assert_eq!(config.scenarios.keys(), [SCENE_ADD, SCENE_EDIT]);
    // the JSON file has no settings table, so the TOML one stands
    assert_eq!(config.settings.dns_timeout_ms, 1500);

    let mut validator = config.build(ValidatorRegistry::new()).unwrap();
    assert!(validator.check(SCENE_EDIT, &record! { "id" => 7 }).unwrap());
}

#[test]
fn test_later_file_replaces_scenario() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.json", r#"{"scenarios": {"add": {"x": {"require": "x"}}}}"#);
    write(&dir, "b.json", r#"{"scenarios": {"add": {"y": {"require": "y"}}}}"#);

    let config = RuleLoader::load_dir(dir.path()).unwrap();
    let fields: Vec<_> = config.scenarios.get(SCENE_ADD).unwrap().fields().collect();
    assert_eq!(fields, ["y"]);
}

#[test]
fn test_env_overrides_file_setting() {
    let _guard = ENV_LOCK.lock().unwrap();
    let dir = TempDir::new().unwrap();
    write(&dir, "rules.toml", ADD_TOML);

    unsafe {
        env::set_var("PALISADE_DNS_TIMEOUT_MS", "250");
    }
    let config = load(dir.path().join("rules.toml"));
    unsafe {
        env::remove_var("PALISADE_DNS_TIMEOUT_MS");
    }

    assert_eq!(config.unwrap().settings.dns_timeout_ms, 250);
}

#[test]
fn test_out_of_range_setting_fails_load() {
    let _guard = ENV_LOCK.lock().unwrap();
    let dir = TempDir::new().unwrap();
    write(&dir, "rules.json", r#"{"settings": {"dns_timeout_ms": 0}}"#);

    let err = load(dir.path().join("rules.json")).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSetting(_)));
}

#[test]
fn test_parse_errors() {
    let dir = TempDir::new().unwrap();
    write(&dir, "broken.toml", "[scenarios.add\nname = ");
    write(&dir, "rules.yaml", "scenarios: {}");

    assert!(matches!(
        RuleLoader::auto("broken.toml")
            .unwrap()
            .load_file(dir.path().join("broken.toml")),
        Err(ConfigError::ParseError(_))
    ));
    assert!(matches!(
        load(dir.path().join("rules.yaml")),
        Err(ConfigError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        load(dir.path().join("missing.json")),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_dotenv_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, ".env", "PALISADE_DOTENV_PROBE=loaded\n");

    load_dotenv(Some(dir.path().join(".env").as_path())).unwrap();
    assert_eq!(
        EnvLoader::default().load_var("dotenv_probe").unwrap(),
        "loaded"
    );

    assert!(load_dotenv(Some(dir.path().join("absent.env").as_path())).is_err());
}

#[test]
fn test_unknown_rule_fails_build() {
    let config = RuleLoader::new(FileFormat::Json)
        .parse(r#"{"scenarios": {"add": {"isbn": {"isbn13": "bad isbn"}}}}"#)
        .unwrap();

    let err = config.build(ValidatorRegistry::new()).unwrap_err();
    assert!(err.to_string().contains("isbn13"));

    let registry = ValidatorRegistry::new();
    registry.register("isbn13", |ctx| Ok(ctx.str_value().is_some_and(|s| s.len() == 13)));
    let mut validator = config.build(registry).unwrap();
    assert!(validator.check(SCENE_ADD, &record! { "isbn" => "9780306406157" }).unwrap());
}
