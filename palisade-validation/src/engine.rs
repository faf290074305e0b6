// Scenario evaluation

use crate::rule::RuleToken;
use crate::scenario::{Scenario, ScenarioStore};
use crate::{
    FieldErrors, IntoRecord, Record, Result, RuleContext, Serialized, ValidationError,
    ValidatorRegistry, Value,
};
use palisade_log::{debug, trace, TARGET_ENGINE};
use serde::Serialize;

/// Value seen by validators for fields missing from the record.
static ABSENT: Value = Value::String(String::new());

/// Evaluates records against stored scenarios.
///
/// # Examples
///
/// ```
/// use palisade_validation::{record, FieldRules, Scenario, Validator, SCENE_ADD};
///
/// let mut validator = Validator::new();
/// validator.load_scenario(
///     SCENE_ADD,
///     Scenario::new().field(
///         "age",
///         FieldRules::new()
///             .rule("require", "age is required")
///             .rule(">:15", "age must be over 15"),
///     ),
/// );
///
/// assert!(!validator.check(SCENE_ADD, &record! { "age" => 12 }).unwrap());
/// assert_eq!(validator.errors().first("age"), Some("age must be over 15"));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    registry: ValidatorRegistry,
    scenarios: ScenarioStore,
    errors: FieldErrors,
}

impl Validator {
    /// An engine backed by the global registry.
    pub fn new() -> Self {
        Self::with_registry(ValidatorRegistry::global().clone())
    }

    pub fn with_registry(registry: ValidatorRegistry) -> Self {
        palisade_log::init();
        Self {
            registry,
            scenarios: ScenarioStore::new(),
            errors: FieldErrors::new(),
        }
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn scenarios(&self) -> &ScenarioStore {
        &self.scenarios
    }

    /// Store a scenario under `key`, replacing any previous one.
    pub fn load_scenario(&mut self, key: impl Into<String>, scenario: Scenario) -> &mut Self {
        let key = key.into();
        debug!(
            target: TARGET_ENGINE,
            "Loaded scenario '{}' ({} fields, {} rules)",
            key,
            scenario.len(),
            scenario.rule_count()
        );
        self.scenarios.load(key, scenario);
        self
    }

    /// Merge a whole store; keys already present are replaced.
    pub fn import_scenarios(&mut self, store: ScenarioStore) -> &mut Self {
        debug!(target: TARGET_ENGINE, "Importing scenarios {:?}", store.keys());
        self.scenarios.merge(store);
        self
    }

    /// Validate `record` against the scenario stored under `key`.
    ///
    /// Returns `Ok(true)` when every rule passed. Failures are available
    /// from [`errors`](Self::errors) until the next call. `Err` means the
    /// scenario or a rule is misconfigured; the collector is left empty.
    pub fn check(&mut self, key: &str, record: &Record) -> Result<bool> {
        self.errors.clear();

        let scenario = self
            .scenarios
            .get(key)
            .ok_or_else(|| ValidationError::UndefinedScenario(key.to_string()))?;

        debug!(
            target: TARGET_ENGINE,
            fields: [("scenario", key), ("fields", scenario.len())],
            "Checking scenario '{}'",
            key
        );

        if let Err(err) = Self::evaluate(&self.registry, scenario, record, &mut self.errors) {
            self.errors.clear();
            return Err(err);
        }

        let passed = self.errors.is_empty();
        debug!(
            target: TARGET_ENGINE,
            fields: [("scenario", key), ("failed_fields", self.errors.len())],
            "Scenario '{}' {}",
            key,
            if passed { "passed" } else { "failed" }
        );
        Ok(passed)
    }

    fn evaluate(
        registry: &ValidatorRegistry,
        scenario: &Scenario,
        record: &Record,
        errors: &mut FieldErrors,
    ) -> Result<()> {
        for (field, rules) in scenario.iter() {
            let value = record.get(field).unwrap_or(&ABSENT);
            let is_required = rules.is_required();

            for entry in rules {
                let resolved = RuleToken::parse(&entry.rule).resolved();
                let validator = registry.resolve(&resolved.name)?;
                let ctx = RuleContext {
                    args: &resolved.args,
                    value,
                    field,
                    record,
                    is_required,
                    options: registry.options(),
                };
                let passed = validator(&ctx)?;

                trace!(
                    target: TARGET_ENGINE,
                    "{}: {} -> {}",
                    field,
                    entry.rule,
                    if passed { "pass" } else { "fail" }
                );

                if !passed {
                    errors.add(field, entry.message.as_str());
                }
            }
        }
        Ok(())
    }

    /// [`check`](Self::check) for anything convertible into a record.
    pub fn check_record(&mut self, key: &str, data: impl IntoRecord) -> Result<bool> {
        let record = data.into_record()?;
        self.check(key, &record)
    }

    /// [`check`](Self::check) for any serializable struct or map.
    pub fn check_serialize<T: Serialize + ?Sized>(&mut self, key: &str, data: &T) -> Result<bool> {
        self.check_record(key, Serialized(data))
    }

    /// Failures of the most recent check.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field)
    }

    /// Record a failure that was detected outside the rule set, such as a
    /// uniqueness lookup done by the caller.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.add(field, message);
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
