//! Rule files and environment configuration for Palisade.
//!
//! Scenarios and engine settings can live in JSON or TOML files:
//!
//! ```toml
//! [settings]
//! dns_timeout_ms = 1500
//!
//! [scenarios.add.name]
//! require = "name is required"
//! "lengthRange:,9" = "name is at most 9 characters"
//! ```
//!
//! ```
//! use palisade_config::{FileFormat, RuleLoader};
//! use palisade_validation::{record, ValidatorRegistry};
//!
//! let config = RuleLoader::new(FileFormat::Toml)
//!     .parse(
//!         r#"
//!         [scenarios.add.age]
//!         ">:15" = "age must be over 15"
//!         "#,
//!     )
//!     .unwrap();
//!
//! let mut validator = config.build(ValidatorRegistry::new()).unwrap();
//! assert!(!validator.check("add", &record! { "age" => 12 }).unwrap());
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;

pub use env::{load_dotenv, EnvLoader, ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use loader::{FileFormat, RuleLoader};
pub use settings::{Settings, Validate};

use palisade_log::{debug, info, TARGET_CONFIG};
use palisade_validation::rule::{RuleToken, REGEX};
use palisade_validation::validators::compile_pattern;
use palisade_validation::{ScenarioStore, ValidationError, Validator, ValidatorRegistry};
use serde::Serialize;
use std::path::Path;

/// Settings and scenarios loaded from rule files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleConfig {
    pub settings: Settings,
    pub scenarios: ScenarioStore,
}

impl RuleConfig {
    /// Check that every rule names a validator known to `registry` and that
    /// every pattern compiles.
    pub fn check_rules(&self, registry: &ValidatorRegistry) -> Result<()> {
        for key in self.scenarios.keys() {
            let Some(scenario) = self.scenarios.get(key) else {
                continue;
            };
            for (field, rules) in scenario.iter() {
                for entry in rules {
                    check_rule(registry, &entry.rule).map_err(|source| ConfigError::InvalidRule {
                        scenario: key.to_string(),
                        field: field.to_string(),
                        rule: entry.rule.clone(),
                        source,
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Build an engine: the registry takes these settings and the scenarios
    /// are loaded after their rules have been checked.
    ///
    /// Register extensions on `registry` before calling this.
    pub fn build(&self, registry: ValidatorRegistry) -> Result<Validator> {
        self.settings.validate()?;
        self.check_rules(&registry)?;

        let registry = registry.with_options(self.settings.options());
        let mut validator = Validator::with_registry(registry);
        validator.import_scenarios(self.scenarios.clone());

        info!(
            target: TARGET_CONFIG,
            fields: [("scenarios", self.scenarios.len())],
            "Validator configured"
        );
        Ok(validator)
    }
}

fn check_rule(registry: &ValidatorRegistry, rule: &str) -> palisade_validation::Result<()> {
    let resolved = RuleToken::parse(rule).resolved();
    if !registry.is_registered(&resolved.name) {
        return Err(ValidationError::UnknownValidator(resolved.name.into_owned()));
    }
    if resolved.name == REGEX {
        compile_pattern(&resolved.args)?;
    }
    Ok(())
}

/// Load a rule file, apply `PALISADE_*` overrides and validate settings.
pub fn load(path: impl AsRef<Path>) -> Result<RuleConfig> {
    let path = path.as_ref();
    let mut config = RuleLoader::auto(path)?.load_file(path)?;
    finish(&mut config)?;
    debug!(target: TARGET_CONFIG, "Loaded rules from {}", path.display());
    Ok(config)
}

/// [`load`] for a directory of rule files.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<RuleConfig> {
    let mut config = RuleLoader::load_dir(dir)?;
    finish(&mut config)?;
    Ok(config)
}

fn finish(config: &mut RuleConfig) -> Result<()> {
    config.settings.apply_env(&EnvLoader::default())?;
    config.settings.validate()
}
