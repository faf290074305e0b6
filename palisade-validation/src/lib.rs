//! Declarative rule-based field validation.
//!
//! Rules are compact strings (`require`, `between:1,120`, `regex:/^\d+$/`)
//! paired with the message reported when they fail. Rules are grouped per
//! field into scenarios, so the same record shape can be validated
//! differently for creation and update.
//!
//! # Examples
//!
//! ## Scenarios
//!
//! ```
//! use palisade_validation::{record, FieldRules, Scenario, Validator, SCENE_ADD};
//!
//! let mut validator = Validator::new();
//! validator.load_scenario(
//!     SCENE_ADD,
//!     Scenario::new()
//!         .field(
//!             "name",
//!             FieldRules::new()
//!                 .rule("require", "name is required")
//!                 .rule("lengthRange:,9", "name is at most 9 characters"),
//!         )
//!         .field("phone", FieldRules::new().rule("mobile", "not a mobile number")),
//! );
//!
//! let data = record! { "name" => "alice" };
//! // phone is optional and empty, so its rules are skipped
//! assert!(validator.check(SCENE_ADD, &data).unwrap());
//! ```
//!
//! ## Ad-hoc verification
//!
//! ```
//! use palisade_validation::{verify, verify_batch};
//!
//! assert!(verify(20, ">:15").unwrap());
//! assert!(verify("user@example.com", "email").unwrap());
//! assert!(!verify_batch("abc", ["require", "number"]).unwrap());
//! ```
//!
//! ## Custom validators
//!
//! ```
//! use palisade_validation::{FieldRules, Scenario, Validator, ValidatorRegistry, record};
//!
//! let registry = ValidatorRegistry::new();
//! registry.register("slug", |ctx| {
//!     if ctx.skips() {
//!         return Ok(true);
//!     }
//!     Ok(ctx
//!         .str_value()
//!         .is_some_and(|s| s.chars().all(|c| c.is_ascii_lowercase() || c == '-')))
//! });
//!
//! let mut validator = Validator::with_registry(registry);
//! validator.load_scenario(
//!     "post",
//!     Scenario::new().field("slug", FieldRules::new().rule("slug", "invalid slug")),
//! );
//! assert!(!validator.check("post", &record! { "slug" => "Hello World" }).unwrap());
//! ```

pub mod compare;
mod engine;
mod errors;
mod registry;
pub mod rule;
mod scenario;
mod traits;
pub mod validators;
mod value;

pub use engine::*;
pub use errors::*;
pub use registry::*;
pub use scenario::*;
pub use traits::*;
pub use value::*;

/// Apply one rule to a value using the global registry.
pub fn verify(value: impl Into<Value>, rule: &str) -> Result<bool> {
    ValidatorRegistry::global().verify(value, rule)
}

/// Apply rules in order using the global registry, stopping at the first
/// failure.
pub fn verify_batch<'r>(
    value: impl Into<Value>,
    rules: impl IntoIterator<Item = &'r str>,
) -> Result<bool> {
    ValidatorRegistry::global().verify_batch(value, rules)
}

/// Register an extension on the global registry.
///
/// Affects every engine built with [`Validator::new`] and every later call
/// to [`verify`].
pub fn register_validator<F>(name: impl Into<String>, validator: F)
where
    F: Fn(&RuleContext<'_>) -> Result<bool> + Send + Sync + 'static,
{
    ValidatorRegistry::global().register(name, validator);
}
