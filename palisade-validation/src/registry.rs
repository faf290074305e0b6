// Validator registry and ad-hoc verification

use crate::rule::RuleToken;
use crate::validators::builtin;
use crate::{Record, Result, RuleContext, ValidationError, ValidationOptions, ValidatorFn, Value};
use once_cell::sync::Lazy;
use palisade_log::{debug, trace, warn, TARGET_REGISTRY};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Field name reported to validators during ad-hoc verification.
pub const VERIFY_FIELD: &str = "__";

static GLOBAL: Lazy<ValidatorRegistry> = Lazy::new(ValidatorRegistry::new);

/// Name to validator mapping.
///
/// Extensions registered here take priority over built-ins of the same name.
/// Cloning yields another handle to the same extension table; the options
/// are copied.
///
/// # Examples
///
/// ```
/// use palisade_validation::{ValidatorRegistry, Value};
///
/// let registry = ValidatorRegistry::new();
/// registry.register("even", |ctx| {
///     if ctx.skips() {
///         return Ok(true);
///     }
///     Ok(matches!(ctx.value, Value::Int(i) if i % 2 == 0))
/// });
///
/// assert!(registry.verify(4, "even").unwrap());
/// assert!(!registry.verify(3, "even").unwrap());
/// ```
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    extensions: Arc<RwLock<HashMap<String, ValidatorFn>>>,
    options: ValidationOptions,
}

impl ValidatorRegistry {
    /// A registry with built-ins only.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by the free functions and by
    /// `Validator::new()`.
    pub fn global() -> &'static ValidatorRegistry {
        &GLOBAL
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Register an extension, replacing any earlier one of the same name.
    pub fn register<F>(&self, name: impl Into<String>, validator: F)
    where
        F: Fn(&RuleContext<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        let name = name.into();
        let replaced = self
            .extensions
            .write()
            .insert(name.clone(), Arc::new(validator))
            .is_some();

        debug!(
            target: TARGET_REGISTRY,
            "Registered validator '{}'{}",
            name,
            if replaced { " (replaced)" } else { "" }
        );
    }

    /// Remove an extension. Built-ins cannot be removed; removing an
    /// extension that shadowed one makes the built-in visible again.
    pub fn unregister(&self, name: &str) -> bool {
        self.extensions.write().remove(name).is_some()
    }

    /// Whether `name` resolves to an extension or a built-in.
    pub fn is_registered(&self, name: &str) -> bool {
        self.extensions.read().contains_key(name) || builtin(name).is_some()
    }

    /// Names of registered extensions, sorted.
    pub fn extension_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.extensions.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up a canonical name: extensions first, then built-ins.
    pub fn resolve(&self, name: &str) -> Result<ValidatorFn> {
        if let Some(validator) = self.extensions.read().get(name) {
            return Ok(Arc::clone(validator));
        }
        builtin(name).ok_or_else(|| {
            warn!(target: TARGET_REGISTRY, "Unknown validator '{}'", name);
            ValidationError::UnknownValidator(name.to_string())
        })
    }

    /// Apply a single rule token to a value outside any scenario.
    ///
    /// The value is treated as required, so the skip policy never applies.
    pub fn verify(&self, value: impl Into<Value>, rule: &str) -> Result<bool> {
        let value = value.into();
        self.verify_value(&value, rule, &Record::new())
    }

    /// Apply rules in order, stopping at the first failure.
    pub fn verify_batch<'r>(
        &self,
        value: impl Into<Value>,
        rules: impl IntoIterator<Item = &'r str>,
    ) -> Result<bool> {
        let value = value.into();
        let record = Record::new();
        for rule in rules {
            if !self.verify_value(&value, rule, &record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn verify_value(&self, value: &Value, rule: &str, record: &Record) -> Result<bool> {
        let resolved = RuleToken::parse(rule).resolved();
        let validator = self.resolve(&resolved.name)?;
        let ctx = RuleContext {
            args: &resolved.args,
            value,
            field: VERIFY_FIELD,
            record,
            is_required: true,
            options: &self.options,
        };
        let passed = validator(&ctx)?;

        trace!(
            target: TARGET_REGISTRY,
            "verify {} on {} value: {}",
            rule,
            value.type_name(),
            if passed { "pass" } else { "fail" }
        );
        Ok(passed)
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("extensions", &self.extension_names())
            .field("options", &self.options)
            .finish()
    }
}
