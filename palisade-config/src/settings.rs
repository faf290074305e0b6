// Engine settings and their validation

use crate::{ConfigError, EnvLoader, Result};
use palisade_validation::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// `[settings]` table of a rule file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Upper bound on the `availableUrl` DNS lookup, in milliseconds
    pub dns_timeout_ms: u64,
}

impl Settings {
    pub const DNS_TIMEOUT_RANGE: (u64, u64) = (1, 60_000);

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    pub fn options(&self) -> ValidationOptions {
        ValidationOptions::default().with_dns_timeout(self.dns_timeout())
    }

    /// Override fields from `<PREFIX>_DNS_TIMEOUT_MS`.
    pub fn apply_env(&mut self, env: &EnvLoader) -> Result<()> {
        if let Some(ms) = env.load_parsed::<u64>("dns_timeout_ms")? {
            self.dns_timeout_ms = ms;
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dns_timeout_ms: ValidationOptions::DEFAULT_DNS_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        let (min, max) = Self::DNS_TIMEOUT_RANGE;
        in_range(self.dns_timeout_ms, min, max, "dns_timeout_ms")
    }
}

fn in_range<T: PartialOrd + std::fmt::Display>(value: T, min: T, max: T, field: &str) -> Result<()> {
    if value < min || value > max {
        return Err(ConfigError::InvalidSetting(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}
