// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Default prefix for Palisade environment variables
pub const ENV_PREFIX: &str = "PALISADE";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// All variables under the prefix, keyed by the lowercased remainder
    pub fn load(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();

        for (key, value) in env::vars() {
            match self.prefix {
                Some(ref prefix) => {
                    if let Some(rest) = key.strip_prefix(prefix.as_str()) {
                        vars.insert(rest.trim_start_matches('_').to_lowercase(), value);
                    }
                }
                None => {
                    vars.insert(key.to_lowercase(), value);
                }
            }
        }

        vars
    }

    /// Full variable name for `key`
    pub fn var_name(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.var_name(key)).map_err(ConfigError::EnvError)
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Parse a variable, `None` when unset
    pub fn load_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let name = self.var_name(key);
        match env::var(&name) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::InvalidSetting(format!("{}={:?}: {}", name, raw, e))),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::EnvError(e)),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }
}

/// Load a `.env` file into the process environment.
///
/// With no path, a missing `.env` in the working directory is not an error.
pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let loader = EnvLoader::default();
        assert_eq!(loader.var_name("dns_timeout_ms"), "PALISADE_DNS_TIMEOUT_MS");
        assert_eq!(EnvLoader::new(None).var_name("path"), "PATH");
    }

    #[test]
    fn test_missing_var() {
        let loader = EnvLoader::new(Some("PALISADE_UNIT".to_string()));
        assert!(loader.load_var("MISSING_VAR_67890").is_err());
        assert_eq!(loader.load_var_or("MISSING_VAR_67890", "fallback"), "fallback");
        assert_eq!(loader.load_parsed::<u64>("MISSING_VAR_67890").unwrap(), None);
    }

    #[test]
    fn test_parsed_var() {
        unsafe {
            env::set_var("PALISADE_UNIT_PARSED_MS", " 750 ");
            env::set_var("PALISADE_UNIT_BROKEN_MS", "soon");
        }

        let loader = EnvLoader::new(Some("PALISADE_UNIT".to_string()));
        assert_eq!(loader.load_parsed::<u64>("parsed_ms").unwrap(), Some(750));
        assert!(matches!(
            loader.load_parsed::<u64>("broken_ms"),
            Err(ConfigError::InvalidSetting(_))
        ));
        assert_eq!(loader.load().get("parsed_ms").map(String::as_str), Some(" 750 "));

        unsafe {
            env::remove_var("PALISADE_UNIT_PARSED_MS");
            env::remove_var("PALISADE_UNIT_BROKEN_MS");
        }
    }
}
