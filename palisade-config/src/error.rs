// Error types for rule configuration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// A rule in a loaded scenario cannot be evaluated.
    #[error("Invalid rule '{rule}' for field '{field}' in scenario '{scenario}': {source}")]
    InvalidRule {
        scenario: String,
        field: String,
        rule: String,
        #[source]
        source: palisade_validation::ValidationError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
