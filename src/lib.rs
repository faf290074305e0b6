// Palisade - declarative field validation for Rust
//
// Rule strings such as `require`, `between:1,120` or `mobile` are grouped
// per field into scenarios and evaluated against loosely typed records.

// Re-export the engine
pub use palisade_validation::*;

// Re-export logging controls
pub use palisade_log as log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use palisade_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        FieldErrors,
        FieldRules,
        Record,
        RuleContext,
        SCENE_ADD,
        SCENE_EDIT,
        Scenario,
        ScenarioStore,
        ValidationError,
        ValidationOptions,
        Validator,
        ValidatorRegistry,
        Value,
        record,
        register_validator,
        verify,
        verify_batch,
    };

    #[cfg(feature = "config")]
    pub use palisade_config::{RuleConfig, RuleLoader};
}
