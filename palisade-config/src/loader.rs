// Rule file loaders

use crate::{ConfigError, Result, RuleConfig, Settings};
use palisade_log::{debug, TARGET_CONFIG};
use palisade_validation::ScenarioStore;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Supported rule file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// On-disk shape of a rule file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDocument {
    #[serde(default)]
    settings: Option<Settings>,
    #[serde(default)]
    scenarios: ScenarioStore,
}

impl RuleDocument {
    /// Fold a later document into this one: its scenarios replace same-key
    /// scenarios and its settings, when present, replace ours.
    fn absorb(&mut self, later: RuleDocument) {
        if later.settings.is_some() {
            self.settings = later.settings;
        }
        self.scenarios.merge(later.scenarios);
    }

    fn into_config(self) -> RuleConfig {
        RuleConfig {
            settings: self.settings.unwrap_or_default(),
            scenarios: self.scenarios,
        }
    }
}

/// Rule file loader
pub struct RuleLoader {
    format: FileFormat,
}

impl RuleLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Detect the format from the file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError(format!("No file extension on {}", path.display())))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))?;

        Ok(Self::new(format))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load a rule file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<RuleConfig> {
        self.load_document(path.as_ref()).map(RuleDocument::into_config)
    }

    /// Parse rules from a string
    pub fn parse(&self, content: &str) -> Result<RuleConfig> {
        self.parse_document(content).map(RuleDocument::into_config)
    }

    /// Load every `.json` and `.toml` file in `dir`, in file name order.
    ///
    /// Scenarios from later files replace same-key scenarios from earlier
    /// ones; settings come from the last file that declares them.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<RuleConfig> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && FileFormat::from_path(path).is_some())
            .collect();
        paths.sort();

        let mut merged = RuleDocument::default();
        for path in &paths {
            let document = Self::auto(path)?.load_document(path)?;
            merged.absorb(document);
        }

        debug!(
            target: TARGET_CONFIG,
            fields: [("dir", dir.display()), ("files", paths.len())],
            "Loaded rule directory with {} scenarios",
            merged.scenarios.len()
        );
        Ok(merged.into_config())
    }

    fn load_document(&self, path: &Path) -> Result<RuleDocument> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let document = self.parse_document(&content)?;
        debug!(
            target: TARGET_CONFIG,
            fields: [("file", path.display())],
            "Loaded {} scenarios",
            document.scenarios.len()
        );
        Ok(document)
    }

    fn parse_document(&self, content: &str) -> Result<RuleDocument> {
        match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e))),
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_validation::SCENE_ADD;

    #[test]
    fn test_parse_json() {
        let loader = RuleLoader::new(FileFormat::Json);
        let json = r#"{
            "settings": {"dns_timeout_ms": 500},
            "scenarios": {"add": {"name": {"require": "name required"}}}
        }"#;

        let config = loader.parse(json).unwrap();
        assert_eq!(config.settings.dns_timeout_ms, 500);
        assert!(config.scenarios.contains(SCENE_ADD));
    }

    #[test]
    fn test_parse_toml_keeps_order() {
        let loader = RuleLoader::new(FileFormat::Toml);
        let toml = r#"
            [scenarios.add.zeta]
            require = "zeta required"
            "lengthRange:,9" = "zeta too long"

            [scenarios.add.alpha]
            number = "alpha numeric"
        "#;

        let config = loader.parse(toml).unwrap();
        let scenario = config.scenarios.get(SCENE_ADD).unwrap();
        assert_eq!(scenario.fields().collect::<Vec<_>>(), ["zeta", "alpha"]);

        let rules: Vec<_> = scenario
            .rules("zeta")
            .unwrap()
            .iter()
            .map(|entry| entry.rule.as_str())
            .collect();
        assert_eq!(rules, ["require", "lengthRange:,9"]);
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let config = RuleLoader::new(FileFormat::Json).parse("{}").unwrap();
        assert_eq!(config.settings, Settings::default());
        assert!(config.scenarios.is_empty());
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let result = RuleLoader::new(FileFormat::Json).parse(r#"{"scenario": {}}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert_eq!(
            RuleLoader::auto("rules.toml").unwrap().format(),
            FileFormat::Toml
        );
        assert!(matches!(
            RuleLoader::auto("rules.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            RuleLoader::auto("rules"),
            Err(ConfigError::LoadError(_))
        ));
    }
}
