use serde::Deserialize;
use std::{collections::HashMap, path::PathBuf};

use crate::errors::{config_error, ConfigError};

use super::{
    loader::ConfigLoader,
    suggestion_config::{PartialSuggestionConfig, SuggestionConfig},
    validation_config::{PartialValidationConfig, ValidationConfig},
};

pub const USER_CONFIG_PATH: &str = "~/.config/nodesuggest";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_DATABASE_PATH: &str = "~/.nodesuggest/predictions.bin";

pub const ENV_DATABASE_PATH: &str = "NODESUGGEST_DATABASE_PATH";
pub const ENV_FOLDS: &str = "NODESUGGEST_FOLDS";

/// The `[storage]` section
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Binary prediction database (supports ~ expansion)
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct PartialStorageConfig {
    pub database_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl StorageConfig {
    pub fn from_partial(partial: Option<PartialStorageConfig>) -> Self {
        let partial = partial.unwrap_or_default();
        Self {
            database_path: partial.database_path.unwrap_or_else(default_database_path),
        }
    }

    pub fn resolved_database_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.database_path).as_ref())
    }
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub suggestion: SuggestionConfig,
    pub storage: StorageConfig,
    pub validation: ValidationConfig,
}

#[derive(Deserialize, Debug, Default)]
pub struct PartialAppConfig {
    suggestion: Option<PartialSuggestionConfig>,
    storage: Option<PartialStorageConfig>,
    validation: Option<PartialValidationConfig>,
}

impl AppConfig {
    /// Load from the default user config path.
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load_config()
    }

    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        ConfigLoader::with_path(path).load_config()
    }

    /// Layer file values over defaults, then environment over file.
    pub fn from_partial_and_env(
        partial: Option<PartialAppConfig>,
        env_map: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();

        let suggestion = SuggestionConfig::from_partial(partial.suggestion);
        let mut storage = StorageConfig::from_partial(partial.storage);
        let mut validation = ValidationConfig::from_partial(partial.validation);

        if let Some(path) = env_map.get(ENV_DATABASE_PATH) {
            storage.database_path = path.clone();
        }
        if let Some(folds) = env_map.get(ENV_FOLDS) {
            validation.folds = folds
                .trim()
                .parse()
                .map_err(|_| config_error(ENV_FOLDS, format!("'{folds}' is not a number")))?;
        }

        let config = AppConfig {
            suggestion,
            storage,
            validation,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.suggestion.validate()?;
        self.validation.validate()?;
        if self.storage.database_path.trim().is_empty() {
            return Err(config_error("storage.database_path", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> PartialAppConfig {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::from_partial_and_env(Some(parse("")), HashMap::new()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage.database_path, DEFAULT_DATABASE_PATH);
    }

    #[test]
    fn test_sections_are_layered() {
        let partial = parse(
            r#"
            [suggestion]
            count = 3
            rank_by_uses_first = true
            missing_capability = "include"

            [validation]
            folds = 4
            fold_order = "sequential"
            "#,
        );
        let config = AppConfig::from_partial_and_env(Some(partial), HashMap::new()).unwrap();

        assert_eq!(config.suggestion.count, 3);
        assert!(config.suggestion.rank_by_uses_first);
        assert!(config.suggestion.strict_type_detail);
        assert_eq!(config.validation.folds, 4);
        assert_eq!(config.validation.seed, 42);
    }

    #[test]
    fn test_env_overrides_file() {
        let partial = parse("[storage]\ndatabase_path = \"/tmp/file.bin\"\n");
        let env_map = HashMap::from([
            (ENV_DATABASE_PATH.to_string(), "/tmp/env.bin".to_string()),
            (ENV_FOLDS.to_string(), "3".to_string()),
        ]);
        let config = AppConfig::from_partial_and_env(Some(partial), env_map).unwrap();

        assert_eq!(config.storage.resolved_database_path(), PathBuf::from("/tmp/env.bin"));
        assert_eq!(config.validation.folds, 3);
    }

    #[test]
    fn test_invalid_env_folds() {
        let env_map = HashMap::from([(ENV_FOLDS.to_string(), "many".to_string())]);
        assert!(AppConfig::from_partial_and_env(None, env_map.clone()).is_err());

        let env_map = HashMap::from([(ENV_FOLDS.to_string(), "1".to_string())]);
        let err = AppConfig::from_partial_and_env(None, env_map).unwrap_err();
        assert!(matches!(err, ConfigError::FieldInvalid { field, .. } if field == "validation.folds"));
    }

    #[test]
    fn test_tilde_is_expanded() {
        let storage = StorageConfig::default();
        assert!(!storage
            .resolved_database_path()
            .to_string_lossy()
            .starts_with('~'));
    }
}
