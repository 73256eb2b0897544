use serde::Deserialize;

use crate::errors::{config_error, ConfigError};
use crate::suggestion::SuggestionFlags;
use crate::validation::{FoldOrder, KFoldConfig, KFOLD_NUM_SUGGESTIONS};

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FoldOrderKind {
    #[default]
    Shuffled,
    Sequential,
}

/// The `[validation]` section
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    #[serde(default = "default_folds")]
    pub folds: usize,

    #[serde(default = "default_suggestions_per_test")]
    pub suggestions_per_test: usize,

    #[serde(default)]
    pub fold_order: FoldOrderKind,

    /// Only used with the shuffled order
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Deserialize, Debug, Default)]
pub struct PartialValidationConfig {
    pub folds: Option<usize>,
    pub suggestions_per_test: Option<usize>,
    pub fold_order: Option<FoldOrderKind>,
    pub seed: Option<u64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::from_partial(None)
    }
}

impl ValidationConfig {
    pub fn from_partial(partial: Option<PartialValidationConfig>) -> Self {
        let partial = partial.unwrap_or_default();

        Self {
            folds: partial.folds.unwrap_or_else(default_folds),
            suggestions_per_test: partial
                .suggestions_per_test
                .unwrap_or_else(default_suggestions_per_test),
            fold_order: partial.fold_order.unwrap_or_default(),
            seed: partial.seed.unwrap_or_else(default_seed),
        }
    }

    pub fn fold_order(&self) -> FoldOrder {
        match self.fold_order {
            FoldOrderKind::Shuffled => FoldOrder::Shuffled { seed: self.seed },
            FoldOrderKind::Sequential => FoldOrder::Sequential,
        }
    }

    pub fn kfold_config(&self, flags: SuggestionFlags) -> KFoldConfig {
        KFoldConfig {
            folds: self.folds,
            suggestions_per_test: self.suggestions_per_test,
            order: self.fold_order(),
            flags,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.folds < 2 {
            return Err(config_error("validation.folds", "must be at least 2"));
        }
        if self.suggestions_per_test == 0 {
            return Err(config_error(
                "validation.suggestions_per_test",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_folds() -> usize {
    10
}

fn default_suggestions_per_test() -> usize {
    KFOLD_NUM_SUGGESTIONS
}

fn default_seed() -> u64 {
    42
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validation_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.folds, 10);
        assert_eq!(config.suggestions_per_test, 5);
        assert_eq!(config.fold_order(), FoldOrder::Shuffled { seed: 42 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sequential_order_ignores_seed() {
        let config = ValidationConfig::from_partial(Some(PartialValidationConfig {
            fold_order: Some(FoldOrderKind::Sequential),
            seed: Some(9),
            ..Default::default()
        }));
        assert_eq!(config.kfold_config(SuggestionFlags::default()).order, FoldOrder::Sequential);
    }

    #[test]
    fn test_invalid_values() {
        let single = ValidationConfig {
            folds: 1,
            ..Default::default()
        };
        assert!(single.validate().is_err());

        let no_suggestions = ValidationConfig {
            suggestions_per_test: 0,
            ..Default::default()
        };
        assert!(matches!(
            no_suggestions.validate(),
            Err(ConfigError::FieldInvalid { field, .. }) if field == "validation.suggestions_per_test"
        ));
    }
}
