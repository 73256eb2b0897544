use serde::Deserialize;

use crate::errors::{config_error, ConfigError};
use crate::suggestion::{MissingCapabilityPolicy, SuggestionFlags, DEFAULT_SUGGESTION_COUNT};

/// Ranking behaviour of the `[suggestion]` section
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SuggestionConfig {
    /// Suggestions returned per query
    #[serde(default = "default_count")]
    pub count: usize,

    #[serde(default = "default_true")]
    pub use_context_scoring: bool,

    /// Rank by accumulated uses before context score
    #[serde(default)]
    pub rank_by_uses_first: bool,

    #[serde(default = "default_true")]
    pub filter_by_connector_type: bool,

    /// Also compare the connector's type detail when filtering
    #[serde(default = "default_true")]
    pub strict_type_detail: bool,

    #[serde(default = "default_true")]
    pub learn_from_created_links: bool,

    #[serde(default)]
    pub missing_capability: MissingCapabilityPolicy,
}

#[derive(Deserialize, Debug, Default)]
pub struct PartialSuggestionConfig {
    pub count: Option<usize>,
    pub use_context_scoring: Option<bool>,
    pub rank_by_uses_first: Option<bool>,
    pub filter_by_connector_type: Option<bool>,
    pub strict_type_detail: Option<bool>,
    pub learn_from_created_links: Option<bool>,
    pub missing_capability: Option<MissingCapabilityPolicy>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self::from_partial(None)
    }
}

impl SuggestionConfig {
    pub fn from_partial(partial: Option<PartialSuggestionConfig>) -> Self {
        let partial = partial.unwrap_or_default();
        let defaults = SuggestionFlags::default();

        Self {
            count: partial.count.unwrap_or_else(default_count),
            use_context_scoring: partial
                .use_context_scoring
                .unwrap_or(defaults.use_context_scoring),
            rank_by_uses_first: partial
                .rank_by_uses_first
                .unwrap_or(defaults.rank_by_uses_first),
            filter_by_connector_type: partial
                .filter_by_connector_type
                .unwrap_or(defaults.filter_by_connector_type),
            strict_type_detail: partial
                .strict_type_detail
                .unwrap_or(defaults.strict_type_detail),
            learn_from_created_links: partial
                .learn_from_created_links
                .unwrap_or(defaults.learn_from_created_links),
            missing_capability: partial
                .missing_capability
                .unwrap_or(defaults.missing_capability),
        }
    }

    pub fn flags(&self) -> SuggestionFlags {
        SuggestionFlags {
            use_context_scoring: self.use_context_scoring,
            rank_by_uses_first: self.rank_by_uses_first,
            filter_by_connector_type: self.filter_by_connector_type,
            strict_type_detail: self.strict_type_detail,
            learn_from_created_links: self.learn_from_created_links,
            missing_capability: self.missing_capability,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(config_error("suggestion.count", "must be at least 1"));
        }
        Ok(())
    }
}

fn default_count() -> usize {
    DEFAULT_SUGGESTION_COUNT
}

fn default_true() -> bool {
    true
}
