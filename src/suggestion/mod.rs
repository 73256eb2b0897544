//! Query-time ranking of predicted nodes.

pub mod engine;

pub use engine::SuggestionEngine;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::corpus::{GraphId, NodeRef};
use crate::identity::NodeIdentity;
use crate::path::AdjacencyPath;
use crate::prediction::PredictionRecord;

/// Suggestion count used when the caller does not ask for one.
pub const DEFAULT_SUGGESTION_COUNT: usize = 5;

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionResult {
    pub prediction: NodeIdentity,
    /// Best position-wise context match, in `[0, 1]`.
    pub context_score: f32,
    pub uses_score: u64,
}

/// What to do with a candidate whose template capabilities are unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingCapabilityPolicy {
    #[default]
    Exclude,
    Include,
}

impl FromStr for MissingCapabilityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "include" => Ok(Self::Include),
            other => Err(format!("unknown missing capability policy '{other}'")),
        }
    }
}

/// A boolean ranking switch, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionFlag {
    UseContextScoring,
    RankByUsesFirst,
    FilterByConnectorType,
    StrictTypeDetail,
    LearnFromCreatedLinks,
}

impl SuggestionFlag {
    pub const ALL: [SuggestionFlag; 5] = [
        SuggestionFlag::UseContextScoring,
        SuggestionFlag::RankByUsesFirst,
        SuggestionFlag::FilterByConnectorType,
        SuggestionFlag::StrictTypeDetail,
        SuggestionFlag::LearnFromCreatedLinks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SuggestionFlag::UseContextScoring => "use-context-scoring",
            SuggestionFlag::RankByUsesFirst => "rank-by-uses-first",
            SuggestionFlag::FilterByConnectorType => "filter-by-connector-type",
            SuggestionFlag::StrictTypeDetail => "strict-type-detail",
            SuggestionFlag::LearnFromCreatedLinks => "learn-from-created-links",
        }
    }

    fn alias(self) -> Option<&'static str> {
        match self {
            SuggestionFlag::UseContextScoring => Some("calculatecontext"),
            SuggestionFlag::RankByUsesFirst => Some("sortusesovercontext"),
            _ => None,
        }
    }
}

impl FromStr for SuggestionFlag {
    type Err = String;

    /// Case-insensitive; `_` and `-` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SuggestionFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == wanted || flag.alias() == Some(wanted.as_str()))
            .ok_or_else(|| format!("unknown suggestion flag '{s}'"))
    }
}

impl fmt::Display for SuggestionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime switches of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionFlags {
    pub use_context_scoring: bool,
    pub rank_by_uses_first: bool,
    pub filter_by_connector_type: bool,
    pub strict_type_detail: bool,
    pub learn_from_created_links: bool,
    pub missing_capability: MissingCapabilityPolicy,
}

impl Default for SuggestionFlags {
    fn default() -> Self {
        Self {
            use_context_scoring: true,
            rank_by_uses_first: false,
            filter_by_connector_type: true,
            strict_type_detail: true,
            learn_from_created_links: true,
            missing_capability: MissingCapabilityPolicy::Exclude,
        }
    }
}

impl SuggestionFlags {
    pub fn get(&self, flag: SuggestionFlag) -> bool {
        match flag {
            SuggestionFlag::UseContextScoring => self.use_context_scoring,
            SuggestionFlag::RankByUsesFirst => self.rank_by_uses_first,
            SuggestionFlag::FilterByConnectorType => self.filter_by_connector_type,
            SuggestionFlag::StrictTypeDetail => self.strict_type_detail,
            SuggestionFlag::LearnFromCreatedLinks => self.learn_from_created_links,
        }
    }

    pub fn set(&mut self, flag: SuggestionFlag, value: bool) {
        let slot = match flag {
            SuggestionFlag::UseContextScoring => &mut self.use_context_scoring,
            SuggestionFlag::RankByUsesFirst => &mut self.rank_by_uses_first,
            SuggestionFlag::FilterByConnectorType => &mut self.filter_by_connector_type,
            SuggestionFlag::StrictTypeDetail => &mut self.strict_type_detail,
            SuggestionFlag::LearnFromCreatedLinks => &mut self.learn_from_created_links,
        };
        *slot = value;
    }

    /// Flip `flag` and return its new value.
    pub fn toggle(&mut self, flag: SuggestionFlag) -> bool {
        let value = !self.get(flag);
        self.set(flag, value);
        value
    }
}

/// The connector being wired, addressed by index into its owner's connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorContext {
    pub owner: NodeRef,
    pub connector: usize,
}

/// Query context. Must name exactly one graph and one connector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionContext {
    pub graphs: Vec<GraphId>,
    pub connectors: Vec<ConnectorContext>,
}

impl SuggestionContext {
    pub fn single(owner: NodeRef, connector: usize) -> Self {
        Self {
            graphs: vec![owner.graph],
            connectors: vec![ConnectorContext { owner, connector }],
        }
    }
}

/// One result per (candidate, available path) pair.
///
/// With context scoring off every pair scores zero, so ranking falls back to
/// uses.
pub fn score_candidates<'a>(
    candidates: impl IntoIterator<Item = &'a PredictionRecord>,
    available: &[AdjacencyPath],
    use_context_scoring: bool,
) -> Vec<SuggestionResult> {
    let mut results = Vec::new();
    for candidate in candidates {
        for path in available {
            let context_score = if use_context_scoring {
                candidate.context.compare_context(path)
            } else {
                0.0
            };
            results.push(SuggestionResult {
                prediction: candidate.prediction.clone(),
                context_score,
                uses_score: u64::from(candidate.num_uses),
            });
        }
    }
    results
}

/// Collapse results per prediction: max context score, summed uses, kept in
/// first-seen order.
pub fn combine_results(results: Vec<SuggestionResult>) -> Vec<SuggestionResult> {
    let mut combined: Vec<SuggestionResult> = Vec::with_capacity(results.len());
    let mut index: HashMap<NodeIdentity, usize> = HashMap::new();
    for result in results {
        match index.get(&result.prediction) {
            Some(&slot) => {
                let existing = &mut combined[slot];
                existing.context_score = existing.context_score.max(result.context_score);
                existing.uses_score = existing.uses_score.saturating_add(result.uses_score);
            }
            None => {
                index.insert(result.prediction.clone(), combined.len());
                combined.push(result);
            }
        }
    }
    combined
}

fn compare_context_first(a: &SuggestionResult, b: &SuggestionResult) -> Ordering {
    b.context_score
        .total_cmp(&a.context_score)
        .then(b.uses_score.cmp(&a.uses_score))
}

fn compare_uses_first(a: &SuggestionResult, b: &SuggestionResult) -> Ordering {
    b.uses_score
        .cmp(&a.uses_score)
        .then(b.context_score.total_cmp(&a.context_score))
}

/// Stable descending sort, then truncate to `count`.
pub fn rank_results(
    mut results: Vec<SuggestionResult>,
    count: usize,
    rank_by_uses_first: bool,
) -> Vec<SuggestionResult> {
    if rank_by_uses_first {
        results.sort_by(compare_uses_first);
    } else {
        results.sort_by(compare_context_first);
    }
    results.truncate(count);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::Direction;

    fn result(prediction: &str, context_score: f32, uses_score: u64) -> SuggestionResult {
        SuggestionResult {
            prediction: NodeIdentity::new(prediction),
            context_score,
            uses_score,
        }
    }

    fn path(nodes: &[&str]) -> AdjacencyPath {
        AdjacencyPath::from_nodes(nodes.iter().map(NodeIdentity::new))
    }

    #[test]
    fn test_flag_names_and_aliases() {
        assert_eq!(
            "use-context-scoring".parse::<SuggestionFlag>().unwrap(),
            SuggestionFlag::UseContextScoring
        );
        assert_eq!(
            "CalculateContext".parse::<SuggestionFlag>().unwrap(),
            SuggestionFlag::UseContextScoring
        );
        assert_eq!(
            "SortUsesOverContext".parse::<SuggestionFlag>().unwrap(),
            SuggestionFlag::RankByUsesFirst
        );
        assert_eq!(
            "STRICT_TYPE_DETAIL".parse::<SuggestionFlag>().unwrap(),
            SuggestionFlag::StrictTypeDetail
        );
        assert!("frobnicate".parse::<SuggestionFlag>().is_err());
    }

    #[test]
    fn test_flags_toggle() {
        let mut flags = SuggestionFlags::default();
        assert!(flags.use_context_scoring);
        assert!(!flags.rank_by_uses_first);

        assert!(flags.toggle(SuggestionFlag::RankByUsesFirst));
        assert!(flags.rank_by_uses_first);
        assert!(!flags.toggle(SuggestionFlag::RankByUsesFirst));
        assert!(!flags.get(SuggestionFlag::RankByUsesFirst));
    }

    #[test]
    fn test_score_candidates_one_per_pair() {
        let candidates = [
            PredictionRecord::new(Direction::Forward, "A".into(), "P".into())
                .with_context(path(&["X"]))
                .with_uses(2),
            PredictionRecord::new(Direction::Forward, "A".into(), "Q".into()),
        ];
        let available = [path(&["X", "Y"]), path(&["Z"])];

        let results = score_candidates(&candidates, &available, true);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0], result("P", 1.0, 2));
        assert_eq!(results[1], result("P", 0.0, 2));
        // empty stored context never scores
        assert_eq!(results[2], result("Q", 0.0, 1));

        let unscored = score_candidates(&candidates, &available, false);
        assert!(unscored.iter().all(|r| r.context_score == 0.0));
    }

    #[test]
    fn test_combine_takes_max_context_and_sums_uses() {
        let combined = combine_results(vec![
            result("P", 0.5, 2),
            result("Q", 0.1, 1),
            result("P", 1.0, 3),
        ]);
        assert_eq!(combined, vec![result("P", 1.0, 5), result("Q", 0.1, 1)]);
    }

    #[test]
    fn test_rank_by_context_then_uses() {
        let ranked = rank_results(
            vec![
                result("Low", 0.2, 9),
                result("HighFew", 1.0, 1),
                result("HighMany", 1.0, 4),
            ],
            10,
            false,
        );
        let order: Vec<_> = ranked.iter().map(|r| r.prediction.signature()).collect();
        assert_eq!(order, ["HighMany", "HighFew", "Low"]);
    }

    #[test]
    fn test_rank_by_uses_then_context_and_truncate() {
        let ranked = rank_results(
            vec![
                result("Low", 0.2, 9),
                result("HighFew", 1.0, 1),
                result("Tie", 0.5, 9),
            ],
            2,
            true,
        );
        let order: Vec<_> = ranked.iter().map(|r| r.prediction.signature()).collect();
        assert_eq!(order, ["Tie", "Low"]);
    }

    #[test]
    fn test_rank_is_stable_for_equal_keys() {
        let ranked = rank_results(
            vec![result("First", 0.5, 1), result("Second", 0.5, 1)],
            5,
            false,
        );
        assert_eq!(ranked[0].prediction.signature(), "First");
    }

    #[test]
    fn test_missing_capability_policy_parse() {
        assert_eq!(
            "Include".parse::<MissingCapabilityPolicy>().unwrap(),
            MissingCapabilityPolicy::Include
        );
        assert!("maybe".parse::<MissingCapabilityPolicy>().is_err());
    }
}
