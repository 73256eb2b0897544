//! K-fold cross-validation of suggestion precision.
//!
//! Every node of the corpus lands in one fold. For each fold the harness
//! trains a private engine on all other folds, then asks it for suggestions
//! on every linked connector of the held-out nodes and checks whether the
//! real neighbour comes back.

pub mod report;

pub use report::{FoldResult, KFoldReport, TimingSummary};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::corpus::{Corpus, NodeRef};
use crate::suggestion::{SuggestionContext, SuggestionEngine, SuggestionFlags};

/// Suggestions requested per held-out connector by default.
pub const KFOLD_NUM_SUGGESTIONS: usize = 5;

/// How nodes are ordered before being dealt into folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoldOrder {
    /// Corpus order.
    Sequential,
    /// Shuffled with a seeded RNG; the same seed gives the same folds.
    Shuffled { seed: u64 },
}

impl Default for FoldOrder {
    fn default() -> Self {
        FoldOrder::Shuffled { seed: 42 }
    }
}

impl fmt::Display for FoldOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldOrder::Sequential => f.write_str("sequential"),
            FoldOrder::Shuffled { seed } => write!(f, "shuffled(seed={seed})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KFoldConfig {
    pub folds: usize,
    pub suggestions_per_test: usize,
    pub order: FoldOrder,
    pub flags: SuggestionFlags,
}

impl Default for KFoldConfig {
    fn default() -> Self {
        Self {
            folds: 10,
            suggestions_per_test: KFOLD_NUM_SUGGESTIONS,
            order: FoldOrder::default(),
            flags: SuggestionFlags::default(),
        }
    }
}

/// Deal every node of every editable graph into `folds` buckets; node `i`
/// of the ordered list goes to bucket `i % folds`.
pub fn partition_nodes<C: Corpus + ?Sized>(
    corpus: &C,
    folds: usize,
    order: FoldOrder,
) -> Vec<Vec<NodeRef>> {
    assert!(folds >= 2, "k-fold cross validation needs at least 2 folds, got {folds}");

    let mut nodes: Vec<NodeRef> = corpus
        .graphs()
        .into_iter()
        .flat_map(|graph| corpus.nodes(graph))
        .collect();
    if let FoldOrder::Shuffled { seed } = order {
        let mut rng = StdRng::seed_from_u64(seed);
        nodes.shuffle(&mut rng);
    }

    let mut buckets = vec![Vec::new(); folds];
    for (i, node) in nodes.into_iter().enumerate() {
        buckets[i % folds].push(node);
    }
    buckets
}

/// Run the full cross validation. The caller's engine, if any, is never
/// touched.
///
/// # Panics
///
/// If `config.folds < 2`.
pub fn run_k_fold<C: Corpus + ?Sized>(corpus: &C, config: &KFoldConfig) -> KFoldReport {
    let buckets = partition_nodes(corpus, config.folds, config.order);
    let mut report = KFoldReport::new(
        config.folds,
        config.suggestions_per_test,
        config.order.to_string(),
    );
    let mut engine = SuggestionEngine::new(config.flags);

    for (fold, held_out) in buckets.iter().enumerate() {
        let training: Vec<NodeRef> = buckets
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != fold)
            .flat_map(|(_, nodes)| nodes.iter().copied())
            .collect();

        engine.flush();
        let records = engine.mine_nodes(corpus, &training);

        let mut result = FoldResult::new(fold, config.suggestions_per_test);
        result.training_nodes = training.len();
        result.test_nodes = held_out.len();
        for &node in held_out {
            test_node(&mut engine, corpus, node, config.suggestions_per_test, &mut result);
        }

        tracing::info!(
            fold,
            training = result.training_nodes,
            records,
            tests = result.tests,
            passed = result.passed,
            "Fold complete"
        );
        report.push_fold(result);
    }

    tracing::info!(
        folds = config.folds,
        tests = report.tests,
        passed = report.passed,
        precision = report.precision(),
        "Cross validation complete"
    );
    report
}

fn test_node<C: Corpus + ?Sized>(
    engine: &mut SuggestionEngine,
    corpus: &C,
    node: NodeRef,
    count: usize,
    result: &mut FoldResult,
) {
    for (index, connector) in corpus.connectors(node).iter().enumerate() {
        if connector.links.is_empty() {
            continue;
        }
        result.tests += 1;

        let start = Instant::now();
        let suggestions =
            engine.provide_suggestions(corpus, &SuggestionContext::single(node, index), count);
        result.timing.record(start.elapsed());

        for &neighbour in &connector.links {
            let expected = corpus.identity(neighbour);
            if let Some(rank) = suggestions.iter().position(|s| s.prediction == expected) {
                result.passed += 1;
                result.rank_hits[rank] += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{AssetDocument, GraphDocument, MemoryCorpus, NodeDocument};

    /// `copies` identical graphs of Get -> Add -> Print
    fn repeated_corpus(copies: usize) -> MemoryCorpus {
        let mut asset = AssetDocument::new("Repeated");
        for i in 0..copies {
            asset = asset.graph(
                GraphDocument::new(format!("G{i}"))
                    .node(NodeDocument::new("get", "Get").output("value", "int"))
                    .node(
                        NodeDocument::new("add", "Add")
                            .input("lhs", "int")
                            .output("sum", "int"),
                    )
                    .node(NodeDocument::new("print", "Print").input("value", "int"))
                    .link("get", "value", "add", "lhs")
                    .link("add", "sum", "print", "value"),
            );
        }
        MemoryCorpus::from_assets([asset])
    }

    #[test]
    fn test_partition_sequential_round_robin() {
        let corpus = repeated_corpus(2);
        let buckets = partition_nodes(&corpus, 4, FoldOrder::Sequential);
        let sizes: Vec<_> = buckets.iter().map(Vec::len).collect();
        assert_eq!(sizes, [2, 2, 1, 1]);
        assert_eq!(buckets[0][0], corpus.nodes(corpus.graphs()[0])[0]);
    }

    #[test]
    fn test_partition_shuffle_is_seeded() {
        let corpus = repeated_corpus(5);
        let order = FoldOrder::Shuffled { seed: 7 };
        let first = partition_nodes(&corpus, 3, order);
        let second = partition_nodes(&corpus, 3, order);
        assert_eq!(first, second);

        let mut all: Vec<_> = first.into_iter().flatten().collect();
        all.sort_by_key(|n| (n.graph.0, n.index));
        assert_eq!(all.len(), 15);
        all.dedup();
        assert_eq!(all.len(), 15);
    }

    #[test]
    #[should_panic(expected = "at least 2 folds")]
    fn test_single_fold_is_rejected() {
        let corpus = repeated_corpus(1);
        run_k_fold(
            &corpus,
            &KFoldConfig {
                folds: 1,
                ..Default::default()
            },
        );
    }

    #[test]
    fn test_repeated_patterns_are_found() {
        let corpus = repeated_corpus(4);
        let report = run_k_fold(
            &corpus,
            &KFoldConfig {
                folds: 2,
                order: FoldOrder::Sequential,
                ..Default::default()
            },
        );

        // get: 1, add: 2, print: 1 linked connectors per graph
        assert_eq!(report.tests, 16);
        assert_eq!(report.fold_results.len(), 2);
        // every neighbour appears in some other graph of the training folds
        assert_eq!(report.passed, 16);
        assert_eq!(report.rank_hits[0], 16);
        assert_eq!(report.timing.requests, 16);
    }

    #[test]
    fn test_report_is_deterministic_for_fixed_seed() {
        let corpus = repeated_corpus(3);
        let config = KFoldConfig {
            folds: 3,
            ..Default::default()
        };
        let a = run_k_fold(&corpus, &config);
        let b = run_k_fold(&corpus, &config);
        assert_eq!(a.tests, b.tests);
        assert_eq!(a.passed, b.passed);
        assert_eq!(a.rank_hits, b.rank_hits);
    }
}
