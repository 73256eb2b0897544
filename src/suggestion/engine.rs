use std::path::Path;

use super::{
    combine_results, rank_results, score_candidates, MissingCapabilityPolicy, SuggestionContext,
    SuggestionFlag, SuggestionFlags, SuggestionResult,
};
use crate::capability::CapabilityStore;
use crate::corpus::{ConnectorDescriptor, Corpus, NodeRef};
use crate::logging::OperationTimer;
use crate::prediction::mining::{
    find_all_context_paths, mine_corpus, mine_node, mine_node_for_anchor, MiningSummary,
};
use crate::prediction::{persist, DatabaseStats, Direction, PredictionDatabase, PredictionRecord};

/// Owns the prediction database and capability store, and answers
/// suggestion queries against a corpus.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    database: PredictionDatabase,
    capabilities: CapabilityStore,
    flags: SuggestionFlags,
}

impl SuggestionEngine {
    pub fn new(flags: SuggestionFlags) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }

    pub fn flags(&self) -> SuggestionFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: SuggestionFlags) {
        self.flags = flags;
    }

    /// Flip a flag by name. Unknown names are logged and ignored.
    pub fn toggle_flag(&mut self, name: &str) -> Option<bool> {
        match name.parse::<SuggestionFlag>() {
            Ok(flag) => {
                let value = self.flags.toggle(flag);
                tracing::info!(flag = %flag, value, "Toggled suggestion flag");
                Some(value)
            }
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }

    pub fn database(&self) -> &PredictionDatabase {
        &self.database
    }

    pub fn capabilities(&self) -> &CapabilityStore {
        &self.capabilities
    }

    pub fn stats(&self) -> DatabaseStats {
        self.database.stats()
    }

    pub fn has_suggestions(&self) -> bool {
        !self.database.is_empty()
    }

    /// Clear predictions and capabilities.
    pub fn flush(&mut self) {
        self.database.flush();
        self.capabilities.flush();
    }

    /// Flush, then mine every editable graph and capture capabilities.
    pub fn fill_database<C: Corpus + ?Sized>(&mut self, corpus: &C) -> MiningSummary {
        self.flush();
        let summary = crate::measure_performance!("fill_database", {
            mine_corpus(&mut self.database, corpus)
        });
        let captured = self.capabilities.fill_from(corpus);
        let stats = self.database.stats();
        tracing::info!(
            graphs = summary.graphs,
            nodes = summary.nodes,
            records = summary.records,
            forward_anchors = stats.forward_anchors,
            backward_anchors = stats.backward_anchors,
            templates = captured,
            "Filled prediction database"
        );
        summary
    }

    /// Mine only `nodes`, in both directions, without flushing.
    pub fn mine_nodes<C: Corpus + ?Sized>(&mut self, corpus: &C, nodes: &[NodeRef]) -> usize {
        let mut records = 0;
        for &node in nodes {
            for direction in Direction::ALL {
                records += mine_node(&mut self.database, corpus, node, direction);
            }
        }
        records
    }

    /// Learn from one link the user just created between `a` and `b`.
    ///
    /// Only records anchored on the other endpoint are kept. Returns the
    /// number of records inserted.
    pub fn generate_for_created_link<C: Corpus + ?Sized>(
        &mut self,
        corpus: &C,
        a: NodeRef,
        b: NodeRef,
    ) -> usize {
        if !self.flags.learn_from_created_links {
            tracing::debug!("Learning from created links is disabled");
            return 0;
        }
        let identity_a = corpus.identity(a);
        let identity_b = corpus.identity(b);
        let mut records = 0;
        for direction in Direction::ALL {
            records += mine_node_for_anchor(&mut self.database, corpus, a, direction, &identity_b);
            records += mine_node_for_anchor(&mut self.database, corpus, b, direction, &identity_a);
        }
        tracing::debug!(from = %identity_a, to = %identity_b, records, "Learned from created link");
        records
    }

    /// Up to `count` ranked suggestions for the connector in `context`.
    ///
    /// # Panics
    ///
    /// If `context` does not name exactly one graph and one connector, or the
    /// connector index is out of range.
    pub fn provide_suggestions<C: Corpus + ?Sized>(
        &mut self,
        corpus: &C,
        context: &SuggestionContext,
        count: usize,
    ) -> Vec<SuggestionResult> {
        assert_eq!(
            context.graphs.len(),
            1,
            "suggestion context must reference exactly one graph"
        );
        assert_eq!(
            context.connectors.len(),
            1,
            "suggestion context must reference exactly one connector"
        );
        let target = context.connectors[0];
        let connectors = corpus.connectors(target.owner);
        assert!(
            target.connector < connectors.len(),
            "connector index {} out of range for {}",
            target.connector,
            target.owner
        );

        let timer = OperationTimer::new("provide_suggestions").with_metadata("owner", target.owner);
        let query = connectors[target.connector].descriptor.clone();
        let direction = Direction::for_query_connector(query.direction);
        let owner = corpus.identity(target.owner);

        let available = find_all_context_paths(corpus, target.owner, direction);
        for path in &available {
            tracing::trace!(path = %path, "Available context path");
        }

        let Some(candidates) = self.database.get(direction, &owner) else {
            tracing::debug!(owner = %owner, %direction, "No predictions for node");
            timer.finish();
            return Vec::new();
        };

        let compatible: Vec<&PredictionRecord> = if self.flags.filter_by_connector_type {
            candidates
                .iter()
                .filter(|record| {
                    is_compatible(&mut self.capabilities, corpus, record, &query, &self.flags)
                })
                .collect()
        } else {
            candidates.iter().collect()
        };

        let scored = score_candidates(compatible, &available, self.flags.use_context_scoring);
        let combined = combine_results(scored);
        let ranked = rank_results(combined, count, self.flags.rank_by_uses_first);

        tracing::debug!(
            owner = %owner,
            title = corpus.title(target.owner).as_deref().unwrap_or(""),
            candidates = candidates.len(),
            returned = ranked.len(),
            "Provided suggestions"
        );
        timer.finish();
        ranked
    }

    /// Write the database to `path`. Failures are logged.
    pub fn save_database(&self, path: &Path) -> bool {
        match persist::save_to_path(&self.database, path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Saved prediction database");
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not save prediction database");
                false
            }
        }
    }

    /// Replace the database with the one at `path`. On any failure the
    /// current database is kept.
    pub fn load_database(&mut self, path: &Path) -> bool {
        match persist::load_from_path(path) {
            Ok(database) => {
                self.database = database;
                let stats = self.database.stats();
                tracing::info!(
                    path = %path.display(),
                    forward_records = stats.forward_records,
                    backward_records = stats.backward_records,
                    "Loaded prediction database"
                );
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load prediction database");
                false
            }
        }
    }
}

fn is_compatible<C: Corpus + ?Sized>(
    capabilities: &mut CapabilityStore,
    corpus: &C,
    record: &PredictionRecord,
    query: &ConnectorDescriptor,
    flags: &SuggestionFlags,
) -> bool {
    match capabilities.find_or_build(&record.prediction, corpus) {
        Some(snapshot) => snapshot.accepts(query, flags.strict_type_detail),
        None => {
            tracing::debug!(
                prediction = %record.prediction,
                policy = ?flags.missing_capability,
                "No capability information for candidate"
            );
            flags.missing_capability == MissingCapabilityPolicy::Include
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{AssetDocument, GraphDocument, MemoryCorpus, NodeDocument};
    use crate::identity::NodeIdentity;

    fn pass_through(id: &str, signature: &str) -> NodeDocument {
        NodeDocument::new(id, signature)
            .input("in", "int")
            .output("out", "int")
    }

    /// a -> b -> c, plus a float-only node d feeding b's second input
    fn chain_corpus() -> MemoryCorpus {
        let graph = GraphDocument::new("Main")
            .node(pass_through("a", "A"))
            .node(pass_through("b", "B").input("extra", "float"))
            .node(pass_through("c", "C"))
            .node(NodeDocument::new("d", "D").output("out", "float"))
            .link("a", "out", "b", "in")
            .link("b", "out", "c", "in")
            .link("d", "out", "b", "extra");
        MemoryCorpus::from_assets([AssetDocument::new("Test").graph(graph)])
    }

    fn query(corpus: &MemoryCorpus, node: &str, connector: &str) -> SuggestionContext {
        let graph = corpus.find_graph("Main").unwrap();
        let owner = corpus.find_node(graph, node).unwrap();
        SuggestionContext::single(owner, corpus.find_connector(owner, connector).unwrap())
    }

    fn names(results: &[SuggestionResult]) -> Vec<&str> {
        results.iter().map(|r| r.prediction.signature()).collect()
    }

    #[test]
    fn test_input_connector_suggests_upstream_node() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        engine.fill_database(&corpus);
        assert!(engine.has_suggestions());

        let results = engine.provide_suggestions(&corpus, &query(&corpus, "b", "in"), 5);
        assert_eq!(names(&results), ["A"]);
        // (A, []) and (A, [C]) against the single live path [C]
        assert_eq!(results[0].context_score, 1.0);
        assert_eq!(results[0].uses_score, 2);
    }

    #[test]
    fn test_type_filter_follows_connector_category() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        engine.fill_database(&corpus);

        // D only offers a float output, so it cannot feed b's int input
        let results = engine.provide_suggestions(&corpus, &query(&corpus, "b", "extra"), 5);
        assert_eq!(names(&results), ["D"]);

        engine.toggle_flag("filter-by-connector-type");
        let unfiltered = engine.provide_suggestions(&corpus, &query(&corpus, "b", "in"), 5);
        assert_eq!(names(&unfiltered), ["A", "D"]);
    }

    #[test]
    fn test_output_connector_suggests_downstream_node() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        engine.fill_database(&corpus);

        let results = engine.provide_suggestions(&corpus, &query(&corpus, "b", "out"), 5);
        assert_eq!(names(&results), ["C"]);
    }

    #[test]
    fn test_flush_leaves_no_suggestions() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        engine.fill_database(&corpus);
        engine.flush();

        assert!(!engine.has_suggestions());
        assert!(engine.capabilities().is_empty());
        assert!(engine
            .provide_suggestions(&corpus, &query(&corpus, "b", "in"), 5)
            .is_empty());
    }

    #[test]
    fn test_missing_capability_policy() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        engine.fill_database(&corpus);
        // a prediction whose template the corpus has never seen
        engine.database.insert(PredictionRecord::new(
            Direction::Backward,
            NodeIdentity::new("C"),
            NodeIdentity::new("Ghost"),
        ));

        let excluded = engine.provide_suggestions(&corpus, &query(&corpus, "c", "in"), 5);
        assert_eq!(names(&excluded), ["B"]);

        engine.set_flags(SuggestionFlags {
            missing_capability: MissingCapabilityPolicy::Include,
            ..engine.flags()
        });
        let included = engine.provide_suggestions(&corpus, &query(&corpus, "c", "in"), 5);
        assert!(names(&included).contains(&"Ghost"));
    }

    #[test]
    fn test_zero_count_returns_nothing() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        engine.fill_database(&corpus);
        assert!(engine
            .provide_suggestions(&corpus, &query(&corpus, "b", "in"), 0)
            .is_empty());
    }

    #[test]
    #[should_panic(expected = "exactly one connector")]
    fn test_context_with_two_connectors_panics() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        let mut context = query(&corpus, "b", "in");
        context.connectors.push(context.connectors[0]);
        engine.provide_suggestions(&corpus, &context, 5);
    }

    #[test]
    #[should_panic(expected = "exactly one graph")]
    fn test_context_without_graph_panics() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        let mut context = query(&corpus, "b", "in");
        context.graphs.clear();
        engine.provide_suggestions(&corpus, &context, 5);
    }

    #[test]
    fn test_created_link_learns_only_that_edge() {
        let mut corpus = chain_corpus();
        let graph = corpus.find_graph("Main").unwrap();
        let a = corpus.find_node(graph, "a").unwrap();
        let c = corpus.find_node(graph, "c").unwrap();
        let mut engine = SuggestionEngine::default();

        corpus.connect(a, "out", c, "in").unwrap();
        let learned = engine.generate_for_created_link(&corpus, a, c);
        assert!(learned > 0);
        assert!(engine
            .database()
            .records(Direction::Forward)
            .chain(engine.database().records(Direction::Backward))
            .all(|r| r.anchor.signature() == "A" || r.anchor.signature() == "C"));

        let results = engine.provide_suggestions(&corpus, &query(&corpus, "a", "out"), 5);
        assert_eq!(names(&results), ["C"]);
    }

    #[test]
    fn test_created_link_respects_learning_flag() {
        let corpus = chain_corpus();
        let graph = corpus.find_graph("Main").unwrap();
        let a = corpus.find_node(graph, "a").unwrap();
        let b = corpus.find_node(graph, "b").unwrap();
        let mut engine = SuggestionEngine::default();

        assert_eq!(engine.toggle_flag("learn-from-created-links"), Some(false));
        assert_eq!(engine.generate_for_created_link(&corpus, a, b), 0);
        assert!(!engine.has_suggestions());
        assert_eq!(engine.toggle_flag("no-such-flag"), None);
    }

    #[test]
    fn test_failed_load_keeps_database() {
        let corpus = chain_corpus();
        let mut engine = SuggestionEngine::default();
        engine.fill_database(&corpus);
        let before = engine.database().clone();

        let dir = tempfile::tempdir().unwrap();
        assert!(!engine.load_database(&dir.path().join("absent.bin")));
        assert_eq!(engine.database(), &before);

        let path = dir.path().join("predictions.bin");
        assert!(engine.save_database(&path));
        let mut fresh = SuggestionEngine::default();
        assert!(fresh.load_database(&path));
        assert_eq!(fresh.database(), &before);
    }
}
