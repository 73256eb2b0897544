//! Corpus traversal: turning live graphs into prediction records, and
//! enumerating the context around a node at query time.

use super::{Direction, PredictionDatabase, PredictionRecord};
use crate::corpus::{Corpus, GraphId, NodeRef};
use crate::identity::NodeIdentity;
use crate::path::{AdjacencyPath, MAX_CONTEXT_PATH_LENGTH};

/// Counts from one mining pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MiningSummary {
    pub graphs: usize,
    pub nodes: usize,
    pub records: usize,
}

/// Immediate neighbours of `node`, following only visible, connectable
/// connectors on the side `direction` explores.
pub fn neighbors_in_direction<C: Corpus + ?Sized>(
    corpus: &C,
    node: NodeRef,
    direction: Direction,
) -> Vec<NodeRef> {
    let side = direction.explored_connectors();
    corpus
        .connectors(node)
        .iter()
        .filter(|c| c.direction() == side && c.is_traversable())
        .flat_map(|c| c.links.iter().copied())
        .collect()
}

/// Every record `node` contributes in `direction`.
///
/// One record per immediate neighbour with an empty context, then one more
/// per node reached beyond that neighbour, up to the context length limit.
pub fn prediction_records_for_node<C: Corpus + ?Sized>(
    corpus: &C,
    node: NodeRef,
    direction: Direction,
) -> Vec<PredictionRecord> {
    let prediction = corpus.identity(node);
    let mut results = Vec::new();

    for anchor in neighbors_in_direction(corpus, node, direction) {
        let record = PredictionRecord::new(direction, corpus.identity(anchor), prediction.clone());
        results.push(record.clone());
        extend_context(corpus, anchor, direction, &record, &mut results, 0);
    }

    results
}

fn extend_context<C: Corpus + ?Sized>(
    corpus: &C,
    current: NodeRef,
    direction: Direction,
    parent: &PredictionRecord,
    results: &mut Vec<PredictionRecord>,
    depth: usize,
) {
    if depth >= MAX_CONTEXT_PATH_LENGTH {
        return;
    }
    for child in neighbors_in_direction(corpus, current, direction) {
        let mut record = parent.clone();
        record.context.push(corpus.identity(child));
        results.push(record.clone());
        extend_context(corpus, child, direction, &record, results, depth + 1);
    }
}

/// Every complete context branch leading away from `node`.
///
/// A branch ends where the walk runs out of neighbours or reaches the
/// length limit. A node with no neighbours yields one empty path.
pub fn find_all_context_paths<C: Corpus + ?Sized>(
    corpus: &C,
    node: NodeRef,
    direction: Direction,
) -> Vec<AdjacencyPath> {
    let mut results = Vec::new();
    collect_context_paths(corpus, node, direction, AdjacencyPath::new(), &mut results);
    results
}

fn collect_context_paths<C: Corpus + ?Sized>(
    corpus: &C,
    node: NodeRef,
    direction: Direction,
    current: AdjacencyPath,
    results: &mut Vec<AdjacencyPath>,
) {
    if current.is_full() {
        results.push(current);
        return;
    }
    let children = neighbors_in_direction(corpus, node, direction);
    if children.is_empty() {
        results.push(current);
        return;
    }
    for child in children {
        let path = current.extended(corpus.identity(child));
        collect_context_paths(corpus, child, direction, path, results);
    }
}

/// Mine one node in one direction. Returns the number of records inserted.
pub fn mine_node<C: Corpus + ?Sized>(
    database: &mut PredictionDatabase,
    corpus: &C,
    node: NodeRef,
    direction: Direction,
) -> usize {
    let records = prediction_records_for_node(corpus, node, direction);
    let count = records.len();
    for record in records {
        database.insert(record);
    }
    count
}

/// Mine one node, keeping only records anchored on `anchor`.
pub fn mine_node_for_anchor<C: Corpus + ?Sized>(
    database: &mut PredictionDatabase,
    corpus: &C,
    node: NodeRef,
    direction: Direction,
    anchor: &NodeIdentity,
) -> usize {
    let mut count = 0;
    for record in prediction_records_for_node(corpus, node, direction) {
        if &record.anchor == anchor {
            database.insert(record);
            count += 1;
        }
    }
    count
}

pub fn mine_graph<C: Corpus + ?Sized>(
    database: &mut PredictionDatabase,
    corpus: &C,
    graph: GraphId,
) -> MiningSummary {
    let mut summary = MiningSummary {
        graphs: 1,
        ..Default::default()
    };
    for node in corpus.nodes(graph) {
        summary.nodes += 1;
        for direction in Direction::ALL {
            summary.records += mine_node(database, corpus, node, direction);
        }
    }
    tracing::trace!(
        graph = %corpus.graph_name(graph),
        nodes = summary.nodes,
        records = summary.records,
        "Mined graph"
    );
    summary
}

/// Mine every editable graph of the corpus.
pub fn mine_corpus<C: Corpus + ?Sized>(
    database: &mut PredictionDatabase,
    corpus: &C,
) -> MiningSummary {
    let mut summary = MiningSummary::default();
    for graph in corpus.graphs() {
        let graph_summary = mine_graph(database, corpus, graph);
        summary.graphs += graph_summary.graphs;
        summary.nodes += graph_summary.nodes;
        summary.records += graph_summary.records;
    }
    summary
}
