//! Command handlers behind the CLI.

pub mod kfold;
pub mod link;
pub mod rebuild;
pub mod stats;
pub mod suggest;

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::corpus::{load_corpus_dir, Corpus, GraphId, MemoryCorpus, NodeRef};
use crate::errors::{AppError, CorpusError};

/// Explicit `--database` wins over the configured path.
pub fn database_path(config: &AppConfig, database: Option<&Path>) -> PathBuf {
    match database {
        Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref()),
        None => config.storage.resolved_database_path(),
    }
}

pub fn load_corpus(root: &Path) -> Result<MemoryCorpus, AppError> {
    Ok(load_corpus_dir(root)?)
}

pub fn locate_graph(corpus: &MemoryCorpus, graph: &str) -> Result<GraphId, AppError> {
    corpus
        .find_graph(graph)
        .ok_or_else(|| CorpusError::UnknownGraph(graph.to_string()).into())
}

pub fn locate_node(corpus: &MemoryCorpus, graph: GraphId, node: &str) -> Result<NodeRef, AppError> {
    corpus.find_node(graph, node).ok_or_else(|| {
        CorpusError::UnknownNode {
            graph: corpus.graph_name(graph),
            node: node.to_string(),
        }
        .into()
    })
}

pub fn locate_connector(
    corpus: &MemoryCorpus,
    node: NodeRef,
    connector: &str,
) -> Result<usize, AppError> {
    corpus.find_connector(node, connector).ok_or_else(|| {
        CorpusError::UnknownConnector {
            node: corpus.node_id(node).to_string(),
            connector: connector.to_string(),
        }
        .into()
    })
}
