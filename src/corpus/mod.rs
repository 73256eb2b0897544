//! Host graph model, consumed through the [`Corpus`] trait.
//!
//! The engine never owns graphs. It walks them through handles
//! ([`GraphId`], [`NodeRef`]) and reads connectors as plain data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::NodeIdentity;

pub mod document;
pub mod loader;
pub mod memory;

pub use document::{
    AssetDocument, ConnectorDocument, EndpointDocument, GraphDocument, LinkDocument, NodeDocument,
    TemplateDocument,
};
pub use loader::load_corpus_dir;
pub use memory::MemoryCorpus;

/// Handle to one graph of a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(pub usize);

/// Handle to one node instance inside a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    pub graph: GraphId,
    pub index: usize,
}

impl NodeRef {
    pub fn new(graph: GraphId, index: usize) -> Self {
        Self { graph, index }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}#{}", self.graph.0, self.index)
    }
}

/// Side of a node a connector sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorDirection {
    Input,
    Output,
}

impl ConnectorDirection {
    pub fn complementary(self) -> Self {
        match self {
            ConnectorDirection::Input => ConnectorDirection::Output,
            ConnectorDirection::Output => ConnectorDirection::Input,
        }
    }
}

/// Typed description of a connector, independent of any link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    pub direction: ConnectorDirection,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ConnectorDescriptor {
    pub fn new(direction: ConnectorDirection, category: impl Into<String>) -> Self {
        Self {
            direction,
            category: category.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A connector on a live node instance, with its current links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    pub name: String,
    pub descriptor: ConnectorDescriptor,
    pub hidden: bool,
    pub connectable: bool,
    /// Nodes on the far side of each link.
    pub links: Vec<NodeRef>,
}

impl Connector {
    pub fn direction(&self) -> ConnectorDirection {
        self.descriptor.direction
    }

    /// Visible and connectable; only these are followed during traversal.
    pub fn is_traversable(&self) -> bool {
        !self.hidden && self.connectable
    }
}

/// Read-only view of a collection of graphs.
///
/// Callers must not mutate the underlying graphs while a mining pass or a
/// query is in progress.
pub trait Corpus {
    /// Every editable graph, across all assets.
    fn graphs(&self) -> Vec<GraphId>;

    fn nodes(&self, graph: GraphId) -> Vec<NodeRef>;

    fn connectors(&self, node: NodeRef) -> &[Connector];

    /// Template identity, shared by every instance of the same template.
    fn identity(&self, node: NodeRef) -> NodeIdentity;

    /// Connector descriptors of the node's template.
    ///
    /// Idempotent. Falls back to the template's default connectors when the
    /// instance has none materialized; `None` when the template is unknown.
    fn materialize_connectors(&self, node: NodeRef) -> Option<Vec<ConnectorDescriptor>>;

    /// Display title, for logs only.
    fn title(&self, _node: NodeRef) -> Option<String> {
        None
    }

    fn graph_name(&self, graph: GraphId) -> String {
        format!("graph#{}", graph.0)
    }
}
