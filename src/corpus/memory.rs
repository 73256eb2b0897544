//! In-memory [`Corpus`] built from [`AssetDocument`]s.

use std::collections::{HashMap, HashSet};

use super::{
    AssetDocument, Connector, ConnectorDescriptor, ConnectorDirection, Corpus, GraphDocument,
    GraphId, NodeRef,
};
use crate::errors::CorpusError;
use crate::identity::NodeIdentity;

#[derive(Debug, Clone)]
struct MemoryNode {
    id: String,
    identity: NodeIdentity,
    title: Option<String>,
    connectors: Vec<Connector>,
}

#[derive(Debug, Clone)]
struct MemoryGraph {
    asset: String,
    name: String,
    editable: bool,
    nodes: Vec<MemoryNode>,
    by_id: HashMap<String, usize>,
    /// `(from node, from slot, to node, to slot)` of every link.
    wires: HashSet<(usize, usize, usize, usize)>,
}

/// Owns a set of resolved graphs.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    graphs: Vec<MemoryGraph>,
    templates: HashMap<NodeIdentity, Vec<ConnectorDescriptor>>,
    skipped: usize,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus, logging and skipping any invalid nodes or links.
    pub fn from_assets(assets: impl IntoIterator<Item = AssetDocument>) -> Self {
        let mut corpus = Self::new();
        for asset in assets {
            corpus.add_asset(asset);
        }
        corpus
    }

    /// Add one asset. Returns the problems that were skipped.
    pub fn add_asset(&mut self, asset: AssetDocument) -> Vec<CorpusError> {
        let mut issues = Vec::new();

        for template in &asset.templates {
            let descriptors = template.connectors.iter().map(|c| c.descriptor()).collect();
            self.templates
                .insert(NodeIdentity::new(&template.signature), descriptors);
        }

        for graph in asset.graphs {
            let graph_issues = self.add_graph(&asset.name, graph);
            issues.extend(graph_issues);
        }

        for issue in &issues {
            tracing::warn!(asset = %asset.name, "Skipped corpus entry: {issue}");
        }
        self.skipped += issues.len();
        issues
    }

    fn add_graph(&mut self, asset: &str, doc: GraphDocument) -> Vec<CorpusError> {
        let mut issues = Vec::new();
        let mut graph = MemoryGraph {
            asset: asset.to_string(),
            name: doc.name.clone(),
            editable: doc.editable,
            nodes: Vec::with_capacity(doc.nodes.len()),
            by_id: HashMap::new(),
            wires: HashSet::new(),
        };

        for node in doc.nodes {
            if graph.by_id.contains_key(&node.id) {
                issues.push(CorpusError::DuplicateNode {
                    graph: doc.name.clone(),
                    node: node.id,
                });
                continue;
            }
            let connectors = node
                .connectors
                .iter()
                .map(|c| Connector {
                    name: c.name.clone(),
                    descriptor: c.descriptor(),
                    hidden: c.hidden,
                    connectable: c.connectable,
                    links: Vec::new(),
                })
                .collect();
            graph.by_id.insert(node.id.clone(), graph.nodes.len());
            graph.nodes.push(MemoryNode {
                id: node.id,
                identity: NodeIdentity::new(&node.signature),
                title: node.title,
                connectors,
            });
        }

        let graph_id = GraphId(self.graphs.len());
        self.graphs.push(graph);

        for link in doc.links {
            let resolved = self
                .resolve_endpoint(graph_id, &link.from.node, &link.from.connector)
                .and_then(|from| {
                    self.resolve_endpoint(graph_id, &link.to.node, &link.to.connector)
                        .map(|to| (from, to))
                });
            match resolved {
                Ok(((from, from_slot), (to, to_slot))) => {
                    if let Err(e) = self.link_slots(from, from_slot, to, to_slot) {
                        issues.push(e);
                    }
                }
                Err(e) => issues.push(e),
            }
        }

        issues
    }

    fn resolve_endpoint(
        &self,
        graph: GraphId,
        node_id: &str,
        connector: &str,
    ) -> Result<(NodeRef, usize), CorpusError> {
        let node = self
            .find_node(graph, node_id)
            .ok_or_else(|| CorpusError::UnknownNode {
                graph: self.graphs[graph.0].name.clone(),
                node: node_id.to_string(),
            })?;
        let slot = self
            .find_connector(node, connector)
            .ok_or_else(|| CorpusError::UnknownConnector {
                node: node_id.to_string(),
                connector: connector.to_string(),
            })?;
        Ok((node, slot))
    }

    fn link_slots(
        &mut self,
        from: NodeRef,
        from_slot: usize,
        to: NodeRef,
        to_slot: usize,
    ) -> Result<(), CorpusError> {
        let from_direction = self.node(from).connectors[from_slot].direction();
        let to_direction = self.node(to).connectors[to_slot].direction();
        if from_direction != ConnectorDirection::Output || to_direction != ConnectorDirection::Input
        {
            return Err(CorpusError::InvalidLink {
                graph: self.graphs[from.graph.0].name.clone(),
                reason: format!(
                    "'{}' -> '{}' must join an output to an input",
                    self.node(from).id,
                    self.node(to).id
                ),
            });
        }

        // one entry per wire, so a node fed twice appears twice on the source
        let wire = (from.index, from_slot, to.index, to_slot);
        if !self.graphs[from.graph.0].wires.insert(wire) {
            return Ok(());
        }
        self.node_mut(from).connectors[from_slot].links.push(to);
        self.node_mut(to).connectors[to_slot].links.push(from);
        Ok(())
    }

    /// Join an output connector of `from` to an input connector of `to`.
    pub fn connect(
        &mut self,
        from: NodeRef,
        from_connector: &str,
        to: NodeRef,
        to_connector: &str,
    ) -> Result<(), CorpusError> {
        if from.graph != to.graph {
            return Err(CorpusError::InvalidLink {
                graph: self.graph_name(from.graph),
                reason: "endpoints live in different graphs".to_string(),
            });
        }
        let (from, from_slot) = self.resolve_endpoint(from.graph, self.node_id(from), from_connector)?;
        let (to, to_slot) = self.resolve_endpoint(to.graph, self.node_id(to), to_connector)?;
        self.link_slots(from, from_slot, to, to_slot)
    }

    /// Look a graph up by `name` or `asset/name`.
    pub fn find_graph(&self, name: &str) -> Option<GraphId> {
        self.graphs
            .iter()
            .position(|g| g.name == name || format!("{}/{}", g.asset, g.name) == name)
            .map(GraphId)
    }

    pub fn find_node(&self, graph: GraphId, id: &str) -> Option<NodeRef> {
        self.graphs
            .get(graph.0)?
            .by_id
            .get(id)
            .map(|&index| NodeRef::new(graph, index))
    }

    pub fn find_connector(&self, node: NodeRef, name: &str) -> Option<usize> {
        self.node(node)
            .connectors
            .iter()
            .position(|c| c.name == name)
    }

    /// Instance id as written in the source document.
    pub fn node_id(&self, node: NodeRef) -> &str {
        &self.node(node).id
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    pub fn node_count(&self) -> usize {
        self.graphs.iter().map(|g| g.nodes.len()).sum()
    }

    /// Nodes and links dropped while adding assets.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    fn node(&self, node: NodeRef) -> &MemoryNode {
        &self.graphs[node.graph.0].nodes[node.index]
    }

    fn node_mut(&mut self, node: NodeRef) -> &mut MemoryNode {
        &mut self.graphs[node.graph.0].nodes[node.index]
    }
}

impl Corpus for MemoryCorpus {
    fn graphs(&self) -> Vec<GraphId> {
        self.graphs
            .iter()
            .enumerate()
            .filter(|(_, g)| g.editable)
            .map(|(i, _)| GraphId(i))
            .collect()
    }

    fn nodes(&self, graph: GraphId) -> Vec<NodeRef> {
        let count = self.graphs.get(graph.0).map_or(0, |g| g.nodes.len());
        (0..count).map(|i| NodeRef::new(graph, i)).collect()
    }

    fn connectors(&self, node: NodeRef) -> &[Connector] {
        &self.node(node).connectors
    }

    fn identity(&self, node: NodeRef) -> NodeIdentity {
        self.node(node).identity.clone()
    }

    fn materialize_connectors(&self, node: NodeRef) -> Option<Vec<ConnectorDescriptor>> {
        let instance = self.node(node);
        if !instance.connectors.is_empty() {
            return Some(
                instance
                    .connectors
                    .iter()
                    .map(|c| c.descriptor.clone())
                    .collect(),
            );
        }
        let defaults = self.templates.get(&instance.identity)?;
        tracing::debug!(
            node = %instance.identity,
            "Allocating default connectors from template"
        );
        Some(defaults.clone())
    }

    fn title(&self, node: NodeRef) -> Option<String> {
        self.node(node).title.clone()
    }

    fn graph_name(&self, graph: GraphId) -> String {
        self.graphs
            .get(graph.0)
            .map(|g| format!("{}/{}", g.asset, g.name))
            .unwrap_or_else(|| format!("graph#{}", graph.0))
    }
}
