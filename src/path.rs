//! Bounded context paths.

use std::fmt;

use crate::identity::NodeIdentity;

/// Longest context chain recorded or compared.
pub const MAX_CONTEXT_PATH_LENGTH: usize = 3;

/// Ordered chain of node identities leading away from an anchor.
///
/// Never longer than [`MAX_CONTEXT_PATH_LENGTH`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AdjacencyPath {
    nodes: Vec<NodeIdentity>,
}

impl AdjacencyPath {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(MAX_CONTEXT_PATH_LENGTH),
        }
    }

    /// Build a path from identities, dropping anything past the length limit.
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeIdentity>) -> Self {
        let mut path = Self::new();
        for node in nodes {
            if !path.push(node) {
                break;
            }
        }
        path
    }

    /// Append a node. Returns `false` (path unchanged) when already full.
    pub fn push(&mut self, node: NodeIdentity) -> bool {
        if self.is_full() {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// A copy of this path with `node` appended.
    pub fn extended(&self, node: NodeIdentity) -> Self {
        let mut path = self.clone();
        path.push(node);
        path
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= MAX_CONTEXT_PATH_LENGTH
    }

    pub fn nodes(&self) -> &[NodeIdentity] {
        &self.nodes
    }

    /// Similarity of `observed` to this (stored) path, in `[0, 1]`.
    ///
    /// Position-wise matches divided by this path's length; an empty stored
    /// path scores 0.
    pub fn compare_context(&self, observed: &AdjacencyPath) -> f32 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        let matching = self
            .nodes
            .iter()
            .zip(observed.nodes.iter())
            .filter(|(stored, seen)| stored == seen)
            .count();
        matching as f32 / self.nodes.len() as f32
    }

    /// `A >> B >> C`, for logs.
    pub fn path_string(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.signature())
            .collect::<Vec<_>>()
            .join(" >> ")
    }
}

impl fmt::Display for AdjacencyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.path_string())
    }
}
