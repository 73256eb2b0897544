//! Per-template connector capabilities, used to drop suggestions that could
//! not be wired to the connector being dragged.

use std::collections::HashMap;

use crate::corpus::{ConnectorDescriptor, ConnectorDirection, Corpus};
use crate::identity::{NodeIdentity, NodeKey};

/// Connector descriptors of one template, grouped by side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeCapabilitySnapshot {
    inputs: Vec<ConnectorDescriptor>,
    outputs: Vec<ConnectorDescriptor>,
}

impl NodeCapabilitySnapshot {
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ConnectorDescriptor>) -> Self {
        let mut snapshot = Self::default();
        for descriptor in descriptors {
            match descriptor.direction {
                ConnectorDirection::Input => snapshot.inputs.push(descriptor),
                ConnectorDirection::Output => snapshot.outputs.push(descriptor),
            }
        }
        snapshot
    }

    pub fn connectors(&self, direction: ConnectorDirection) -> &[ConnectorDescriptor] {
        match direction {
            ConnectorDirection::Input => &self.inputs,
            ConnectorDirection::Output => &self.outputs,
        }
    }

    /// Whether some connector on the opposite side of `query` shares its type
    /// category (and, when `strict`, its type detail).
    pub fn accepts(&self, query: &ConnectorDescriptor, strict: bool) -> bool {
        self.connectors(query.direction.complementary())
            .iter()
            .any(|c| c.category == query.category && (!strict || c.detail == query.detail))
    }
}

/// Snapshots for every template seen in the current corpus generation.
///
/// Built lazily: the first missed lookup scans the whole corpus once; later
/// misses return `None` until the store is flushed.
#[derive(Debug, Clone, Default)]
pub struct CapabilityStore {
    snapshots: HashMap<NodeKey, NodeCapabilitySnapshot>,
    built: bool,
}

impl CapabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a snapshot for every template not yet known. Returns how many
    /// were added.
    pub fn fill_from<C: Corpus + ?Sized>(&mut self, corpus: &C) -> usize {
        let mut added = 0;
        let mut unresolved = 0;
        for graph in corpus.graphs() {
            for node in corpus.nodes(graph) {
                let key = corpus.identity(node).key();
                if self.snapshots.contains_key(&key) {
                    continue;
                }
                match corpus.materialize_connectors(node) {
                    Some(descriptors) => {
                        self.snapshots
                            .insert(key, NodeCapabilitySnapshot::from_descriptors(descriptors));
                        added += 1;
                    }
                    None => {
                        unresolved += 1;
                        tracing::debug!(
                            node = %corpus.identity(node),
                            "Could not resolve template connectors"
                        );
                    }
                }
            }
        }
        self.built = true;
        tracing::debug!(
            added,
            unresolved,
            total = self.snapshots.len(),
            "Captured node capabilities"
        );
        added
    }

    pub fn find(&self, identity: &NodeIdentity) -> Option<&NodeCapabilitySnapshot> {
        self.snapshots.get(&identity.key())
    }

    /// Look up `identity`, building the store from `corpus` on the first miss.
    pub fn find_or_build<C: Corpus + ?Sized>(
        &mut self,
        identity: &NodeIdentity,
        corpus: &C,
    ) -> Option<&NodeCapabilitySnapshot> {
        if !self.built && !self.snapshots.contains_key(&identity.key()) {
            self.fill_from(corpus);
        }
        self.snapshots.get(&identity.key())
    }

    pub fn insert(&mut self, identity: &NodeIdentity, snapshot: NodeCapabilitySnapshot) {
        self.snapshots.insert(identity.key(), snapshot);
    }

    /// Drop every snapshot and the built flag.
    pub fn flush(&mut self) {
        self.snapshots.clear();
        self.built = false;
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
