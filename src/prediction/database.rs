use serde::Serialize;
use std::collections::HashMap;

use super::{Direction, PredictionRecord};
use crate::identity::NodeIdentity;

type PredictionMap = HashMap<NodeIdentity, Vec<PredictionRecord>>;

/// Forward and backward indexes from anchor identity to learned records.
///
/// Within one direction and anchor, no two records describe the same fact:
/// inserting a duplicate fact adds to the stored use count instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionDatabase {
    forward: PredictionMap,
    backward: PredictionMap,
}

/// Size summary of a database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub forward_anchors: usize,
    pub forward_records: usize,
    pub backward_anchors: usize,
    pub backward_records: usize,
    pub total_uses: u64,
}

impl PredictionDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the record's own direction and anchor, merging with an
    /// existing identical fact.
    pub fn insert(&mut self, record: PredictionRecord) {
        let predictions = self
            .map_mut(record.direction)
            .entry(record.anchor.clone())
            .or_default();
        match predictions.iter_mut().find(|r| r.is_same_fact(&record)) {
            Some(existing) => {
                existing.num_uses = existing.num_uses.saturating_add(record.num_uses);
            }
            None => predictions.push(record),
        }
    }

    pub fn get(&self, direction: Direction, anchor: &NodeIdentity) -> Option<&[PredictionRecord]> {
        self.map(direction).get(anchor).map(Vec::as_slice)
    }

    /// Clear both directions.
    pub fn flush(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }

    /// Anchors of one direction, sorted by signature.
    pub fn anchors(&self, direction: Direction) -> Vec<&NodeIdentity> {
        let mut keys: Vec<_> = self.map(direction).keys().collect();
        keys.sort();
        keys
    }

    /// `(anchor, records)` pairs of one direction, sorted by anchor signature.
    pub fn entries(&self, direction: Direction) -> Vec<(&NodeIdentity, &[PredictionRecord])> {
        let mut entries: Vec<_> = self
            .map(direction)
            .iter()
            .map(|(k, v)| (k, v.as_slice()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn records(&self, direction: Direction) -> impl Iterator<Item = &PredictionRecord> {
        self.map(direction).values().flatten()
    }

    pub fn stats(&self) -> DatabaseStats {
        let count = |map: &PredictionMap| map.values().map(Vec::len).sum::<usize>();
        let uses = |map: &PredictionMap| {
            map.values()
                .flatten()
                .map(|r| u64::from(r.num_uses))
                .sum::<u64>()
        };
        DatabaseStats {
            forward_anchors: self.forward.len(),
            forward_records: count(&self.forward),
            backward_anchors: self.backward.len(),
            backward_records: count(&self.backward),
            total_uses: uses(&self.forward) + uses(&self.backward),
        }
    }

    fn map(&self, direction: Direction) -> &PredictionMap {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    fn map_mut(&mut self, direction: Direction) -> &mut PredictionMap {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        }
    }
}
