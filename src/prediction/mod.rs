//! Learned adjacency facts and their storage.

use std::fmt;

use crate::corpus::ConnectorDirection;
use crate::identity::NodeIdentity;
use crate::path::AdjacencyPath;

pub mod database;
pub mod mining;
pub mod persist;

pub use database::{DatabaseStats, PredictionDatabase};
pub use persist::DATABASE_FORMAT_VERSION;

/// Which side of a node's connectors a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Follows input connectors, toward the nodes feeding this one.
    Forward,
    /// Follows output connectors, toward the nodes this one feeds.
    Backward,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Forward, Direction::Backward];

    /// Connector side walked when exploring in this direction.
    pub fn explored_connectors(self) -> ConnectorDirection {
        match self {
            Direction::Forward => ConnectorDirection::Input,
            Direction::Backward => ConnectorDirection::Output,
        }
    }

    /// Direction searched when the user drags from a connector on `side`.
    pub fn for_query_connector(side: ConnectorDirection) -> Self {
        match side {
            ConnectorDirection::Input => Direction::Backward,
            ConnectorDirection::Output => Direction::Forward,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Direction::Forward),
            1 => Some(Direction::Backward),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

/// One learned fact.
///
/// Reads as `context -> anchor -> prediction` along `direction`: when
/// `anchor` was reached with `context` behind it, `prediction` was connected
/// to it `num_uses` times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRecord {
    pub direction: Direction,
    pub anchor: NodeIdentity,
    pub prediction: NodeIdentity,
    pub context: AdjacencyPath,
    pub num_uses: u32,
}

impl PredictionRecord {
    pub fn new(direction: Direction, anchor: NodeIdentity, prediction: NodeIdentity) -> Self {
        Self {
            direction,
            anchor,
            prediction,
            context: AdjacencyPath::new(),
            num_uses: 1,
        }
    }

    pub fn with_context(mut self, context: AdjacencyPath) -> Self {
        self.context = context;
        self
    }

    pub fn with_uses(mut self, num_uses: u32) -> Self {
        self.num_uses = num_uses;
        self
    }

    /// Same fact, ignoring the use count.
    pub fn is_same_fact(&self, other: &PredictionRecord) -> bool {
        self.direction == other.direction
            && self.anchor == other.anchor
            && self.prediction == other.prediction
            && self.context == other.context
    }
}
