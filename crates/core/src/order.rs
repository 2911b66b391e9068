//! Position assignments produced by the sorters.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::RangeInclusive;

use crate::registry::NodeId;

/// Total order of the node universe, kept across executions.
///
/// Holds both directions of the mapping: position to node and node to
/// position. The store is empty until the first sort pass fills it; after that
/// every position holds exactly one node.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrderStore {
    nodes: Vec<NodeId>,
    positions: Vec<usize>,
}

impl OrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Sizes the store for a universe of `len` nodes, discarding any order.
    pub(crate) fn reset(&mut self, len: usize) {
        self.nodes = vec![NodeId::default(); len];
        self.positions = vec![0; len];
    }

    /// Puts `id` at `position`.
    pub(crate) fn place(&mut self, id: NodeId, position: usize) {
        self.nodes[position] = id;
        self.positions[id.index()] = position;
    }

    /// Position of `id`, or `None` before the first pass.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.positions.get(id.index()).copied()
    }

    /// Position of a node known to be placed.
    pub(crate) fn position_of(&self, id: NodeId) -> usize {
        self.positions[id.index()]
    }

    /// Node at `position`.
    #[must_use]
    pub fn node_at(&self, position: usize) -> Option<NodeId> {
        self.nodes.get(position).copied()
    }

    /// Nodes in position order.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Nodes currently holding a position in `range`.
    #[must_use]
    pub fn range(&self, range: RangeInclusive<usize>) -> &[NodeId] {
        &self.nodes[range]
    }

    /// Returns `true` if `pred` is placed strictly before `succ`.
    ///
    /// A self-relation is trivially satisfied, since it never becomes an edge.
    #[must_use]
    pub fn satisfies(&self, pred: NodeId, succ: NodeId) -> bool {
        pred == succ || self.position_of(pred) < self.position_of(succ)
    }
}
