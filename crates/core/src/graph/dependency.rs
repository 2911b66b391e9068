use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use super::error::EdgeNotFound;
use crate::registry::NodeId;

/// Per-node sort state and out-edges.
#[derive(Debug, Default, Clone)]
pub(crate) struct Node {
    /// Successors this node must precede. Duplicates are kept: one entry per
    /// relation that produced the edge.
    pub(crate) out: Vec<NodeId>,
    /// Predecessor entries not yet settled in the active pass.
    pub(crate) in_degree: usize,
    /// Whether the node has been given its position in the active pass.
    pub(crate) settled: bool,
    /// Discovery-chain link used while hunting for a cycle.
    pub(crate) chain: Option<NodeId>,
}

/// Dependency graph over a fixed node universe.
///
/// Nodes are addressed by the [`NodeId`]s handed out by the
/// [`LabelRegistry`](crate::registry::LabelRegistry). Besides the edges, each
/// node carries the transient state of the sort pass in progress: its pending
/// predecessor count and whether it has been settled.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    pub(crate) nodes: Vec<Node>,
}

impl DependencyGraph {
    /// A graph of `len` isolated nodes.
    #[must_use]
    pub fn with_nodes(len: usize) -> Self {
        Self {
            nodes: vec![Node::default(); len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Records that `pred` precedes `succ`.
    ///
    /// Self-relations are ignored. Otherwise the edge is appended to `pred`'s
    /// out-edges and counted as a pending predecessor of `succ`.
    pub fn add_relation(&mut self, pred: NodeId, succ: NodeId) {
        if pred != succ {
            self.nodes[pred.index()].out.push(succ);
            self.nodes[succ.index()].in_degree += 1;
        }
    }

    /// Drops every edge and resets every node's pass state.
    pub fn clear(&mut self) {
        for node in &mut self.nodes {
            node.out.clear();
            Self::reset_node(node);
        }
    }

    /// Rewrites the edge `pred -> old_succ` into `pred -> new_succ`.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeNotFound`] if `pred` has no edge to `old_succ`.
    pub fn replace_successor(
        &mut self,
        pred: NodeId,
        old_succ: NodeId,
        new_succ: NodeId,
    ) -> Result<(), EdgeNotFound> {
        let slot = self.edge_index(pred, old_succ)?;
        self.nodes[pred.index()].out[slot] = new_succ;
        Ok(())
    }

    /// Moves the edge `old_pred -> succ` so that it leaves `new_pred` instead.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeNotFound`] if `old_pred` has no edge to `succ`.
    pub fn replace_predecessor(
        &mut self,
        old_pred: NodeId,
        succ: NodeId,
        new_pred: NodeId,
    ) -> Result<(), EdgeNotFound> {
        self.unlink(old_pred, succ)?;
        self.link(new_pred, succ);
        Ok(())
    }

    /// Successors of `id`, one entry per edge.
    #[must_use]
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].out
    }

    /// Pending predecessor count of `id` in the active pass.
    #[must_use]
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.nodes[id.index()].in_degree
    }

    #[must_use]
    pub fn is_settled(&self, id: NodeId) -> bool {
        self.nodes[id.index()].settled
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.out.len()).sum()
    }

    /// Returns `true` if the edge set has no cycle.
    ///
    /// Runs Kahn's algorithm on private counters, so the pass state is left
    /// untouched. Time complexity: O(V+E).
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for node in &self.nodes {
            for succ in &node.out {
                in_degree[succ.index()] += 1;
            }
        }

        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(index, _)| index)
            .collect();

        let mut visited = 0;
        while let Some(index) = queue.pop_front() {
            visited += 1;
            for succ in &self.nodes[index].out {
                let degree = &mut in_degree[succ.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(succ.index());
                }
            }
        }
        visited == self.nodes.len()
    }

    /// Adds the edge without counting it as pending.
    pub(crate) fn link(&mut self, pred: NodeId, succ: NodeId) {
        self.nodes[pred.index()].out.push(succ);
    }

    /// Removes one `pred -> succ` edge without touching pending counts.
    pub(crate) fn unlink(&mut self, pred: NodeId, succ: NodeId) -> Result<(), EdgeNotFound> {
        let slot = self.edge_index(pred, succ)?;
        self.nodes[pred.index()].out.remove(slot);
        Ok(())
    }

    /// Returns `id` to the unsettled state with no pending predecessors.
    pub(crate) fn reset(&mut self, id: NodeId) {
        Self::reset_node(&mut self.nodes[id.index()]);
    }

    fn reset_node(node: &mut Node) {
        node.in_degree = 0;
        node.settled = false;
        node.chain = None;
    }

    fn edge_index(&self, pred: NodeId, succ: NodeId) -> Result<usize, EdgeNotFound> {
        self.nodes[pred.index()]
            .out
            .iter()
            .position(|&target| target == succ)
            .ok_or(EdgeNotFound { pred, succ })
    }
}
