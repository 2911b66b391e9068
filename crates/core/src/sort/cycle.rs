//! Cycle location and breaking for a stalled sort pass.
//!
//! When the zero in-degree queue drains early, every unsettled scope node
//! still has an unsettled predecessor. Walking predecessors backwards from any
//! such node must therefore revisit a node eventually, and the revisit closes
//! a cycle.
//!
//! Scope order is unrelated to the edges, so the walk is assembled over
//! repeated scans of the scope: the first blocked node becomes the head of a
//! *discovery chain*, and any blocked node with an edge to the current head is
//! pushed in front of it (its chain link pointing at the old head). When a node
//! that is already on the chain turns out to have an edge to the head, the
//! chain from the head back to that node plus that edge form a cycle. The edge
//! is deleted, the target's pending count drops by one, and the chain is
//! dismantled.
//!
//! The deleted edge is simply the first one found; no attempt is made to pick
//! a canonical edge of the cycle.

use crate::execution::Slot;
use crate::graph::DependencyGraph;
use crate::registry::NodeId;

/// Deletes one edge of a cycle among the unsettled nodes of `scope`.
///
/// Must only be called when at least one scope node is unsettled and no
/// unsettled scope node is free of pending predecessors.
pub(crate) fn break_cycle(graph: &mut DependencyGraph, scope: &[NodeId]) -> Slot {
    let mut head: Option<NodeId> = None;
    loop {
        for &id in scope {
            if let Some(edge) = visit(graph, id, &mut head) {
                tracing::trace!(pred = %edge.pred, succ = %edge.succ, "cycle edge deleted");
                return edge;
            }
        }
    }
}

fn visit(graph: &mut DependencyGraph, id: NodeId, head: &mut Option<NodeId>) -> Option<Slot> {
    let node = &graph.nodes[id.index()];
    if node.settled || node.in_degree == 0 {
        return None;
    }

    let Some(target) = *head else {
        *head = Some(id);
        return None;
    };

    let edge = node.out.iter().position(|&succ| succ == target)?;
    if node.chain.is_none() {
        graph.nodes[id.index()].chain = Some(target);
        *head = Some(id);
        return None;
    }

    graph.nodes[id.index()].out.remove(edge);
    graph.nodes[target.index()].in_degree -= 1;

    let mut cursor = Some(target);
    while let Some(link) = cursor {
        cursor = graph.nodes[link.index()].chain.take();
    }
    *head = None;

    Some(Slot::new(id, target))
}
