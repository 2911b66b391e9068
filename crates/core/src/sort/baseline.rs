//! Full topological sort of the whole node universe.

use alloc::vec::Vec;

use super::SortPass;
use crate::execution::Slot;
use crate::graph::DependencyGraph;
use crate::order::OrderStore;
use crate::registry::NodeId;

/// Rebuilds the edge set of `graph` from one execution's slots.
///
/// Clears every edge and pass state first, then records each slot, so that
/// pending predecessor counts match the new edge set.
pub fn replay(graph: &mut DependencyGraph, slots: &[Slot]) {
    graph.clear();
    for slot in slots {
        graph.add_relation(slot.pred, slot.succ);
    }
}

/// Sorts every node of `graph` and overwrites `order` with the result.
///
/// `traversal` lists every node once, in the order zero in-degree nodes are
/// queued (registry tree order). The graph must be freshly [`replay`]ed.
///
/// Returns the edges deleted to break cycles; the order is valid for the graph
/// that remains. Time complexity: O(V+E) per cycle broken.
pub fn sort_baseline(
    graph: &mut DependencyGraph,
    order: &mut OrderStore,
    traversal: &[NodeId],
) -> Vec<Slot> {
    order.reset(graph.len());
    SortPass::new(graph, order, traversal, 0).run()
}
