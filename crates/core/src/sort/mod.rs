//! Topological sorting over the dependency graph.
//!
//! Both sorters share one engine, [`SortPass`], which is Knuth's Algorithm T
//! (Kahn's algorithm) restricted to a *scope*: an ordered list of nodes whose
//! positions are being (re)computed, and the first position to hand out.
//!
//! - The [`baseline`] sorter runs a pass over the whole universe, scoped in
//!   registry tree order, starting at position 0.
//! - The [`incremental`] differ runs a pass over the nodes of the invalidated
//!   position range, scoped in their previous position order, starting at the
//!   range's leading position. Nodes outside the scope stay settled and keep
//!   their positions.
//!
//! # Pass
//!
//! 1. Scan the scope for unsettled nodes with no pending predecessor and
//!    append them to a FIFO queue, in scope order.
//! 2. Pop the queue front, give it the next position, settle it, and release
//!    its unsettled successors; a successor whose count drops to zero joins
//!    the queue.
//! 3. If the queue drains while scope nodes are still unsettled, those nodes
//!    contain a cycle. One of its edges is deleted (see [`cycle`]) and the
//!    pass resumes at step 1.
//!
//! The pass always settles the entire scope. Deleted edges are returned so the
//! caller can report the execution as failed.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::execution::Slot;
use crate::graph::DependencyGraph;
use crate::order::OrderStore;
use crate::registry::NodeId;

pub mod baseline;
pub mod cycle;
pub mod incremental;

pub use baseline::{replay, sort_baseline};
pub use incremental::{diff_execution, Diff};

pub(crate) struct SortPass<'a> {
    graph: &'a mut DependencyGraph,
    order: &'a mut OrderStore,
    scope: &'a [NodeId],
    next_position: usize,
    unsettled: usize,
    queue: VecDeque<NodeId>,
}

impl<'a> SortPass<'a> {
    /// Prepares a pass over `scope`.
    ///
    /// Every scope node must be unsettled and carry its pending predecessor
    /// count; every node outside the scope must be settled.
    pub(crate) fn new(
        graph: &'a mut DependencyGraph,
        order: &'a mut OrderStore,
        scope: &'a [NodeId],
        first_position: usize,
    ) -> Self {
        Self {
            graph,
            order,
            scope,
            next_position: first_position,
            unsettled: scope.len(),
            queue: VecDeque::new(),
        }
    }

    /// Settles the whole scope, returning the edges deleted to break cycles.
    pub(crate) fn run(mut self) -> Vec<Slot> {
        let mut broken = Vec::new();
        while self.unsettled > 0 {
            self.scan_zeros();
            self.drain_queue();
            if self.unsettled > 0 {
                broken.push(cycle::break_cycle(self.graph, self.scope));
            }
        }
        broken
    }

    fn scan_zeros(&mut self) {
        for &id in self.scope {
            let node = &self.graph.nodes[id.index()];
            if !node.settled && node.in_degree == 0 {
                self.queue.push_back(id);
            }
        }
    }

    fn drain_queue(&mut self) {
        while let Some(id) = self.queue.pop_front() {
            self.order.place(id, self.next_position);
            self.next_position += 1;
            self.unsettled -= 1;
            self.graph.nodes[id.index()].settled = true;

            for edge in 0..self.graph.nodes[id.index()].out.len() {
                let succ = self.graph.nodes[id.index()].out[edge];
                let target = &mut self.graph.nodes[succ.index()];
                if target.settled {
                    continue;
                }
                target.in_degree -= 1;
                if target.in_degree == 0 {
                    self.queue.push_back(succ);
                }
            }
        }
    }
}
