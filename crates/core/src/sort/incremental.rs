//! Incremental re-linearization of an execution against the previous order.
//!
//! Consecutive executions of a batch usually differ in only a few relation
//! slots. Instead of sorting the whole universe again, the differ:
//!
//! 1. rewrites the edge of every changed slot in place (a slot may change its
//!    successor or its predecessor, never both);
//! 2. checks every slot against the previous order, and if all of them still
//!    hold, keeps that order unchanged;
//! 3. otherwise bounds the invalidated region: `leading` is the smallest
//!    position of a violated slot's successor and `trailing` the largest
//!    position of a violated slot's predecessor;
//! 4. re-sorts only the nodes holding positions in `[leading, trailing]`,
//!    assigning them positions from `leading` onwards.
//!
//! Any edge that leaves the range to an earlier position, or enters it from a
//! later position, would itself be a violated slot whose endpoints widen the
//! range. Nodes before the range therefore precede every range node they are
//! related to, and nodes after it follow them, so their positions stay valid.
//! A cycle in the new edge set contains a violated slot and lies entirely
//! inside the range, where the pass breaks it.

use alloc::vec::Vec;
use core::ops::RangeInclusive;

use super::SortPass;
use crate::error::Error;
use crate::execution::Slot;
use crate::graph::{DependencyGraph, EdgeNotFound};
use crate::order::OrderStore;
use crate::registry::NodeId;

/// Result of diffing one execution into the graph and order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diff {
    /// Every slot already holds under the previous order; nothing was sorted.
    Satisfied,
    /// The positions in `range` were recomputed.
    Resorted {
        range: RangeInclusive<usize>,
        broken: Vec<Slot>,
    },
}

/// Rejects a `current` execution whose slots do not correspond to `previous`.
///
/// # Errors
///
/// Returns [`Error::SlotCount`] if the slot counts differ and
/// [`Error::SlotMismatch`] for the first slot with both endpoints changed.
pub fn check_correspondence(
    execution: usize,
    previous: &[Slot],
    current: &[Slot],
) -> Result<(), Error> {
    if previous.len() != current.len() {
        return Err(Error::SlotCount {
            execution,
            expected: previous.len(),
            found: current.len(),
        });
    }
    for (slot, (&before, &after)) in previous.iter().zip(current).enumerate() {
        if before.pred != after.pred && before.succ != after.succ {
            return Err(Error::SlotMismatch {
                execution,
                slot,
                previous: before,
                current: after,
            });
        }
    }
    Ok(())
}

/// Rewrites the edge of one slot from `previous` to `current`.
///
/// The two slots must share an endpoint. A self-relation has no edge, so a
/// slot turning into or out of one removes or inserts the edge instead.
///
/// # Errors
///
/// Returns [`EdgeNotFound`] if the edge of `previous` is missing.
pub fn rewrite_slot(
    graph: &mut DependencyGraph,
    previous: Slot,
    current: Slot,
) -> Result<(), EdgeNotFound> {
    if previous == current {
        return Ok(());
    }
    match (previous.is_self_relation(), current.is_self_relation()) {
        (true, true) => Ok(()),
        (true, false) => {
            graph.link(current.pred, current.succ);
            Ok(())
        }
        (false, true) => graph.unlink(previous.pred, previous.succ),
        (false, false) if previous.pred == current.pred => {
            graph.replace_successor(previous.pred, previous.succ, current.succ)
        }
        (false, false) => graph.replace_predecessor(previous.pred, previous.succ, current.pred),
    }
}

/// Smallest position range containing every slot that `order` violates.
#[must_use]
pub fn find_boundary(order: &OrderStore, slots: &[Slot]) -> Option<RangeInclusive<usize>> {
    slots
        .iter()
        .filter(|slot| !order.satisfies(slot.pred, slot.succ))
        .map(|slot| (order.position_of(slot.succ), order.position_of(slot.pred)))
        .reduce(|(leading, trailing), (succ, pred)| (leading.min(succ), trailing.max(pred)))
        .map(|(leading, trailing)| leading..=trailing)
}

/// Re-sorts the nodes holding positions in `range`, leaving all others alone.
///
/// Returns the edges deleted to break cycles inside the range.
pub fn resort_range(
    graph: &mut DependencyGraph,
    order: &mut OrderStore,
    range: RangeInclusive<usize>,
) -> Vec<Slot> {
    let leading = *range.start();
    let scope: Vec<NodeId> = order.range(range).to_vec();

    for &id in &scope {
        graph.reset(id);
    }
    // Only predecessors inside the range are pending: everything before it
    // stays settled.
    for &id in &scope {
        for edge in 0..graph.nodes[id.index()].out.len() {
            let succ = graph.nodes[id.index()].out[edge];
            let target = &mut graph.nodes[succ.index()];
            if !target.settled {
                target.in_degree += 1;
            }
        }
    }

    SortPass::new(graph, order, &scope, leading).run()
}

/// Brings `graph` and `order` from the `previous` execution to `current`.
///
/// `order` must hold a valid order for `previous`, and `graph` the edges of
/// `previous` with every node settled.
///
/// # Errors
///
/// Fails if the executions do not correspond slot by slot, or if the graph
/// does not hold the edges of `previous`. The graph may be partially rewritten
/// when an [`EdgeNotFound`] is returned.
pub fn diff_execution(
    graph: &mut DependencyGraph,
    order: &mut OrderStore,
    execution: usize,
    previous: &[Slot],
    current: &[Slot],
) -> Result<Diff, Error> {
    check_correspondence(execution, previous, current)?;
    for (&before, &after) in previous.iter().zip(current) {
        rewrite_slot(graph, before, after)?;
    }

    let Some(range) = find_boundary(order, current) else {
        return Ok(Diff::Satisfied);
    };
    let broken = resort_range(graph, order, range.clone());
    Ok(Diff::Resorted { range, broken })
}
