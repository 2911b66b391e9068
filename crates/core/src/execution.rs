//! Relations as read from a trace, and their interned form.

use alloc::vec::Vec;

use crate::registry::{LabelRegistry, NodeId};

/// "`pred` happens before `succ`", over raw labels.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relation<L> {
    pub pred: L,
    pub succ: L,
}

impl<L> Relation<L> {
    pub const fn new(pred: L, succ: L) -> Self {
        Self { pred, succ }
    }
}

impl<L> From<(L, L)> for Relation<L> {
    fn from((pred, succ): (L, L)) -> Self {
        Self { pred, succ }
    }
}

/// One observed or hypothesized run: relation slots in order.
///
/// Slot `k` of an execution corresponds structurally to slot `k` of the
/// execution before it.
pub type Execution<L> = Vec<Relation<L>>;

/// A relation slot with both endpoints interned.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub pred: NodeId,
    pub succ: NodeId,
}

impl Slot {
    #[must_use]
    pub const fn new(pred: NodeId, succ: NodeId) -> Self {
        Self { pred, succ }
    }

    #[must_use]
    pub fn is_self_relation(&self) -> bool {
        self.pred == self.succ
    }
}

/// Interns every label of `execution`, in reading order.
pub fn intern_execution<L>(registry: &mut LabelRegistry, execution: &[Relation<L>]) -> Vec<Slot>
where
    L: AsRef<str>,
{
    execution
        .iter()
        .map(|relation| {
            let pred = registry.intern(relation.pred.as_ref());
            let succ = registry.intern(relation.succ.as_ref());
            Slot::new(pred, succ)
        })
        .collect()
}
