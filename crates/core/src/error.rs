use core::fmt;

use derive_more::From;

use crate::execution::Slot;
use crate::graph::error::EdgeNotFound;

/// Structural errors that abort processing of an execution sequence.
///
/// Cycles are not errors: they are recovered from and reported in the
/// execution's [`Outcome`](crate::session::Outcome).
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Error {
    /// An execution does not keep the slot count of the one before it.
    SlotCount {
        execution: usize,
        expected: usize,
        found: usize,
    },
    /// Both endpoints of a slot changed between consecutive executions.
    SlotMismatch {
        execution: usize,
        slot: usize,
        previous: Slot,
        current: Slot,
    },
    /// The graph lost an edge that a slot still refers to.
    #[from]
    Graph(EdgeNotFound),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotCount {
                execution,
                expected,
                found,
            } => write!(
                f,
                "execution {execution} has {found} relation slots, expected {expected}"
            ),
            Self::SlotMismatch {
                execution,
                slot,
                previous,
                current,
            } => write!(
                f,
                "execution {execution} slot {slot} changed both endpoints ({} -> {} became {} -> {})",
                previous.pred, previous.succ, current.pred, current.succ
            ),
            Self::Graph(missing) => missing.fmt(f),
        }
    }
}

impl core::error::Error for Error {}
