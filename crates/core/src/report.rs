use alloc::string::String;
use alloc::vec::Vec;

use crate::execution::Relation;
use crate::session::Pass;

/// Per-execution result with labels resolved.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub execution: usize,
    pub pass: Pass,
    /// No cycle was found among the execution's relations.
    pub ok: bool,
    /// Settled total order, as labels in position order.
    pub order: Vec<String>,
    /// Relations deleted to break cycles.
    pub broken: Vec<Relation<String>>,
}

/// Results for a whole execution sequence.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub executions: Vec<ExecutionReport>,
}

impl Report {
    /// `true` if every execution was consistent.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.executions.iter().all(|execution| execution.ok)
    }

    /// Executions in which a cycle was found.
    pub fn failed(&self) -> impl Iterator<Item = &ExecutionReport> {
        self.executions.iter().filter(|execution| !execution.ok)
    }
}
