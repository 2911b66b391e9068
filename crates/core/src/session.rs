//! One execution sequence, processed in order.
//!
//! A [`Session`] owns every piece of mutable state the sorters need: the
//! label registry, the dependency graph, and the order store. Independent
//! sequences get independent sessions and can be processed on separate
//! threads; a single session is strictly sequential, since each execution is
//! diffed against the order left by the one before it.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Error;
use crate::execution::{intern_execution, Execution, Relation, Slot};
use crate::graph::DependencyGraph;
use crate::order::OrderStore;
use crate::registry::{LabelRegistry, NodeId};
use crate::report::{ExecutionReport, Report};
use crate::sort::incremental::check_correspondence;
use crate::sort::{diff_execution, replay, sort_baseline, Diff};

/// How each execution after the first is linearized.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Diff against the previous execution and re-sort only what changed.
    #[default]
    Incremental,
    /// Rebuild the graph and sort the whole universe every time.
    Full,
}

/// How the order of an execution was produced.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pass {
    /// The whole universe was sorted from scratch.
    Baseline,
    /// The previous order already satisfied every relation and was kept.
    Skipped,
    /// Only positions `leading..=trailing` were recomputed.
    Resorted { leading: usize, trailing: usize },
}

/// Result of processing one execution.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Index of the execution in its sequence.
    pub execution: usize,
    pub pass: Pass,
    /// Edges deleted to break cycles, in deletion order.
    pub broken: Vec<Slot>,
}

impl Outcome {
    /// `true` if the relations were consistent, i.e. no cycle was broken.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.broken.is_empty()
    }
}

/// Sorting state for one sequence of executions.
///
/// All executions are interned up front, so the node universe is every label
/// of the sequence and stays fixed while the executions are processed.
#[derive(Debug, Clone)]
pub struct Session {
    registry: LabelRegistry,
    traversal: Vec<NodeId>,
    graph: DependencyGraph,
    order: OrderStore,
    executions: Vec<Vec<Slot>>,
    strategy: Strategy,
    next: usize,
    /// The graph lost edges to cycle breaking and no longer matches the
    /// slots of the last execution.
    stale: bool,
}

impl Session {
    pub fn new<L>(executions: &[Execution<L>], strategy: Strategy) -> Self
    where
        L: AsRef<str>,
    {
        let mut registry = LabelRegistry::new();
        let executions: Vec<Vec<Slot>> = executions
            .iter()
            .map(|execution| intern_execution(&mut registry, execution))
            .collect();
        let traversal = registry.traversal();
        let graph = DependencyGraph::with_nodes(registry.len());

        tracing::debug!(
            nodes = registry.len(),
            executions = executions.len(),
            ?strategy,
            "session created"
        );

        Self {
            registry,
            traversal,
            graph,
            order: OrderStore::new(),
            executions,
            strategy,
            next: 0,
            stale: false,
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub const fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Order left by the most recently processed execution.
    #[must_use]
    pub const fn order(&self) -> &OrderStore {
        &self.order
    }

    /// Interned slots of execution `index`.
    #[must_use]
    pub fn slots(&self, index: usize) -> Option<&[Slot]> {
        self.executions.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.executions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }

    /// Labels of the current order, in position order.
    #[must_use]
    pub fn order_labels(&self) -> Vec<&str> {
        self.order
            .as_slice()
            .iter()
            .map(|&id| self.registry.label(id))
            .collect()
    }

    /// Position of `label` in the current order.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.order.position(self.registry.get(label)?)
    }

    /// `slot` with its endpoints resolved back to labels.
    #[must_use]
    pub fn relation(&self, slot: Slot) -> Relation<&str> {
        Relation::new(self.registry.label(slot.pred), self.registry.label(slot.succ))
    }

    /// Processes the next execution.
    ///
    /// Returns `None` once every execution has been processed, or after an
    /// error: structural errors leave the graph unusable and end the session.
    ///
    /// # Errors
    ///
    /// See [`diff_execution`] for the structural errors of the incremental
    /// strategy.
    pub fn step(&mut self) -> Option<Result<Outcome, Error>> {
        let index = self.next;
        let slots = self.executions.get(index)?.len();
        self.next += 1;

        let result = if self.strategy == Strategy::Full || index == 0 {
            Ok(self.sort_from_scratch(index))
        } else if self.stale {
            // Cycle breaking deleted edges, so the graph cannot be diffed.
            check_correspondence(index, &self.executions[index - 1], &self.executions[index])
                .map(|()| self.sort_from_scratch(index))
        } else {
            diff_execution(
                &mut self.graph,
                &mut self.order,
                index,
                &self.executions[index - 1],
                &self.executions[index],
            )
            .map(|diff| match diff {
                Diff::Satisfied => Outcome {
                    execution: index,
                    pass: Pass::Skipped,
                    broken: Vec::new(),
                },
                Diff::Resorted { range, broken } => Outcome {
                    execution: index,
                    pass: Pass::Resorted {
                        leading: *range.start(),
                        trailing: *range.end(),
                    },
                    broken,
                },
            })
        };

        match &result {
            Ok(outcome) => {
                self.stale = !outcome.is_ok();
                for &edge in &outcome.broken {
                    let relation = self.relation(edge);
                    tracing::warn!(
                        execution = index,
                        pred = relation.pred,
                        succ = relation.succ,
                        "cycle detected, relation dropped"
                    );
                }
                tracing::debug!(
                    execution = index,
                    pass = ?outcome.pass,
                    slots,
                    ok = outcome.is_ok(),
                    "execution sorted"
                );
            }
            Err(error) => {
                tracing::debug!(execution = index, %error, "session aborted");
                self.next = self.executions.len();
            }
        }
        Some(result)
    }

    fn sort_from_scratch(&mut self, index: usize) -> Outcome {
        replay(&mut self.graph, &self.executions[index]);
        let broken = sort_baseline(&mut self.graph, &mut self.order, &self.traversal);
        Outcome {
            execution: index,
            pass: Pass::Baseline,
            broken,
        }
    }

    /// Report entry for `outcome`, resolved against the current order.
    #[must_use]
    pub fn report(&self, outcome: &Outcome) -> ExecutionReport {
        ExecutionReport {
            execution: outcome.execution,
            pass: outcome.pass,
            ok: outcome.is_ok(),
            order: self.order_labels().into_iter().map(String::from).collect(),
            broken: outcome
                .broken
                .iter()
                .map(|&edge| {
                    let relation = self.relation(edge);
                    Relation::new(relation.pred.into(), relation.succ.into())
                })
                .collect(),
        }
    }
}

impl Iterator for Session {
    type Item = Result<Outcome, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}

/// Sorts every execution of a sequence and collects the results.
///
/// `executions` share one node universe; with [`Strategy::Incremental`] each
/// execution must keep the slot count of the first and change at most one
/// endpoint per slot from the execution before it.
///
/// # Errors
///
/// Returns the first structural [`Error`]; no partial report is produced.
pub fn check<L>(executions: &[Execution<L>], strategy: Strategy) -> Result<Report, Error>
where
    L: AsRef<str>,
{
    let mut session = Session::new(executions, strategy);
    let mut reports = Vec::with_capacity(session.len());
    while let Some(outcome) = session.step() {
        reports.push(session.report(&outcome?));
    }
    Ok(Report {
        executions: reports,
    })
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn execution(relations: &[(&'static str, &'static str)]) -> Execution<&'static str> {
        relations.iter().copied().map(Relation::from).collect()
    }

    /// The A, B, C, D walkthrough: a skipped execution, then a cycle.
    fn walkthrough() -> Vec<Execution<&'static str>> {
        vec![
            execution(&[("A", "B"), ("B", "C"), ("C", "D")]),
            execution(&[("A", "B"), ("B", "D"), ("C", "D")]),
            execution(&[("D", "B"), ("B", "D"), ("C", "D")]),
            execution(&[("A", "B"), ("B", "D"), ("C", "D")]),
        ]
    }

    #[test]
    fn test_walkthrough_incremental() {
        let mut session = Session::new(&walkthrough(), Strategy::Incremental);

        let first = session.step().unwrap().unwrap();
        assert_eq!(first.pass, Pass::Baseline);
        assert!(first.is_ok());
        assert_eq!(session.order_labels(), ["A", "B", "C", "D"]);

        let second = session.step().unwrap().unwrap();
        assert_eq!(second.pass, Pass::Skipped);
        assert_eq!(session.order_labels(), ["A", "B", "C", "D"]);

        let third = session.step().unwrap().unwrap();
        assert_eq!(
            third.pass,
            Pass::Resorted {
                leading: 1,
                trailing: 3
            }
        );
        assert!(!third.is_ok());
        assert_eq!(third.broken.len(), 1);
        assert_eq!(session.position("A"), Some(0));

        // The graph lost an edge, so the next execution is sorted from scratch.
        let fourth = session.step().unwrap().unwrap();
        assert_eq!(fourth.pass, Pass::Baseline);
        assert!(fourth.is_ok());
        assert_eq!(session.order_labels(), ["A", "C", "B", "D"]);

        assert!(session.step().is_none());
    }

    #[test]
    fn test_full_strategy_sorts_every_execution() {
        let outcomes: Vec<Outcome> = Session::new(&walkthrough(), Strategy::Full)
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(outcomes.iter().all(|outcome| outcome.pass == Pass::Baseline));
        let verdicts: Vec<bool> = outcomes.iter().map(Outcome::is_ok).collect();
        assert_eq!(verdicts, [true, true, false, true]);
    }

    #[test]
    fn test_error_ends_session() {
        let executions = vec![
            execution(&[("A", "B")]),
            execution(&[("C", "D")]),
            execution(&[("A", "B")]),
        ];
        let mut session = Session::new(&executions, Strategy::Incremental);
        assert!(session.step().unwrap().is_ok());
        assert!(matches!(
            session.step(),
            Some(Err(Error::SlotMismatch { execution: 1, .. }))
        ));
        assert!(session.step().is_none());
    }

    #[test]
    fn test_full_strategy_ignores_slot_correspondence() {
        let executions = vec![execution(&[("A", "B")]), execution(&[("C", "D"), ("D", "A")])];
        let report = check(&executions, Strategy::Full).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.executions[1].order, ["B", "C", "D", "A"]);
    }

    #[test]
    fn test_universe_spans_all_executions() {
        let executions = vec![execution(&[("b", "a")]), execution(&[("b", "z")])];
        let mut session = Session::new(&executions, Strategy::Incremental);
        session.step().unwrap().unwrap();
        // z is only related in the second execution, so it is free in the first.
        assert_eq!(session.order_labels(), ["b", "z", "a"]);
    }

    #[test]
    fn test_check_report() {
        let report = check(&walkthrough(), Strategy::Incremental).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.executions.len(), 4);
        assert_eq!(report.failed().count(), 1);
        let failed = &report.executions[2];
        assert_eq!(failed.broken.len(), 1);
        assert!(report.executions[0].ok);
    }

    #[test]
    fn test_empty_sequence() {
        let executions: Vec<Execution<&str>> = Vec::new();
        let report = check(&executions, Strategy::Incremental).unwrap();
        assert!(report.is_ok());
        assert!(report.executions.is_empty());
    }
}
