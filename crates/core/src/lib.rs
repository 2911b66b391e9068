//! Incremental topological sorting of multi-execution memory traces.
//!
//! `mtsort_core` checks whether the relations captured from a batch of
//! executions of a multiprocessor test are consistent with a memory
//! consistency model. Each execution is a list of "happens-before" relations
//! over one shared universe of operation labels; an execution is consistent
//! if its relations admit a total order, and inconsistent if they contain a
//! cycle.
//!
//! The building blocks, leaf first:
//!
//! 1. [`registry`] -- interns labels into dense [`NodeId`]s using an AVL tree.
//! 2. [`graph`] -- out-edges and pending predecessor counts per node.
//! 3. [`sort::baseline`] -- Kahn's algorithm over the whole universe, breaking
//!    every cycle it runs into by deleting one of its edges.
//! 4. [`order`] -- the position of every node, kept between executions.
//! 5. [`sort::incremental`] -- diffs an execution against the previous one,
//!    slot by slot, and re-sorts only the position range the changed
//!    relations invalidate. An execution whose relations all hold under the
//!    previous order costs one pass over its relations.
//!
//! A [`Session`] ties these together for one execution sequence.
//!
//! # Entry point
//!
//! [`check()`] processes a whole sequence and returns a [`Report`] with the
//! order and verdict of every execution:
//!
//! ```rust
//! use mtsort_core::{check, Relation, Strategy};
//!
//! let executions = vec![
//!     vec![Relation::new("A", "B"), Relation::new("B", "C")],
//!     vec![Relation::new("A", "B"), Relation::new("B", "A")],
//! ];
//! let report = check(&executions, Strategy::Incremental).unwrap();
//! assert!(report.executions[0].ok);
//! assert!(!report.executions[1].ok);
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on result types
//!   (`Report`, `Outcome`, `Pass`, `Slot`, `Relation`, `Error`).
//!
//! This crate is `no_std` compatible (requires `alloc`). Reading relation
//! files lives in the separate `mtsort_parser` crate.

#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod error;
pub mod execution;
pub mod graph;
pub mod order;
pub mod registry;
pub mod report;
pub mod session;
pub mod sort;

pub use error::Error;
pub use execution::{Execution, Relation, Slot};
pub use registry::NodeId;
pub use report::{ExecutionReport, Report};
pub use session::{check, Outcome, Pass, Session, Strategy};
