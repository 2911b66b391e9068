use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local};
use mtsort_core::{Execution, Relation};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngExt, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Name of the execution list file written next to a batch's executions.
pub const LIST_FILE: &str = "list.txt";

#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
pub struct BatchParams {
    pub id: u64,
    /// Size of the label universe.
    pub n_label: u64,
    /// Relation slots per execution.
    pub n_slot: u64,
    /// Executions in the batch.
    pub n_exec: u64,
    /// Endpoint mutations applied between consecutive executions.
    pub n_mutation: u64,
    /// Seed for reproducible batches; `None` draws from the thread rng.
    #[builder(default)]
    pub seed: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Batch {
    params: BatchParams,
    info: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    data: Vec<Execution<String>>,
}

impl Batch {
    #[must_use]
    pub const fn new(
        params: BatchParams,
        info: String,
        start: DateTime<Local>,
        end: DateTime<Local>,
        data: Vec<Execution<String>>,
    ) -> Self {
        Self {
            params,
            info,
            start,
            end,
            data,
        }
    }

    #[must_use]
    pub const fn get_id(&self) -> u64 {
        self.params.id
    }

    #[must_use]
    pub const fn get_data(&self) -> &Vec<Execution<String>> {
        &self.data
    }

    #[must_use]
    pub const fn get_params(&self) -> &BatchParams {
        &self.params
    }

    #[must_use]
    pub fn get_duration(&self) -> Duration {
        self.end - self.start
    }

    /// Writes the batch as `dir/batch_<id>/`: one `exec_<k>.txt` relation
    /// file per execution, plus a [`LIST_FILE`] naming them in order.
    ///
    /// Returns the batch directory.
    ///
    /// # Errors
    ///
    /// Fails if the directory or any of its files cannot be written.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let batch_dir = dir.join(format!("batch_{}", self.get_id()));
        fs::create_dir_all(&batch_dir)?;

        let mut list = String::new();
        for (index, execution) in self.data.iter().enumerate() {
            let name = format!("exec_{index}.txt");
            fs::write(batch_dir.join(&name), render_execution(execution))?;
            list.push_str(&name);
            list.push('\n');
        }
        fs::write(batch_dir.join(LIST_FILE), list)?;
        Ok(batch_dir)
    }
}

/// Relation file text for `execution`: one `pred succ` pair per line.
#[must_use]
pub fn render_execution(execution: &Execution<String>) -> String {
    execution
        .iter()
        .map(|relation| format!("{} {}\n", relation.pred, relation.succ))
        .collect()
}

fn label(index: u64) -> String {
    format!("op{index}")
}

/// Generate one execution sequence over `n_label` labels with `n_slot`
/// relation slots per execution.
///
/// # Slot correspondence
///
/// Every execution after the first differs from the one before it only by
/// endpoint mutations: each mutation moves the predecessor *or* the successor
/// of one slot to a random label. A slot mutated twice in one step keeps
/// moving the same endpoint, so no slot ever changes both endpoints at once.
///
/// The first execution is drawn from a hidden random total order (every
/// relation points forward in it), so it is always acyclic. Later executions
/// may contain cycles and self-relations.
///
/// # Panics
///
/// Panics if `n_slot > 0` and `n_label` is zero.
pub fn generate_single_batch_with<R>(
    rng: &mut R,
    n_label: u64,
    n_slot: u64,
    n_exec: u64,
    n_mutation: u64,
) -> Vec<Execution<String>>
where
    R: RngExt,
{
    let mut hidden: Vec<u64> = (0..n_label).collect();
    hidden.shuffle(rng);

    let mut current: Vec<(u64, u64)> = (0..n_slot)
        .map(|_| {
            let a = rng.random_range(0..hidden.len());
            let b = rng.random_range(0..hidden.len());
            (hidden[a.min(b)], hidden[a.max(b)])
        })
        .collect();

    let mut executions = Vec::new();
    for exec in 0..n_exec {
        if exec > 0 && !current.is_empty() {
            let mut moved: Vec<Option<bool>> = vec![None; current.len()];
            for _ in 0..n_mutation {
                let slot = rng.random_range(0..current.len());
                let move_pred = *moved[slot].get_or_insert_with(|| rng.random::<bool>());
                let target = rng.random_range(0..n_label);
                if move_pred {
                    current[slot].0 = target;
                } else {
                    current[slot].1 = target;
                }
            }
        }
        executions.push(
            current
                .iter()
                .map(|&(pred, succ)| Relation::new(label(pred), label(succ)))
                .collect(),
        );
    }
    executions
}

/// [`generate_single_batch_with`] on a thread-local rng.
#[must_use]
pub fn generate_single_batch(
    n_label: u64,
    n_slot: u64,
    n_exec: u64,
    n_mutation: u64,
) -> Vec<Execution<String>> {
    generate_single_batch_with(&mut rand::rng(), n_label, n_slot, n_exec, n_mutation)
}

/// [`generate_single_batch_with`] on an rng seeded from `seed`.
#[must_use]
pub fn generate_single_batch_seeded(
    seed: u64,
    n_label: u64,
    n_slot: u64,
    n_exec: u64,
    n_mutation: u64,
) -> Vec<Execution<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_single_batch_with(&mut rng, n_label, n_slot, n_exec, n_mutation)
}

/// Generate `n_batch` independent batches in parallel.
///
/// With a `seed`, batch `i` is seeded from `seed + i`, so the output does not
/// depend on thread scheduling.
#[must_use]
pub fn generate_mult_batches(
    n_batch: u64,
    n_label: u64,
    n_slot: u64,
    n_exec: u64,
    n_mutation: u64,
    seed: Option<u64>,
) -> Vec<Batch> {
    (0..n_batch)
        .into_par_iter()
        .map(|id| {
            let params = BatchParams::builder()
                .id(id)
                .n_label(n_label)
                .n_slot(n_slot)
                .n_exec(n_exec)
                .n_mutation(n_mutation)
                .seed(seed.map(|seed| seed.wrapping_add(id)))
                .build();
            let start_time = Local::now();
            let data = match params.seed {
                Some(seed) => generate_single_batch_seeded(seed, n_label, n_slot, n_exec, n_mutation),
                None => generate_single_batch(n_label, n_slot, n_exec, n_mutation),
            };
            let end_time = Local::now();
            Batch::new(params, "generated".to_string(), start_time, end_time, data)
        })
        .collect()
}
