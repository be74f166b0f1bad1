//! Timed most-common-word reports.

use std::fmt;
use std::time::{Duration, Instant};

use avl_rs::reduce::DEFAULT_SEQUENTIAL_CUTOFF;
use avl_rs::{find_max_sequential, ParallelReducer, ReduceConfig};

use crate::error::{Error, Result};
use crate::WordTree;

/// Which reducer a report runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fork-join reduction with the configured cutoff.
    Parallel,
    /// Single-threaded post-order reduction.
    Sequential,
}

impl Mode {
    /// Label printed in the first report column.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Parallel => "PARALLEL",
            Mode::Sequential => "SEQUENTIAL",
        }
    }
}

/// Configuration for a [`Reporter`].
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Subtree height below which the parallel reducer stops forking.
    pub sequential_cutoff: u32,
    /// Dedicated reduction pool size; `None` uses the global pool.
    pub threads: Option<usize>,
    /// How many times each reduction is repeated inside one timing window.
    pub repetitions: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sequential_cutoff: DEFAULT_SEQUENTIAL_CUTOFF,
            threads: None,
            repetitions: 1,
        }
    }
}

/// Outcome of one timed reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Reducer label.
    pub label: &'static str,
    /// Most common word; empty when there was no input.
    pub key: String,
    /// Its count; 0 when there was no input.
    pub value: u64,
    /// Wall time for all repetitions.
    pub elapsed: Duration,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.label,
            self.key,
            self.value,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Runs and times reductions over a word tree.
pub struct Reporter {
    reducer: ParallelReducer,
    repetitions: usize,
}

impl Reporter {
    /// Build the parallel reducer described by `config`.
    pub fn new(config: ReportConfig) -> Result<Self> {
        let mut reduce = ReduceConfig::default().with_cutoff(config.sequential_cutoff);
        reduce.threads = config.threads;
        let reducer = ParallelReducer::new(reduce)?;
        Ok(Self {
            reducer,
            repetitions: config.repetitions.max(1),
        })
    }

    /// The parallel reducer used for [`Mode::Parallel`].
    pub fn reducer(&self) -> &ParallelReducer {
        &self.reducer
    }

    /// Run the `mode` reduction `repetitions` times and time the whole run.
    ///
    /// Every repetition must produce the same answer as the first.
    pub fn report(&self, tree: &WordTree, mode: Mode) -> Result<Report> {
        let label = mode.label();
        let start = Instant::now();
        let mut first = None;
        for repetition in 0..self.repetitions {
            let best = match mode {
                Mode::Parallel => self.reducer.find_max(tree),
                Mode::Sequential => find_max_sequential(tree),
            };
            match first {
                None => first = Some(best),
                Some(previous) if previous != best => {
                    return Err(Error::Inconsistent { label, repetition });
                }
                Some(_) => {}
            }
        }
        let elapsed = start.elapsed();

        let (key, value) = match first.flatten() {
            Some((key, value)) => (key.clone(), *value),
            None => (String::new(), 0),
        };
        tracing::info!(
            label,
            key = %key,
            value,
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            repetitions = self.repetitions,
            "reduction finished"
        );
        Ok(Report {
            label,
            key,
            value,
            elapsed,
        })
    }
}
