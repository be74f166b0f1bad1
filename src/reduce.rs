//! Max-value reduction over an [`AvlTree`].
//!
//! Both reducers return the entry with the greatest value and resolve ties
//! the same way, through [`combine`]:
//! - the right subtree's best wins a tie against the left subtree's best;
//! - the current node wins a tie against the best of its subtrees.
//!
//! The parallel reducer forks the two subtree reductions with
//! [`rayon::join`] until it reaches a subtree whose height is below the
//! configured cutoff, then finishes that subtree sequentially. Subtree tasks
//! only read disjoint parts of the tree, so the join is the only
//! synchronization. The cutoff changes how many tasks are created, never
//! the answer.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::node::Node;
use crate::AvlTree;

/// Best `(key, value)` found so far; `None` for an empty subtree.
type Best<'a, K, V> = Option<(&'a K, &'a V)>;

/// Subtree height below which the parallel reducer stops forking.
pub const DEFAULT_SEQUENTIAL_CUTOFF: u32 = 9;

/// Configuration for [`ParallelReducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceConfig {
    /// Subtrees whose height is below this are reduced sequentially.
    /// `0` forks at every node; `u32::MAX` never forks.
    pub sequential_cutoff: u32,
    /// Size of a dedicated worker pool. `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            sequential_cutoff: DEFAULT_SEQUENTIAL_CUTOFF,
            threads: None,
        }
    }
}

impl ReduceConfig {
    pub fn with_cutoff(mut self, sequential_cutoff: u32) -> Self {
        self.sequential_cutoff = sequential_cutoff;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

/// Task accounting for one parallel reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReduceStats {
    /// Subtree tasks handed to `rayon::join` (two per fork).
    pub tasks_spawned: usize,
    /// Subtrees finished by the sequential reducer.
    pub sequential_leaves: usize,
}

#[derive(Default)]
struct Counters {
    tasks_spawned: AtomicUsize,
    sequential_leaves: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> ReduceStats {
        ReduceStats {
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
            sequential_leaves: self.sequential_leaves.load(Ordering::Relaxed),
        }
    }
}

/// Pick the best of a node and its two subtree results.
fn combine<'a, K, V: Ord>(
    left: Best<'a, K, V>,
    right: Best<'a, K, V>,
    node: &'a Node<K, V>,
) -> (&'a K, &'a V) {
    let below = match (left, right) {
        (Some(l), Some(r)) => Some(if r.1 >= l.1 { r } else { l }),
        (l, None) => l,
        (None, r) => r,
    };
    match below {
        Some(best) if best.1 > &node.value => best,
        _ => (&node.key, &node.value),
    }
}

fn reduce_sequential<'a, K, V: Ord>(node: Option<&'a Node<K, V>>) -> Best<'a, K, V> {
    let node = node?;
    let left = reduce_sequential(node.left());
    let right = reduce_sequential(node.right());
    Some(combine(left, right, node))
}

fn reduce_fork_join<'a, K, V>(
    node: Option<&'a Node<K, V>>,
    cutoff: u32,
    counters: &Counters,
) -> Best<'a, K, V>
where
    K: Sync,
    V: Ord + Sync,
{
    let node = node?;
    if i64::from(node.height) < i64::from(cutoff) {
        counters.sequential_leaves.fetch_add(1, Ordering::Relaxed);
        return reduce_sequential(Some(node));
    }

    counters.tasks_spawned.fetch_add(2, Ordering::Relaxed);
    let (left, right) = rayon::join(
        || reduce_fork_join(node.left(), cutoff, counters),
        || reduce_fork_join(node.right(), cutoff, counters),
    );
    Some(combine(left, right, node))
}

/// Single-threaded post-order reduction. `None` for an empty tree.
pub fn find_max_sequential<K, V: Ord>(tree: &AvlTree<K, V>) -> Option<(&K, &V)> {
    reduce_sequential(tree.root())
}

/// Fork-join reduction on rayon's global pool.
///
/// Same result as [`find_max_sequential`] for every `sequential_cutoff`.
pub fn find_max<K, V>(tree: &AvlTree<K, V>, sequential_cutoff: u32) -> Option<(&K, &V)>
where
    K: Sync,
    V: Ord + Sync,
{
    reduce_fork_join(tree.root(), sequential_cutoff, &Counters::default())
}

/// Fork-join reducer with a fixed cutoff and, optionally, its own pool.
pub struct ParallelReducer {
    config: ReduceConfig,
    pool: Option<rayon::ThreadPool>,
}

impl ParallelReducer {
    pub fn new(config: ReduceConfig) -> Result<Self> {
        let pool = match config.threads {
            Some(0) => {
                return Err(Error::InvalidConfig(
                    "reduction pool needs at least one thread".to_string(),
                ))
            }
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("avl-reduce-{i}"))
                    .build()?,
            ),
            None => None,
        };
        tracing::debug!(
            cutoff = config.sequential_cutoff,
            threads = ?config.threads,
            "parallel reducer ready"
        );
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Number of worker threads reductions run on.
    pub fn current_num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    pub fn find_max<'a, K, V>(&self, tree: &'a AvlTree<K, V>) -> Option<(&'a K, &'a V)>
    where
        K: Sync,
        V: Ord + Sync,
    {
        self.find_max_with_stats(tree).0
    }

    /// Like [`ParallelReducer::find_max`], also reporting how much work was
    /// forked.
    pub fn find_max_with_stats<'a, K, V>(
        &self,
        tree: &'a AvlTree<K, V>,
    ) -> (Option<(&'a K, &'a V)>, ReduceStats)
    where
        K: Sync,
        V: Ord + Sync,
    {
        let counters = Counters::default();
        let cutoff = self.config.sequential_cutoff;
        let run = || reduce_fork_join(tree.root(), cutoff, &counters);
        let best = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        let stats = counters.snapshot();
        tracing::debug!(
            cutoff,
            tasks = stats.tasks_spawned,
            sequential = stats.sequential_leaves,
            "parallel reduction finished"
        );
        (best, stats)
    }
}
