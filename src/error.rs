//! Error types for avl-rs.
//!
//! Tree operations themselves have no recoverable failures: misuse such as
//! looking up a missing key with [`AvlTree::lookup`](crate::AvlTree::lookup)
//! panics. What remains is setting up a dedicated reduction pool, and the
//! report produced by [`AvlTree::validate`](crate::AvlTree::validate).

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in avl-rs operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build reduction thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid reduction config: {0}")]
    InvalidConfig(String),
}

/// First invariant violation found by [`AvlTree::validate`](crate::AvlTree::validate).
///
/// `position` is the in-order index of the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("node {position} is out of order with its in-order predecessor")]
    Order { position: usize },

    #[error("node {position} is unbalanced (balance factor {balance})")]
    Unbalanced { position: usize, balance: i32 },

    #[error("node {position} caches height {cached}, actual height is {actual}")]
    StaleHeight {
        position: usize,
        cached: i32,
        actual: i32,
    },

    #[error("tree reports {recorded} entries but holds {counted} nodes")]
    Count { counted: usize, recorded: usize },
}
