//! Error types for wordfreq.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from tallying input and reporting results.
#[derive(Debug, Error)]
pub enum Error {
    /// Opening or reading a named input file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading an unnamed input stream failed.
    #[error("failed to read input: {0}")]
    Read(#[from] io::Error),

    /// Setting up the parallel reducer failed.
    #[error(transparent)]
    Reduce(#[from] avl_rs::Error),

    /// A repeated reduction returned a different answer than the first run.
    #[error("{label} reduction changed its answer on repetition {repetition}")]
    Inconsistent {
        /// Report label of the reducer.
        label: &'static str,
        /// Zero-based repetition that disagreed.
        repetition: usize,
    },
}
