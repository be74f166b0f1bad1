//! # wordfreq
//!
//! Counts whitespace-separated words into an [`AvlTree`] and reports the most
//! common one, timing the parallel and the sequential reducer side by side.
//!
//! ## Example
//!
//! ```rust
//! use wordfreq::{tally_reader, Mode, ReportConfig, Reporter};
//!
//! let tree = tally_reader("to be or not to be".as_bytes()).unwrap();
//! let reporter = Reporter::new(ReportConfig::default()).unwrap();
//! let report = reporter.report(&tree, Mode::Sequential).unwrap();
//! assert_eq!((report.key.as_str(), report.value), ("to", 2));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod report;

pub use error::{Error, Result};
pub use report::{Mode, Report, ReportConfig, Reporter};

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use avl_rs::{AvlTree, Entry};

/// Word counts keyed by word.
pub type WordTree = AvlTree<String, u64>;

/// Count one occurrence of `word`.
///
/// Looks the word up once: an existing node is incremented in place, a
/// missing one is inserted with a count of 1.
pub fn count_word(tree: &mut WordTree, word: &str) {
    match tree.entry(word.to_string()) {
        Entry::Occupied(mut e) => *e.get_mut() += 1,
        Entry::Vacant(e) => e.insert(1),
    }
}

/// Count every whitespace-separated word read from `reader`.
///
/// Words are split on ASCII whitespace and need not be valid UTF-8; invalid
/// sequences are replaced with U+FFFD in the key.
pub fn tally_reader<R: Read>(reader: R) -> Result<WordTree> {
    let mut tree = WordTree::new();
    let mut words = 0u64;
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        for word in line
            .split(|b| b.is_ascii_whitespace())
            .filter(|w| !w.is_empty())
        {
            count_word(&mut tree, &String::from_utf8_lossy(word));
            words += 1;
        }
    }
    debug_assert!(tree.is_valid());
    tracing::debug!(
        words,
        distinct = tree.len(),
        height = tree.height(),
        "tally finished"
    );
    Ok(tree)
}

/// Count every word in the file at `path`.
pub fn tally_file(path: &Path) -> Result<WordTree> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tally_reader(file).map_err(|err| match err {
        Error::Read(source) => Error::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}
