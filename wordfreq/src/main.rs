//! Print the most common word (with its count) in a file.
//!
//! The word tree is reduced twice, first with the fork-join reducer and then
//! sequentially, and each result is printed with its wall time:
//!
//! ```text
//! cutoff = 9
//! PARALLEL	the	1024	0.000183
//! SEQUENTIAL	the	1024	0.000412
//! ```
//!
//! # Usage
//!
//! ```bash
//! wordfreq corpus.txt            # default cutoff
//! wordfreq corpus.txt 4          # fork until subtrees are shorter than 4
//! wordfreq corpus.txt 4 --threads 8 --repetitions 10
//!
//! # Logging goes to stderr, controlled via RUST_LOG:
//! RUST_LOG=wordfreq=debug,avl_rs=debug wordfreq corpus.txt
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use avl_rs::reduce::DEFAULT_SEQUENTIAL_CUTOFF;
use wordfreq::{Mode, ReportConfig, Reporter};

/// Prints the most common word (with its count) in the named file.
#[derive(Parser, Debug)]
#[command(name = "wordfreq")]
#[command(about = "Print the most common word in a file, reduced in parallel and sequentially")]
struct Cli {
    /// File to read words from (whitespace separated).
    file: PathBuf,

    /// Subtree height below which the parallel reducer stops forking.
    #[arg(env = "WORDFREQ_CUTOFF", default_value_t = DEFAULT_SEQUENTIAL_CUTOFF)]
    cutoff: u32,

    /// Size of a dedicated reduction pool. Defaults to rayon's global pool.
    #[arg(long, env = "WORDFREQ_THREADS")]
    threads: Option<usize>,

    /// Repeat each reduction this many times inside one timing window.
    #[arg(long, default_value_t = 1)]
    repetitions: usize,

    /// Print the word tree sideways before reporting.
    #[arg(long, default_value_t = false)]
    print_tree: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordfreq=info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        file = %cli.file.display(),
        cutoff = cli.cutoff,
        threads = ?cli.threads,
        "counting words"
    );
    let mut tree = wordfreq::tally_file(&cli.file)?;
    if cfg!(debug_assertions) {
        tree.validate().context("word tree failed validation")?;
    }
    info!(
        distinct = tree.len(),
        total = tree.total_value(),
        height = tree.height(),
        "words counted"
    );

    if cli.print_tree {
        print!("{}", tree.pretty());
    }

    let reporter = Reporter::new(ReportConfig {
        sequential_cutoff: cli.cutoff,
        threads: cli.threads,
        repetitions: cli.repetitions,
    })
    .context("failed to set up the parallel reducer")?;

    println!("cutoff = {}", cli.cutoff);
    println!("{}", reporter.report(&tree, Mode::Parallel)?);
    println!("{}", reporter.report(&tree, Mode::Sequential)?);

    tree.clear();
    Ok(())
}
