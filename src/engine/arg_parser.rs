use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::config::PackagePaths;

/// Queue-backed node indexer.
#[derive(Clone, Parser)]
#[command(name = "qindexer")]
#[command(about = "Batch node index/remove events into queue jobs; inspect the queue.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Replay a JSON-lines event file through the dispatcher into the SQLite queue and store.
    Replay(ReplayArgs),
    /// Summarize (or list) pending jobs in the SQLite queue.
    Jobs(JobsArgs),
}

#[derive(Clone, Args)]
pub struct ReplayArgs {
    /// JSON-lines file of node events.
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    /// Path to the queue/document database. Default: `.qindexer` in the current directory.
    #[arg(long, short)]
    pub db: Option<PathBuf>,

    /// Bypass the queue: index every event synchronously.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub sync: Option<bool>,

    /// Index every workspace, not only live.
    #[arg(long, short = 'a', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub all_workspaces: Option<bool>,

    /// Accumulated events per queue submission.
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,

    /// Max elements of one bulk request.
    #[arg(long)]
    pub bulk_elements: Option<usize>,

    /// Max bytes of one bulk request.
    #[arg(long)]
    pub bulk_octets: Option<usize>,

    /// Index name postfix passed to every job.
    #[arg(long, short = 'p')]
    pub postfix: Option<String>,

    /// Queue to submit jobs to.
    #[arg(long, short = 'q')]
    pub queue: Option<String>,

    /// Strict mode: fail on the first malformed event line instead of skipping it.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

#[derive(Clone, Args)]
pub struct JobsArgs {
    /// Path to the queue/document database. Default: `.qindexer` in the current directory.
    #[arg(long, short)]
    pub db: Option<PathBuf>,

    /// Only jobs of this queue.
    #[arg(long, short = 'q')]
    pub queue: Option<String>,

    /// List each job. If there are more than the threshold, write to qindexer.results instead of stdout.
    #[arg(long, short = 'l', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub list: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

/// Database path: explicit, else from the settings file, else the package default in the current directory.
pub fn resolve_db_path(explicit: Option<&PathBuf>, from_file: Option<PathBuf>) -> PathBuf {
    explicit
        .cloned()
        .or(from_file)
        .unwrap_or_else(|| PathBuf::from(PackagePaths::get().db_filename()))
}
