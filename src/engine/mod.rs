//! Engine: payload projection, accumulation, flush policy, collaborators and CLI plumbing.

pub mod accumulator;
pub mod arg_parser;
pub mod channel_queue;
pub mod cli;
pub mod collaborators;
pub mod db_ops;
pub mod flush_policy;
pub mod progress;
pub mod projector;

// Re-export commonly used items
pub use accumulator::{Drained, WorkspaceAccumulator, WorkspaceBatches};
pub use arg_parser::{Cli, Commands, JobsArgs, ReplayArgs};
pub use channel_queue::{ChannelJobQueue, QueuedJob};
pub use cli::handle_run;
pub use collaborators::{BulkIndexer, JobQueue, KeyResolver, PersistenceResolver};
pub use db_ops::{
    BulkStats, SqliteBulkIndexer, SqliteJobQueue, StoredJob, count_jobs, dimensions_hash,
    open_db, open_db_in_memory, pending_jobs,
};
pub use flush_policy::{FlushAction, FlushActions, FlushPolicy, Volume};
pub use projector::project;
