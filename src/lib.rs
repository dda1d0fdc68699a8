//! qindexer: batches node index/remove events per workspace into queue jobs
//! and falls back to a synchronous bulk indexer when bulk limits are reached.

pub mod engine;
pub mod error;
pub mod node;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::IndexerError;
pub use node::{EntityRef, Node, NodeRecord};
pub use pipeline::{DispatchCoordinator, Routing};
pub use types::*;

use log::debug;

use crate::engine::{BulkIndexer, JobQueue, KeyResolver};

/// Result alias used by the application-level API (CLI, replay, SQLite collaborators)
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Build a coordinator that resolves persisted entities by their key ([`KeyResolver`]).
///
/// Bulk thresholds come from `bulk.limits()`; `settings.bulk` is only a hint for building `bulk`.
pub fn coordinator<B, Q>(settings: Settings, bulk: B, queue: Q) -> DispatchCoordinator<B, Q>
where
    B: BulkIndexer,
    Q: JobQueue,
{
    debug!(
        "{} SETTINGS:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        settings
    );
    DispatchCoordinator::new(settings, bulk, queue, KeyResolver)
}
