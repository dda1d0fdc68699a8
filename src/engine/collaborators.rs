//! Seams to the systems around the dispatch core: persistence lookup, bulk indexer, job queue.

use anyhow::{Result, anyhow};

use crate::node::{EntityRef, Node};
use crate::types::{BulkLimits, Job, NodePayload};

/// Maps a persisted entity to its opaque identifier.
pub trait PersistenceResolver {
    /// Fails when the entity has not been persisted yet.
    fn resolve(&self, entity: &EntityRef<'_>) -> Result<String>;
}

/// Resolver that returns the entity key as is.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyResolver;

impl PersistenceResolver for KeyResolver {
    fn resolve(&self, entity: &EntityRef<'_>) -> Result<String> {
        entity
            .key
            .map(str::to_string)
            .ok_or_else(|| anyhow!("{} entity is not persisted", entity.type_name))
    }
}

/// Synchronous indexer writing straight to the document store, in bulk requests.
pub trait BulkIndexer {
    /// Index a node directly (queue bypassed).
    fn index_node(&mut self, node: &dyn Node, target_workspace: Option<&str>) -> Result<()>;
    /// Remove a node directly (queue bypassed).
    fn remove_node(&mut self, node: &dyn Node, target_workspace: Option<&str>) -> Result<()>;
    /// Buffer an already projected payload for indexing in `workspace`.
    fn index_payload(&mut self, workspace: &str, payload: &NodePayload) -> Result<()>;
    /// Buffer an already projected payload for removal from `workspace`.
    fn remove_payload(&mut self, workspace: &str, payload: &NodePayload) -> Result<()>;
    /// Send whatever is buffered.
    fn flush(&mut self) -> Result<()>;
    /// Discard whatever is buffered.
    fn reset(&mut self);
    /// Element and byte limits of one bulk request.
    fn limits(&self) -> BulkLimits;
}

/// Asynchronous job queue.
pub trait JobQueue {
    fn submit(&mut self, queue_name: &str, job: &Job) -> Result<()>;
}

impl<T: JobQueue + ?Sized> JobQueue for &mut T {
    fn submit(&mut self, queue_name: &str, job: &Job) -> Result<()> {
        (**self).submit(queue_name, job)
    }
}

impl<T: BulkIndexer + ?Sized> BulkIndexer for &mut T {
    fn index_node(&mut self, node: &dyn Node, target_workspace: Option<&str>) -> Result<()> {
        (**self).index_node(node, target_workspace)
    }

    fn remove_node(&mut self, node: &dyn Node, target_workspace: Option<&str>) -> Result<()> {
        (**self).remove_node(node, target_workspace)
    }

    fn index_payload(&mut self, workspace: &str, payload: &NodePayload) -> Result<()> {
        (**self).index_payload(workspace, payload)
    }

    fn remove_payload(&mut self, workspace: &str, payload: &NodePayload) -> Result<()> {
        (**self).remove_payload(workspace, payload)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn limits(&self) -> BulkLimits {
        (**self).limits()
    }
}
