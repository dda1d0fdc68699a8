//! Dispatch coordinator: routes node events into the accumulator and flushes to queue or bulk indexer.

use log::debug;

use crate::engine::accumulator::{Drained, WorkspaceAccumulator};
use crate::engine::collaborators::{BulkIndexer, JobQueue, KeyResolver, PersistenceResolver};
use crate::engine::flush_policy::{FlushPolicy, Volume};
use crate::engine::projector::project;
use crate::error::IndexerError;
use crate::node::Node;
use crate::types::{Job, JobBatch, JobKind, NodePayload, Settings};
use crate::utils::config::LIVE_WORKSPACE_NAME;

/// Where a single event ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routing {
    /// Stored in the accumulator (it may already have been flushed by the time this returns).
    Accumulated(JobKind),
    /// Handed straight to the bulk indexer because async indexing is off.
    Direct(JobKind),
    /// Filtered out: not the live workspace and only live is indexed.
    Dropped,
}

/// Batches index/remove events per workspace and dispatches them as queue jobs.
///
/// One instance per unit of work (a publish, a replay run). All methods take `&mut self`;
/// sharing an instance across threads needs one lock around each call.
pub struct DispatchCoordinator<B, Q, R = KeyResolver> {
    settings: Settings,
    policy: FlushPolicy,
    accumulator: WorkspaceAccumulator,
    bulk: B,
    queue: Q,
    resolver: R,
}

impl<B, Q, R> DispatchCoordinator<B, Q, R>
where
    B: BulkIndexer,
    Q: JobQueue,
    R: PersistenceResolver,
{
    /// Bulk thresholds are read from `bulk` once, here.
    pub fn new(settings: Settings, bulk: B, queue: Q, resolver: R) -> Self {
        let policy = FlushPolicy::new(settings.queue_batch_size, bulk.limits());
        debug!(
            "Dispatch coordinator: async={} all_workspaces={} queue_batch={} bulk={:?}",
            settings.enable_async_indexing,
            settings.index_all_workspaces,
            settings.queue_batch_size,
            policy.bulk_limits()
        );
        Self {
            settings,
            policy,
            accumulator: WorkspaceAccumulator::new(),
            bulk,
            queue,
            resolver,
        }
    }

    /// Index `node`, for `target_workspace` when indexing is triggered by a publish.
    pub fn handle_index(
        &mut self,
        node: &dyn Node,
        target_workspace: Option<&str>,
    ) -> Result<Routing, IndexerError> {
        if node.is_removed() {
            return self.handle_remove(node, target_workspace);
        }
        self.handle(JobKind::Index, node, target_workspace)
    }

    /// Remove `node` from the index of its (or the target) workspace.
    pub fn handle_remove(
        &mut self,
        node: &dyn Node,
        target_workspace: Option<&str>,
    ) -> Result<Routing, IndexerError> {
        self.handle(JobKind::Remove, node, target_workspace)
    }

    fn handle(
        &mut self,
        kind: JobKind,
        node: &dyn Node,
        target_workspace: Option<&str>,
    ) -> Result<Routing, IndexerError> {
        if !self.settings.enable_async_indexing {
            self.handle_direct(kind, node, target_workspace)?;
            return Ok(Routing::Direct(kind));
        }

        let workspace = target_workspace.unwrap_or_else(|| node.workspace_name());
        if !self.accepts_workspace(workspace) {
            debug!(
                "Skipping {} of {}: workspace {} is not indexed",
                kind,
                node.identifier(),
                workspace
            );
            return Ok(Routing::Dropped);
        }

        // The payload keeps the node's own workspace; `workspace` only picks the job.
        let payload = project(&self.resolver, node, None)?;
        let stored = match kind {
            JobKind::Index => self.accumulator.add_to_index(workspace, payload),
            JobKind::Remove => self.accumulator.add_to_removal(workspace, payload),
        };
        stored.map_err(|err| IndexerError::Projection {
            identifier: node.identifier().to_string(),
            source: anyhow::Error::new(err).context("measure payload"),
        })?;
        self.flush_if_needed()?;
        Ok(Routing::Accumulated(kind))
    }

    fn handle_direct(
        &mut self,
        kind: JobKind,
        node: &dyn Node,
        target_workspace: Option<&str>,
    ) -> Result<(), IndexerError> {
        let result = match kind {
            JobKind::Index => self.bulk.index_node(node, target_workspace),
            JobKind::Remove => self.bulk.remove_node(node, target_workspace),
        };
        result.map_err(|source| IndexerError::SyncIndex {
            identifier: node.identifier().to_string(),
            kind,
            source,
        })
    }

    fn accepts_workspace(&self, workspace: &str) -> bool {
        self.settings.index_all_workspaces || workspace == LIVE_WORKSPACE_NAME
    }

    /// Current accumulated volume.
    pub fn volume(&self) -> Volume {
        Volume {
            elements: self.accumulator.total_count(),
            octets: self.accumulator.total_bytes(),
        }
    }

    /// Queue check first, then the bulk check against whatever is left.
    fn flush_if_needed(&mut self) -> Result<(), IndexerError> {
        if self.policy.queue_due(self.volume()) {
            debug!(
                "Queue batch size {} reached; submitting jobs",
                self.policy.queue_batch_size()
            );
            self.flush()?;
        }
        let volume = self.volume();
        if self.policy.bulk_due(volume) {
            debug!(
                "Bulk limits reached ({} elements, {} octets); flushing synchronously",
                volume.elements, volume.octets
            );
            self.bulk_flush_remaining()?;
        }
        Ok(())
    }

    /// Push everything still accumulated through the bulk indexer and flush it.
    fn bulk_flush_remaining(&mut self) -> Result<(), IndexerError> {
        let Drained { index, removal } = self.accumulator.drain_all();
        for (workspace, payloads) in &index {
            for payload in payloads {
                self.bulk
                    .index_payload(workspace, payload)
                    .map_err(IndexerError::BulkFlush)?;
            }
        }
        for (workspace, payloads) in &removal {
            for payload in payloads {
                self.bulk
                    .remove_payload(workspace, payload)
                    .map_err(IndexerError::BulkFlush)?;
            }
        }
        self.bulk.flush().map_err(IndexerError::BulkFlush)
    }

    /// Submit one job per workspace per kind, then flush the bulk indexer.
    ///
    /// The accumulator is drained before the first submission; if a submission fails, the
    /// remaining jobs of this flush are lost.
    pub fn flush(&mut self) -> Result<(), IndexerError> {
        let Drained { index, removal } = self.accumulator.drain_all();
        for (workspace, payloads) in index {
            let job = Job::Index(self.job_batch(workspace, payloads));
            self.submit(&job)?;
        }
        for (workspace, payloads) in removal {
            let job = Job::Removal(self.job_batch(workspace, payloads));
            self.submit(&job)?;
        }
        self.bulk.flush().map_err(IndexerError::BulkFlush)
    }

    fn job_batch(&self, workspace: String, payloads: Vec<NodePayload>) -> JobBatch {
        JobBatch {
            index_name_postfix: self.settings.index_name_postfix.clone(),
            workspace,
            payloads,
        }
    }

    fn submit(&mut self, job: &Job) -> Result<(), IndexerError> {
        let queue_name = &self.settings.queue_name;
        debug!(
            "Queueing {} job for workspace {} ({} payloads) on {}",
            job.kind(),
            job.workspace(),
            job.payloads().len(),
            queue_name
        );
        self.queue
            .submit(queue_name, job)
            .map_err(|source| IndexerError::QueueSubmission {
                queue: queue_name.clone(),
                workspace: job.workspace().to_string(),
                kind: job.kind(),
                source,
            })
    }

    /// Discard accumulated work and reset the bulk indexer.
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.bulk.reset();
    }

    pub fn accumulator(&self) -> &WorkspaceAccumulator {
        &self.accumulator
    }

    pub fn total_count(&self) -> usize {
        self.accumulator.total_count()
    }

    pub fn bulk(&self) -> &B {
        &self.bulk
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Give back the collaborators. Accumulated work that was not flushed is dropped.
    pub fn into_parts(self) -> (B, Q, R) {
        (self.bulk, self.queue, self.resolver)
    }
}
