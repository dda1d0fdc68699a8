//! Error taxonomy of the dispatch core. Collaborators report `anyhow::Error`; it is kept as the source.

use thiserror::Error;

use crate::types::JobKind;

#[derive(Debug, Error)]
pub enum IndexerError {
    /// The node's persisted entity could not be resolved. Aborts the current event.
    #[error("cannot project node {identifier}")]
    Projection {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    /// The job queue rejected a submission. Jobs not yet submitted in this flush are lost.
    #[error("submitting {kind} job for workspace {workspace} to queue {queue} failed")]
    QueueSubmission {
        queue: String,
        workspace: String,
        kind: JobKind,
        #[source]
        source: anyhow::Error,
    },

    /// The synchronous bulk indexer failed to flush.
    #[error("bulk flush failed")]
    BulkFlush(#[source] anyhow::Error),

    /// Direct (non-queued) indexing of a node failed.
    #[error("synchronous {kind} of node {identifier} failed")]
    SyncIndex {
        identifier: String,
        kind: JobKind,
        #[source]
        source: anyhow::Error,
    },
}
