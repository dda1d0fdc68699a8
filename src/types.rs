//! Public and internal types for the qindexer API: payloads, jobs and settings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::config::{BulkDefaults, LIVE_QUEUE_NAME, QUEUE_BATCH_SIZE};

/// Content dimensions of a node: dimension name → ordered values (e.g. `language → [de, en]`).
///
/// Insertion order is kept so serialized payloads are deterministic.
pub type Dimensions = IndexMap<String, Vec<String>>;

/// Minimal, queueable projection of a node. Produced once per event and never mutated.
///
/// Serialized with the field names workers expect (`persistenceObjectIdentifier`, `nodeType`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePayload {
    /// Opaque id of the persisted entity backing the node.
    pub persistence_object_identifier: String,
    /// Node identity, stable across workspaces.
    pub identifier: String,
    pub dimensions: Dimensions,
    /// Workspace the node lives in. The job carries the workspace it is indexed for.
    pub workspace: String,
    pub node_type: String,
    pub path: String,
}

/// Writer that only counts bytes.
struct ByteCounter(usize);

impl std::io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl NodePayload {
    /// Size of the JSON encoding in bytes. Used for the bulk byte threshold.
    pub fn serialized_len(&self) -> serde_json::Result<usize> {
        let mut counter = ByteCounter(0);
        serde_json::to_writer(&mut counter, self)?;
        Ok(counter.0)
    }
}

/// Which pending set an event goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Index,
    Remove,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Index => "index",
            JobKind::Remove => "remove",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body shared by both job kinds: every payload for one workspace, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobBatch {
    pub index_name_postfix: String,
    pub workspace: String,
    pub payloads: Vec<NodePayload>,
}

/// A unit of work handed to the job queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Job {
    /// Index these payloads for the batch workspace.
    Index(JobBatch),
    /// Remove these payloads from the batch workspace.
    Removal(JobBatch),
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::Index(_) => JobKind::Index,
            Job::Removal(_) => JobKind::Remove,
        }
    }

    pub fn batch(&self) -> &JobBatch {
        match self {
            Job::Index(b) | Job::Removal(b) => b,
        }
    }

    pub fn workspace(&self) -> &str {
        &self.batch().workspace
    }

    pub fn payloads(&self) -> &[NodePayload] {
        &self.batch().payloads
    }
}

/// Limits of one synchronous bulk request: element count and total bytes (octets).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkLimits {
    pub elements: usize,
    pub octets: usize,
}

impl Default for BulkLimits {
    fn default() -> Self {
        Self {
            elements: BulkDefaults::ELEMENTS,
            octets: BulkDefaults::OCTETS,
        }
    }
}

/// Indexer settings. Supplied once at construction; never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// When false, every event goes straight to the synchronous bulk indexer.
    pub enable_async_indexing: bool,
    /// When false, only events for the live workspace are accumulated; others are dropped.
    pub index_all_workspaces: bool,
    /// Element count at which accumulated work is submitted to the queue.
    pub queue_batch_size: usize,
    /// Limits of the underlying bulk request.
    pub bulk: BulkLimits,
    /// Postfix of the target index name, passed through to every job.
    pub index_name_postfix: String,
    /// Queue that jobs are submitted to.
    pub queue_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_async_indexing: true,
            index_all_workspaces: false,
            queue_batch_size: QUEUE_BATCH_SIZE,
            bulk: BulkLimits::default(),
            index_name_postfix: String::new(),
            queue_name: LIVE_QUEUE_NAME.to_string(),
        }
    }
}
