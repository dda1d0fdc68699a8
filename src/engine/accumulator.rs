//! Per-workspace pending sets for index and removal payloads.

use indexmap::IndexMap;

use crate::types::NodePayload;

/// A stored payload plus its serialized size, measured once on insert.
#[derive(Clone, Debug)]
struct Pending {
    payload: NodePayload,
    octets: usize,
}

/// Node identifier → pending payload, in first-insertion order.
type PendingSet = IndexMap<String, Pending>;

/// Workspace name → payloads in insertion order.
pub type WorkspaceBatches = IndexMap<String, Vec<NodePayload>>;

/// Everything that was pending at drain time.
#[derive(Debug, Default)]
pub struct Drained {
    pub index: WorkspaceBatches,
    pub removal: WorkspaceBatches,
}

impl Drained {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() && self.removal.is_empty()
    }
}

/// Accumulated index and removal work, keyed by workspace then node identifier.
///
/// A node identifier holds at most one slot per kind per workspace; a later add overwrites
/// the payload but keeps the slot's position. Entries only leave through [`drain_all`](Self::drain_all)
/// or [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct WorkspaceAccumulator {
    to_index: IndexMap<String, PendingSet>,
    to_remove: IndexMap<String, PendingSet>,
}

fn insert(
    sets: &mut IndexMap<String, PendingSet>,
    workspace: &str,
    payload: NodePayload,
) -> serde_json::Result<()> {
    let octets = payload.serialized_len()?;
    sets.entry(workspace.to_string())
        .or_default()
        .insert(payload.identifier.clone(), Pending { payload, octets });
    Ok(())
}

fn count(sets: &IndexMap<String, PendingSet>) -> usize {
    sets.values().map(IndexMap::len).sum()
}

fn octets(sets: &IndexMap<String, PendingSet>) -> usize {
    sets.values()
        .flat_map(IndexMap::values)
        .map(|p| p.octets)
        .sum()
}

fn into_batches(sets: IndexMap<String, PendingSet>) -> WorkspaceBatches {
    sets.into_iter()
        .map(|(workspace, set)| (workspace, set.into_values().map(|p| p.payload).collect()))
        .collect()
}

impl WorkspaceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails only if the payload cannot be measured; nothing is stored then.
    pub fn add_to_index(&mut self, workspace: &str, payload: NodePayload) -> serde_json::Result<()> {
        insert(&mut self.to_index, workspace, payload)
    }

    pub fn add_to_removal(
        &mut self,
        workspace: &str,
        payload: NodePayload,
    ) -> serde_json::Result<()> {
        insert(&mut self.to_remove, workspace, payload)
    }

    pub fn total_index_count(&self) -> usize {
        count(&self.to_index)
    }

    pub fn total_removal_count(&self) -> usize {
        count(&self.to_remove)
    }

    pub fn total_count(&self) -> usize {
        self.total_index_count() + self.total_removal_count()
    }

    /// Sum of serialized payload sizes across both kinds.
    pub fn total_bytes(&self) -> usize {
        octets(&self.to_index) + octets(&self.to_remove)
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Take everything out, leaving the accumulator empty.
    pub fn drain_all(&mut self) -> Drained {
        Drained {
            index: into_batches(std::mem::take(&mut self.to_index)),
            removal: into_batches(std::mem::take(&mut self.to_remove)),
        }
    }

    pub fn clear(&mut self) {
        self.to_index.clear();
        self.to_remove.clear();
    }
}
