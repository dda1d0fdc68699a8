//! Flush decisions from accumulated volume.
//!
//! Two independent checks: the queue batch size, and the bulk request limits. Both can fire
//! for the same volume; callers act on the queue check first.

use crate::types::BulkLimits;

/// Accumulated volume: entry count and serialized bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Volume {
    pub elements: usize,
    pub octets: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushAction {
    NoAction,
    /// Hand accumulated work to the job queue.
    QueueFlush,
    /// Push remaining work synchronously through the bulk indexer.
    BulkFlush,
}

/// Result of [`FlushPolicy::evaluate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushActions {
    pub queue: bool,
    pub bulk: bool,
}

impl FlushActions {
    pub fn is_empty(&self) -> bool {
        !self.queue && !self.bulk
    }

    /// Actions in execution order; a single `NoAction` when nothing is due.
    pub fn actions(&self) -> Vec<FlushAction> {
        if self.is_empty() {
            return vec![FlushAction::NoAction];
        }
        let mut out = Vec::with_capacity(2);
        if self.queue {
            out.push(FlushAction::QueueFlush);
        }
        if self.bulk {
            out.push(FlushAction::BulkFlush);
        }
        out
    }
}

/// Threshold evaluation. Holds only immutable limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushPolicy {
    queue_batch_size: usize,
    bulk: BulkLimits,
}

impl FlushPolicy {
    pub fn new(queue_batch_size: usize, bulk: BulkLimits) -> Self {
        Self {
            queue_batch_size,
            bulk,
        }
    }

    pub fn queue_batch_size(&self) -> usize {
        self.queue_batch_size
    }

    pub fn bulk_limits(&self) -> BulkLimits {
        self.bulk
    }

    pub fn queue_due(&self, volume: Volume) -> bool {
        volume.elements >= self.queue_batch_size
    }

    pub fn bulk_due(&self, volume: Volume) -> bool {
        volume.elements >= self.bulk.elements || volume.octets >= self.bulk.octets
    }

    pub fn evaluate(&self, volume: Volume) -> FlushActions {
        FlushActions {
            queue: self.queue_due(volume),
            bulk: self.bulk_due(volume),
        }
    }
}
