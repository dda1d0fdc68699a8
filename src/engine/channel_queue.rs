//! In-process job queue over a crossbeam channel.

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::engine::collaborators::JobQueue;
use crate::types::Job;

/// A job as seen by the consumer: target queue plus the job itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedJob {
    pub queue_name: String,
    pub job: Job,
}

/// [`JobQueue`] that sends every submitted job to a channel, in submission order.
pub struct ChannelJobQueue {
    tx: Sender<QueuedJob>,
}

impl ChannelJobQueue {
    pub fn new(tx: Sender<QueuedJob>) -> Self {
        Self { tx }
    }

    /// Queue plus the receiving end of an unbounded channel.
    pub fn unbounded() -> (Self, Receiver<QueuedJob>) {
        let (tx, rx) = unbounded();
        (Self::new(tx), rx)
    }
}

impl JobQueue for ChannelJobQueue {
    fn submit(&mut self, queue_name: &str, job: &Job) -> Result<()> {
        self.tx
            .send(QueuedJob {
                queue_name: queue_name.to_string(),
                job: job.clone(),
            })
            .map_err(|_| anyhow!("job channel closed"))
    }
}
