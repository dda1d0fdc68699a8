//! Replay a JSON-lines event stream through a dispatch coordinator.

use anyhow::{Context, Result};
use crossbeam_channel::RecvTimeoutError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::engine::collaborators::{BulkIndexer, JobQueue, PersistenceResolver};
use crate::engine::progress::{ProgressBar, create_counter, refresh_bar, update_progress_bar};
use crate::error::IndexerError;
use crate::types::JobKind;
use crate::utils::config::ReplayConsts;

use super::context::{ReplayHandles, ReplayOpts, start_reader};
use super::coordinator::{DispatchCoordinator, Routing};
use super::error_handler::check_for_initial_error_or_skipped_lines;
use super::events::NodeEvent;

/// What a replay did with the events it read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Events received from the reader.
    pub received: usize,
    /// Index events accumulated or indexed directly.
    pub indexed: usize,
    /// Remove events (including tombstoned index events) accumulated or removed directly.
    pub removed: usize,
    /// Events dropped by the workspace filter.
    pub dropped: usize,
    /// Malformed lines and events whose node could not be resolved, skipped.
    pub skipped: usize,
}

impl ReplayStats {
    fn record(&mut self, routing: Routing) {
        match routing {
            Routing::Accumulated(JobKind::Index) | Routing::Direct(JobKind::Index) => {
                self.indexed += 1
            }
            Routing::Accumulated(JobKind::Remove) | Routing::Direct(JobKind::Remove) => {
                self.removed += 1
            }
            Routing::Dropped => self.dropped += 1,
        }
    }
}

fn dispatch<B, Q, R>(
    coordinator: &mut DispatchCoordinator<B, Q, R>,
    event: &NodeEvent,
) -> Result<Routing, IndexerError>
where
    B: BulkIndexer,
    Q: JobQueue,
    R: PersistenceResolver,
{
    let target = event.target_workspace.as_deref();
    match event.op {
        JobKind::Index => coordinator.handle_index(&event.node, target),
        JobKind::Remove => coordinator.handle_remove(&event.node, target),
    }
}

/// Replay the events in the file at `path`. See [`replay_reader`].
pub fn replay_events<B, Q, R>(
    path: &Path,
    coordinator: &mut DispatchCoordinator<B, Q, R>,
    opts: &ReplayOpts,
) -> Result<ReplayStats>
where
    B: BulkIndexer,
    Q: JobQueue,
    R: PersistenceResolver,
{
    let file = File::open(path).with_context(|| format!("open events {}", path.display()))?;
    replay_reader(BufReader::new(file), coordinator, opts)
}

/// Feed every event from `reader` into `coordinator`, then flush it.
///
/// Lines are parsed on a reader thread; this thread owns the coordinator and does all adds and
/// flushes. Outside strict mode an event whose node cannot be resolved is skipped like a
/// malformed line. On cancel or on any other failed event, stops receiving, flushes what was
/// accumulated and returns an error.
pub fn replay_reader<Rd, B, Q, R>(
    reader: Rd,
    coordinator: &mut DispatchCoordinator<B, Q, R>,
    opts: &ReplayOpts,
) -> Result<ReplayStats>
where
    Rd: BufRead + Send + 'static,
    B: BulkIndexer,
    Q: JobQueue,
    R: PersistenceResolver,
{
    let ReplayHandles {
        event_rx,
        reader_handle,
        first_error,
        skipped_lines,
    } = start_reader(reader, opts);

    let bar: Option<ProgressBar> = opts.verbose.then(|| {
        let b = create_counter("Replaying");
        refresh_bar(&b);
        b
    });
    let recv_timeout = opts
        .cancel_check
        .as_ref()
        .map(|_| Duration::from_millis(ReplayConsts::CANCEL_POLL_MS));

    let mut stats = ReplayStats::default();
    let mut cancelled = false;
    let mut unresolved = 0_usize;
    let mut failure: Option<anyhow::Error> = None;
    loop {
        let event = match recv_timeout {
            Some(timeout) => match event_rx.recv_timeout(timeout) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => {
                    if opts
                        .cancel_check
                        .as_ref()
                        .is_some_and(|c| c.load(Ordering::Relaxed))
                    {
                        log::info!("Replay cancelled (Ctrl+C); flushing accumulated events...");
                        cancelled = true;
                        break;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match event_rx.recv() {
                Ok(event) => event,
                Err(_) => break,
            },
        };
        stats.received += 1;
        match dispatch(coordinator, &event) {
            Ok(routing) => stats.record(routing),
            Err(IndexerError::Projection { identifier, source }) if !opts.strict => {
                log::warn!("Skipping event {}: node {}: {:#}", stats.received, identifier, source);
                unresolved += 1;
            }
            Err(err) => {
                failure = Some(
                    anyhow::Error::new(err)
                        .context(format!("replay stopped at event {}", stats.received)),
                );
                break;
            }
        }
        if let Some(ref b) = bar
            && stats
                .received
                .is_multiple_of(ReplayConsts::PROGRESS_UPDATE_BATCH_SIZE)
        {
            update_progress_bar(b, ReplayConsts::PROGRESS_UPDATE_BATCH_SIZE);
        }
    }
    if let Some(ref b) = bar {
        let remainder = stats.received % ReplayConsts::PROGRESS_UPDATE_BATCH_SIZE;
        if remainder > 0 {
            update_progress_bar(b, remainder);
        }
    }

    let flushed = coordinator.flush();
    // Unblock the reader if it is waiting on a full channel.
    drop(event_rx);
    reader_handle
        .join()
        .map_err(|_| anyhow::anyhow!("reader thread panicked"))?;
    if let Some(err) = failure {
        if let Err(flush_err) = flushed {
            log::warn!("Flush after the failed event also failed: {flush_err:#}");
        }
        return Err(err);
    }
    flushed?;
    stats.skipped =
        check_for_initial_error_or_skipped_lines(opts, &first_error, &skipped_lines)? + unresolved;

    if cancelled {
        return Err(anyhow::anyhow!(
            "Replay cancelled by user; accumulated events were flushed"
        ));
    }
    log::info!(
        "Replayed {} events: {} index, {} remove, {} dropped, {} skipped",
        stats.received,
        stats.indexed,
        stats.removed,
        stats.dropped,
        stats.skipped
    );
    Ok(stats)
}
