//! Replay context: shared state between the reader thread and the dispatching thread.

use crossbeam_channel::{Receiver, bounded};
use std::io::BufRead;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::utils::config::ReplayConsts;

use super::events::NodeEvent;
use super::reader::spawn_reader_thread;

/// Skipped (line number, message) pairs.
pub type SkippedLines = Arc<Mutex<Vec<(usize, String)>>>;

/// Options for [`replay_events`](super::replay::replay_events).
#[derive(Clone, Debug, Default)]
pub struct ReplayOpts {
    /// Fail on the first malformed line instead of skipping it.
    pub strict: bool,
    /// Show a progress counter and list skipped lines.
    pub verbose: bool,
    /// When set, the receive loop checks this; if true, stops receiving, flushes and returns an error.
    pub cancel_check: Option<Arc<AtomicBool>>,
}

/// State the reader thread reports into.
pub struct ReaderContext {
    pub strict: bool,
    pub first_error: Arc<Mutex<Option<String>>>,
    pub skipped_lines: SkippedLines,
}

/// Handles returned by [`start_reader`]: receive events, then join `reader_handle`.
pub struct ReplayHandles {
    pub event_rx: Receiver<NodeEvent>,
    pub reader_handle: JoinHandle<usize>,
    pub first_error: Arc<Mutex<Option<String>>>,
    pub skipped_lines: SkippedLines,
}

/// Spawn the reader thread over `reader` with a bounded event channel.
pub fn start_reader<Rd>(reader: Rd, opts: &ReplayOpts) -> ReplayHandles
where
    Rd: BufRead + Send + 'static,
{
    let (event_tx, event_rx) = bounded::<NodeEvent>(ReplayConsts::CHANNEL_CAP);
    let first_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let skipped_lines: SkippedLines = Arc::new(Mutex::new(Vec::new()));
    let ctx = ReaderContext {
        strict: opts.strict,
        first_error: Arc::clone(&first_error),
        skipped_lines: Arc::clone(&skipped_lines),
    };
    let reader_handle = spawn_reader_thread(reader, event_tx, ctx);
    ReplayHandles {
        event_rx,
        reader_handle,
        first_error,
        skipped_lines,
    }
}
