//! Reader loop: parses event lines and sends them to event_tx, handles strict/skipped.

use crossbeam_channel::Sender;
use std::io::BufRead;
use std::thread::{self, JoinHandle};

use super::context::ReaderContext;
use super::events::{LineOutcome, NodeEvent, parse_line};

pub fn spawn_reader_thread<Rd>(
    reader: Rd,
    event_tx: Sender<NodeEvent>,
    ctx: ReaderContext,
) -> JoinHandle<usize>
where
    Rd: BufRead + Send + 'static,
{
    thread::spawn(move || {
        let iter = reader
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| match line {
                Ok(line) => parse_line(idx + 1, &line),
                Err(err) => Some(LineOutcome::Err {
                    line: idx + 1,
                    msg: format!("read error: {err}"),
                }),
            });
        run_reader_loop(event_tx, ctx, iter)
    })
}

/// Consume `iter`, send events to `event_tx`, handle bad lines (strict → set first_error and
/// stop; else log and push to skipped_lines). Drops `event_tx` when done. Returns events sent.
pub fn run_reader_loop<I>(event_tx: Sender<NodeEvent>, ctx: ReaderContext, iter: I) -> usize
where
    I: Iterator<Item = LineOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        match outcome {
            LineOutcome::Ok(event) => {
                if event_tx.send(event).is_err() {
                    break;
                }
                count += 1;
            }
            LineOutcome::Err { line, msg } => {
                if ctx.strict {
                    if let Ok(mut first) = ctx.first_error.lock() {
                        first.get_or_insert_with(|| format!("strict mode: line {line}: {msg}"));
                    }
                    break;
                }
                log::warn!("Skipping malformed event on line {}: {}", line, msg);
                if let Ok(mut skipped) = ctx.skipped_lines.lock() {
                    skipped.push((line, msg));
                }
            }
        }
    }
    drop(event_tx);
    count
}
