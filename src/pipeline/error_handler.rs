use anyhow::Result;
use std::sync::{Arc, Mutex};

use super::context::{ReplayOpts, SkippedLines};

/// Check reader result: if strict and a first error was recorded, return it; otherwise log skipped lines.
/// Call after joining the reader. Returns the number of skipped lines.
pub fn check_for_initial_error_or_skipped_lines(
    opts: &ReplayOpts,
    first_error: &Arc<Mutex<Option<String>>>,
    skipped_lines: &SkippedLines,
) -> Result<usize> {
    if opts.strict
        && let Some(msg) = first_error.lock().ok().and_then(|mut e| e.take())
    {
        return Err(anyhow::anyhow!("{}", msg));
    }
    let skipped = skipped_lines.lock().map(|s| s.clone()).unwrap_or_default();
    if !skipped.is_empty() {
        log::warn!("Skipped {} malformed event lines", skipped.len());
        if opts.verbose {
            for (line, msg) in &skipped {
                eprintln!("  skipped line {}: {}", line, msg);
            }
        }
    }
    Ok(skipped.len())
}
