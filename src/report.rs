//! Pending job summary for the SQLite queue.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rusqlite::Connection;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::engine::db_ops::{StoredJob, pending_jobs};
use crate::types::JobKind;
use crate::utils::Colors;
use crate::utils::config::{LIST_THRESHOLD, PackagePaths};

/// Jobs and payloads pending for one workspace and kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JobCounts {
    pub jobs: usize,
    pub payloads: usize,
}

/// (workspace, kind) → counts, in order of first appearance.
pub type JobSummary = IndexMap<(String, JobKind), JobCounts>;

pub fn summarize_jobs(jobs: &[StoredJob]) -> JobSummary {
    let mut summary = JobSummary::new();
    for stored in jobs {
        let counts = summary
            .entry((stored.job.workspace().to_string(), stored.job.kind()))
            .or_default();
        counts.jobs += 1;
        counts.payloads += stored.job.payloads().len();
    }
    summary
}

fn job_line(stored: &StoredJob) -> String {
    format!(
        "#{} {} {} {} ({} payloads)",
        stored.id,
        stored.queue_name,
        stored.job.kind(),
        stored.job.workspace(),
        stored.job.payloads().len()
    )
}

/// Where a job listing went.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListTarget {
    Writer,
    ResultsFile(PathBuf),
}

/// List jobs to `out`, or to `results_path` when there are more than [`LIST_THRESHOLD`].
pub fn list_jobs<W: Write>(
    jobs: &[StoredJob],
    out: &mut W,
    results_path: &Path,
) -> Result<ListTarget> {
    if jobs.len() <= LIST_THRESHOLD {
        for stored in jobs {
            writeln!(out, "  {}", job_line(stored)).context("write job list")?;
        }
        return Ok(ListTarget::Writer);
    }
    let display = results_path.display();
    let mut file =
        std::fs::File::create(results_path).with_context(|| format!("create {display}"))?;
    for stored in jobs {
        writeln!(file, "{}", job_line(stored)).with_context(|| format!("write {display}"))?;
    }
    log::info!("{} jobs listed in {}", jobs.len(), display);
    Ok(ListTarget::ResultsFile(results_path.to_path_buf()))
}

/// Print pending jobs per workspace/kind; with `list`, every job too.
pub fn report_jobs(conn: &Connection, queue_name: Option<&str>, list: bool) -> Result<JobSummary> {
    let jobs = pending_jobs(conn, queue_name)?;
    let summary = summarize_jobs(&jobs);
    if summary.is_empty() {
        log::info!("No pending jobs.");
        return Ok(summary);
    }
    log::info!("{} pending jobs", jobs.len());
    for ((workspace, kind), counts) in &summary {
        println!(
            "{} | {} | jobs: {} | payloads: {}",
            Colors::workspace(workspace),
            Colors::kind(*kind),
            counts.jobs,
            counts.payloads
        );
    }
    if list {
        let results_path = Path::new(PackagePaths::get().results_filename());
        list_jobs(&jobs, &mut std::io::stdout().lock(), results_path)?;
    }
    Ok(summary)
}
