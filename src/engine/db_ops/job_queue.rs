//! Persistent job queue in the `jobs` table.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::collaborators::JobQueue;
use crate::types::{Job, JobBatch, JobKind, NodePayload};

use super::INSERT_JOB_SQL;

/// [`JobQueue`] that appends one row per job.
pub struct SqliteJobQueue {
    conn: Connection,
    submitted: usize,
}

impl SqliteJobQueue {
    pub fn new(conn: Connection) -> Self {
        Self { conn, submitted: 0 }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Jobs submitted through this instance.
    pub fn submitted(&self) -> usize {
        self.submitted
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl JobQueue for SqliteJobQueue {
    fn submit(&mut self, queue_name: &str, job: &Job) -> Result<()> {
        let batch = job.batch();
        let payload = serde_json::to_string(&batch.payloads).context("serialize job payloads")?;
        self.conn
            .execute(
                INSERT_JOB_SQL,
                (
                    queue_name,
                    job.kind().as_str(),
                    batch.workspace.as_str(),
                    batch.index_name_postfix.as_str(),
                    payload.as_str(),
                    unix_now(),
                ),
            )
            .context("insert job")?;
        self.submitted += 1;
        Ok(())
    }
}

/// A job row read back from the queue table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredJob {
    pub id: i64,
    pub queue_name: String,
    pub job: Job,
}

fn job_from_row(kind: &str, batch: JobBatch) -> Result<Job> {
    match kind {
        k if k == JobKind::Index.as_str() => Ok(Job::Index(batch)),
        k if k == JobKind::Remove.as_str() => Ok(Job::Removal(batch)),
        other => bail!("unknown job kind {other:?}"),
    }
}

/// Pending jobs in submission order, optionally only those of `queue_name`.
pub fn pending_jobs(conn: &Connection, queue_name: Option<&str>) -> Result<Vec<StoredJob>> {
    let mut stmt = conn.prepare(
        "SELECT id, queue_name, kind, workspace, index_name_postfix, payload FROM jobs
         WHERE ?1 IS NULL OR queue_name = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map([queue_name], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;
    let mut jobs = Vec::new();
    for row in rows {
        let (id, queue_name, kind, workspace, index_name_postfix, payload) = row?;
        let payloads: Vec<NodePayload> = serde_json::from_str(&payload)
            .with_context(|| format!("decode payloads of job {id}"))?;
        let job = job_from_row(
            &kind,
            JobBatch {
                index_name_postfix,
                workspace,
                payloads,
            },
        )?;
        jobs.push(StoredJob {
            id,
            queue_name,
            job,
        });
    }
    Ok(jobs)
}

/// Number of pending jobs, optionally only those of `queue_name`.
pub fn count_jobs(conn: &Connection, queue_name: Option<&str>) -> Result<usize> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM jobs WHERE ?1 IS NULL OR queue_name = ?1",
            [queue_name],
            |row| row.get(0),
        )
        .context("count jobs")?;
    Ok(n.max(0) as usize)
}
