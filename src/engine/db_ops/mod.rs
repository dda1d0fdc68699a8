//! SQLite-backed collaborators: schema, open, job queue table and document store.

mod bulk_store;
mod connection;
mod job_queue;

pub use bulk_store::{BulkStats, SqliteBulkIndexer, dimensions_hash};
pub use connection::{open_db, open_db_in_memory};
pub use job_queue::{SqliteJobQueue, StoredJob, count_jobs, pending_jobs};

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// Insert statement for the jobs table.
pub(crate) const INSERT_JOB_SQL: &str = "INSERT INTO jobs (queue_name, kind, workspace, index_name_postfix, payload, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Upsert statement for the documents table.
pub(crate) const UPSERT_DOCUMENT_SQL: &str = "INSERT OR REPLACE INTO documents (workspace, identifier, dimensions_hash, node_type, path, body) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Delete statement for the documents table.
pub(crate) const DELETE_DOCUMENT_SQL: &str =
    "DELETE FROM documents WHERE workspace = ?1 AND identifier = ?2 AND dimensions_hash = ?3";

/// Schema for jobs and documents tables.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    queue_name TEXT NOT NULL,
    kind TEXT NOT NULL,
    workspace TEXT NOT NULL,
    index_name_postfix TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_jobs_queue ON jobs(queue_name, id);

CREATE TABLE IF NOT EXISTS documents (
    workspace TEXT NOT NULL,
    identifier TEXT NOT NULL,
    dimensions_hash TEXT NOT NULL,
    node_type TEXT NOT NULL,
    path TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (workspace, identifier, dimensions_hash)
);
"#;
