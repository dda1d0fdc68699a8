//! Synchronous bulk indexer over the `documents` table.
//!
//! Operations are buffered and written in one transaction per flush. The buffer flushes itself
//! when it reaches the element or byte limit.

use anyhow::{Context, Result};
use rusqlite::{Connection, Statement};
use serde::Serialize;

use crate::engine::collaborators::BulkIndexer;
use crate::node::Node;
use crate::types::{BulkLimits, Dimensions, NodePayload};

use super::{DELETE_DOCUMENT_SQL, UPSERT_DOCUMENT_SQL};

/// Hex blake3 of the JSON-encoded dimensions. One document per node per dimension combination.
pub fn dimensions_hash(dimensions: &Dimensions) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    serde_json::to_writer(&mut hasher, dimensions).context("hash dimensions")?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Stored document body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentBody<'a> {
    identifier: &'a str,
    node_type: &'a str,
    path: &'a str,
    workspace: &'a str,
    dimensions: &'a Dimensions,
}

/// Key of a document row.
#[derive(Clone, Debug)]
struct DocumentKey {
    workspace: String,
    identifier: String,
    dimensions_hash: String,
}

#[derive(Clone, Debug)]
enum BulkOp {
    Upsert {
        key: DocumentKey,
        node_type: String,
        path: String,
        body: String,
    },
    Delete(DocumentKey),
}

impl BulkOp {
    fn octets(&self) -> usize {
        match self {
            BulkOp::Upsert { body, .. } => body.len(),
            BulkOp::Delete(key) => {
                key.workspace.len() + key.identifier.len() + key.dimensions_hash.len()
            }
        }
    }
}

/// Counters for what the store has written so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BulkStats {
    /// Bulk requests (transactions) committed.
    pub requests: usize,
    pub upserted: usize,
    pub deleted: usize,
}

/// [`BulkIndexer`] writing documents to SQLite.
pub struct SqliteBulkIndexer {
    conn: Connection,
    limits: BulkLimits,
    buffer: Vec<BulkOp>,
    buffered_octets: usize,
    stats: BulkStats,
}

fn upsert_op(
    workspace: &str,
    identifier: &str,
    node_type: &str,
    path: &str,
    dimensions: &Dimensions,
) -> Result<BulkOp> {
    let body = serde_json::to_string(&DocumentBody {
        identifier,
        node_type,
        path,
        workspace,
        dimensions,
    })
    .context("serialize document")?;
    Ok(BulkOp::Upsert {
        key: DocumentKey {
            workspace: workspace.to_string(),
            identifier: identifier.to_string(),
            dimensions_hash: dimensions_hash(dimensions)?,
        },
        node_type: node_type.to_string(),
        path: path.to_string(),
        body,
    })
}

fn delete_op(workspace: &str, identifier: &str, dimensions: &Dimensions) -> Result<BulkOp> {
    Ok(BulkOp::Delete(DocumentKey {
        workspace: workspace.to_string(),
        identifier: identifier.to_string(),
        dimensions_hash: dimensions_hash(dimensions)?,
    }))
}

/// Execute one buffered op (used by write_buffer).
fn execute_op(upsert: &mut Statement<'_>, delete: &mut Statement<'_>, op: &BulkOp) -> Result<()> {
    match op {
        BulkOp::Upsert {
            key,
            node_type,
            path,
            body,
        } => upsert
            .execute((
                key.workspace.as_str(),
                key.identifier.as_str(),
                key.dimensions_hash.as_str(),
                node_type.as_str(),
                path.as_str(),
                body.as_str(),
            ))
            .context("upsert document")?,
        BulkOp::Delete(key) => delete
            .execute((
                key.workspace.as_str(),
                key.identifier.as_str(),
                key.dimensions_hash.as_str(),
            ))
            .context("delete document")?,
    };
    Ok(())
}

/// Write `ops` in a single transaction.
fn write_buffer(conn: &mut Connection, ops: &[BulkOp]) -> Result<()> {
    let tx = conn.transaction().context("begin transaction")?;
    {
        let mut upsert = tx.prepare(UPSERT_DOCUMENT_SQL).context("prepare upsert")?;
        let mut delete = tx.prepare(DELETE_DOCUMENT_SQL).context("prepare delete")?;
        for op in ops {
            execute_op(&mut upsert, &mut delete, op)?;
        }
    }
    tx.commit().context("commit transaction")?;
    Ok(())
}

impl SqliteBulkIndexer {
    pub fn new(conn: Connection, limits: BulkLimits) -> Self {
        Self {
            conn,
            limits,
            buffer: Vec::new(),
            buffered_octets: 0,
            stats: BulkStats::default(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn stats(&self) -> BulkStats {
        self.stats
    }

    /// Operations waiting for the next flush.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of stored documents, optionally only those of `workspace`.
    pub fn document_count(&self, workspace: Option<&str>) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE ?1 IS NULL OR workspace = ?1",
                [workspace],
                |row| row.get(0),
            )
            .context("count documents")?;
        Ok(n.max(0) as usize)
    }

    fn push(&mut self, op: BulkOp) -> Result<()> {
        self.buffered_octets += op.octets();
        self.buffer.push(op);
        if self.buffer.len() >= self.limits.elements || self.buffered_octets >= self.limits.octets
        {
            log::debug!(
                "Bulk buffer full ({} ops, {} octets); writing",
                self.buffer.len(),
                self.buffered_octets
            );
            self.flush()?;
        }
        Ok(())
    }
}

impl BulkIndexer for SqliteBulkIndexer {
    fn index_node(&mut self, node: &dyn Node, target_workspace: Option<&str>) -> Result<()> {
        let workspace = target_workspace.unwrap_or_else(|| node.workspace_name());
        let op = upsert_op(
            workspace,
            node.identifier(),
            node.node_type(),
            node.path(),
            node.dimensions(),
        )?;
        self.push(op)
    }

    fn remove_node(&mut self, node: &dyn Node, target_workspace: Option<&str>) -> Result<()> {
        let workspace = target_workspace.unwrap_or_else(|| node.workspace_name());
        self.push(delete_op(workspace, node.identifier(), node.dimensions())?)
    }

    fn index_payload(&mut self, workspace: &str, payload: &NodePayload) -> Result<()> {
        let op = upsert_op(
            workspace,
            &payload.identifier,
            &payload.node_type,
            &payload.path,
            &payload.dimensions,
        )?;
        self.push(op)
    }

    fn remove_payload(&mut self, workspace: &str, payload: &NodePayload) -> Result<()> {
        self.push(delete_op(
            workspace,
            &payload.identifier,
            &payload.dimensions,
        )?)
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        write_buffer(&mut self.conn, &self.buffer)?;
        for op in &self.buffer {
            match op {
                BulkOp::Upsert { .. } => self.stats.upserted += 1,
                BulkOp::Delete(_) => self.stats.deleted += 1,
            }
        }
        self.stats.requests += 1;
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.buffered_octets = 0;
    }

    fn limits(&self) -> BulkLimits {
        self.limits
    }
}
