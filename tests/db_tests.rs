//! DB tests: SQLite job queue and bulk document store, standalone and behind the coordinator.

use qindexer::engine::{
    BulkIndexer, JobQueue, SqliteBulkIndexer, SqliteJobQueue, count_jobs, dimensions_hash,
    open_db, open_db_in_memory, pending_jobs,
};
use qindexer::report::{ListTarget, list_jobs, summarize_jobs};
use qindexer::{BulkLimits, Job, JobBatch, JobKind, NodeRecord, Settings};
use std::path::PathBuf;

fn node(id: &str, workspace: &str) -> NodeRecord {
    NodeRecord::new(id, "Neos.Neos:Document", &format!("/sites/demo/{id}"), workspace)
        .with_dimension("language", &["en"])
}

fn batch(workspace: &str, ids: &[&str]) -> JobBatch {
    JobBatch {
        index_name_postfix: String::new(),
        workspace: workspace.to_string(),
        payloads: ids
            .iter()
            .map(|id| {
                qindexer::engine::project(&qindexer::engine::KeyResolver, &node(id, workspace), None)
                    .unwrap()
            })
            .collect(),
    }
}

#[test]
fn test_job_queue_round_trip() {
    let mut queue = SqliteJobQueue::new(open_db_in_memory().unwrap());
    let index = Job::Index(batch("live", &["a", "b"]));
    let removal = Job::Removal(batch("live", &["c"]));
    queue.submit("live-queue", &index).unwrap();
    queue.submit("other-queue", &removal).unwrap();
    assert_eq!(queue.submitted(), 2);

    let jobs = pending_jobs(queue.connection(), None).unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].queue_name, "live-queue");
    assert_eq!(jobs[0].job, index);
    assert_eq!(jobs[1].job, removal);
    assert!(jobs[0].id < jobs[1].id);
}

#[test]
fn test_count_jobs_by_queue() {
    let mut queue = SqliteJobQueue::new(open_db_in_memory().unwrap());
    assert_eq!(count_jobs(queue.connection(), None).unwrap(), 0);
    queue.submit("q1", &Job::Index(batch("live", &["a"]))).unwrap();
    queue.submit("q1", &Job::Index(batch("live", &["b"]))).unwrap();
    queue.submit("q2", &Job::Removal(batch("live", &["c"]))).unwrap();
    assert_eq!(count_jobs(queue.connection(), None).unwrap(), 3);
    assert_eq!(count_jobs(queue.connection(), Some("q1")).unwrap(), 2);
    assert_eq!(pending_jobs(queue.connection(), Some("q2")).unwrap().len(), 1);
}

#[test]
fn test_summarize_jobs() {
    let mut queue = SqliteJobQueue::new(open_db_in_memory().unwrap());
    queue.submit("q", &Job::Index(batch("live", &["a", "b"]))).unwrap();
    queue.submit("q", &Job::Index(batch("live", &["c"]))).unwrap();
    queue.submit("q", &Job::Removal(batch("live", &["d"]))).unwrap();
    let summary = summarize_jobs(&pending_jobs(queue.connection(), None).unwrap());
    let index = summary[&("live".to_string(), JobKind::Index)];
    assert_eq!((index.jobs, index.payloads), (2, 3));
    let remove = summary[&("live".to_string(), JobKind::Remove)];
    assert_eq!((remove.jobs, remove.payloads), (1, 1));
}

#[test]
fn test_list_jobs_switches_to_results_file_above_threshold() {
    let mut queue = SqliteJobQueue::new(open_db_in_memory().unwrap());
    queue.submit("q", &Job::Index(batch("live", &["a"]))).unwrap();
    queue.submit("q", &Job::Removal(batch("live", &["b"]))).unwrap();
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("db_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let results = dir.join("list_jobs.results");
    let _ = std::fs::remove_file(&results);

    let jobs = pending_jobs(queue.connection(), None).unwrap();
    let mut out = Vec::new();
    assert_eq!(
        list_jobs(&jobs, &mut out, &results).unwrap(),
        ListTarget::Writer
    );
    let listed = String::from_utf8(out).unwrap();
    assert_eq!(listed.lines().count(), 2);
    assert!(listed.contains("q index live (1 payloads)"), "{listed}");
    assert!(!results.exists());

    for i in 0..=qindexer::utils::config::LIST_THRESHOLD {
        let id = format!("n{i}");
        queue
            .submit("q", &Job::Index(batch("live", &[id.as_str()])))
            .unwrap();
    }
    let jobs = pending_jobs(queue.connection(), None).unwrap();
    let mut out = Vec::new();
    assert_eq!(
        list_jobs(&jobs, &mut out, &results).unwrap(),
        ListTarget::ResultsFile(results.clone())
    );
    assert!(out.is_empty());
    let written = std::fs::read_to_string(&results).unwrap();
    assert_eq!(written.lines().count(), jobs.len());
}

#[test]
fn test_bulk_store_buffers_until_flush() {
    let limits = BulkLimits {
        elements: 100,
        octets: 1_000_000,
    };
    let mut bulk = SqliteBulkIndexer::new(open_db_in_memory().unwrap(), limits);
    bulk.index_node(&node("a", "live"), None).unwrap();
    bulk.index_node(&node("b", "user-demo"), Some("live")).unwrap();
    assert_eq!(bulk.buffered(), 2);
    assert_eq!(bulk.document_count(None).unwrap(), 0);

    bulk.flush().unwrap();
    assert_eq!(bulk.buffered(), 0);
    assert_eq!(bulk.document_count(Some("live")).unwrap(), 2);
    assert_eq!(bulk.stats().requests, 1);
    assert_eq!(bulk.stats().upserted, 2);

    bulk.remove_node(&node("a", "live"), None).unwrap();
    bulk.flush().unwrap();
    assert_eq!(bulk.document_count(None).unwrap(), 1);
    assert_eq!(bulk.stats().deleted, 1);
}

#[test]
fn test_bulk_store_auto_flush_on_element_limit() {
    let limits = BulkLimits {
        elements: 2,
        octets: 1_000_000,
    };
    let mut bulk = SqliteBulkIndexer::new(open_db_in_memory().unwrap(), limits);
    bulk.index_node(&node("a", "live"), None).unwrap();
    assert_eq!(bulk.stats().requests, 0);
    bulk.index_node(&node("b", "live"), None).unwrap();
    assert_eq!(bulk.stats().requests, 1);
    assert_eq!(bulk.document_count(None).unwrap(), 2);
}

#[test]
fn test_bulk_store_reset_discards_buffer() {
    let mut bulk = SqliteBulkIndexer::new(open_db_in_memory().unwrap(), BulkLimits::default());
    bulk.index_node(&node("a", "live"), None).unwrap();
    bulk.reset();
    bulk.flush().unwrap();
    assert_eq!(bulk.document_count(None).unwrap(), 0);
    assert_eq!(bulk.stats().requests, 0);
}

#[test]
fn test_dimensions_hash_distinguishes_variants() {
    let en = node("a", "live");
    let de = NodeRecord::new("a", "Neos.Neos:Document", "/sites/demo/a", "live")
        .with_dimension("language", &["de"]);
    let hash = dimensions_hash(&en.dimensions).unwrap();
    assert_ne!(hash, dimensions_hash(&de.dimensions).unwrap());
    assert_eq!(hash, dimensions_hash(&node("b", "live").dimensions).unwrap());
    let encoded = serde_json::to_vec(&en.dimensions).unwrap();
    assert_eq!(hash, blake3::hash(&encoded).to_hex().to_string());
}

#[test]
fn test_coordinator_into_sqlite_queue() {
    let settings = Settings {
        queue_batch_size: 3,
        ..Default::default()
    };
    let bulk = SqliteBulkIndexer::new(open_db_in_memory().unwrap(), settings.bulk);
    let queue = SqliteJobQueue::new(open_db_in_memory().unwrap());
    let mut c = qindexer::coordinator(settings, bulk, queue);
    for id in ["a", "b", "c", "d"] {
        c.handle_index(&node(id, "live"), None).unwrap();
    }
    c.flush().unwrap();

    let (bulk, queue, _) = c.into_parts();
    let jobs = pending_jobs(queue.connection(), None).unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].job.payloads().len(), 3);
    assert_eq!(jobs[1].job.payloads().len(), 1);
    assert_eq!(bulk.document_count(None).unwrap(), 0);
}

#[test]
fn test_coordinator_bulk_fallback_writes_documents() {
    let settings = Settings {
        queue_batch_size: 100,
        bulk: BulkLimits {
            elements: 2,
            octets: 1_000_000,
        },
        ..Default::default()
    };
    let bulk = SqliteBulkIndexer::new(open_db_in_memory().unwrap(), settings.bulk);
    let queue = SqliteJobQueue::new(open_db_in_memory().unwrap());
    let mut c = qindexer::coordinator(settings, bulk, queue);
    c.handle_index(&node("a", "live"), None).unwrap();
    c.handle_index(&node("b", "live"), None).unwrap();

    assert_eq!(c.total_count(), 0);
    assert_eq!(c.bulk().document_count(Some("live")).unwrap(), 2);
    assert_eq!(count_jobs(c.queue().connection(), None).unwrap(), 0);
}

#[test]
fn test_coordinator_bulk_fallback_stores_under_target_workspace() {
    let settings = Settings {
        queue_batch_size: 100,
        bulk: BulkLimits {
            elements: 1,
            octets: 1_000_000,
        },
        ..Default::default()
    };
    let bulk = SqliteBulkIndexer::new(open_db_in_memory().unwrap(), settings.bulk);
    let queue = SqliteJobQueue::new(open_db_in_memory().unwrap());
    let mut c = qindexer::coordinator(settings, bulk, queue);
    c.handle_index(&node("a", "user-demo"), Some("live")).unwrap();
    assert_eq!(c.bulk().document_count(Some("live")).unwrap(), 1);
    assert_eq!(c.bulk().document_count(Some("user-demo")).unwrap(), 0);
}

#[test]
fn test_open_db_file_creates_schema() {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("db_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let db_path = dir.join(".qindexer_schema");
    let _ = std::fs::remove_file(&db_path);
    let conn = open_db(&db_path).unwrap();
    assert_eq!(count_jobs(&conn, None).unwrap(), 0);
}
