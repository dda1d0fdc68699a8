//! Application configuration constants.
//! Defaults and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    db_filename: String,
    settings_filename: String,
    results_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                db_filename: format!(".{pkg}"),
                settings_filename: format!(".{pkg}.toml"),
                results_filename: format!("{pkg}.results"),
            }
        })
    }

    /// SQLite file holding the job queue and the document store (e.g. `.qindexer`).
    pub fn db_filename(&self) -> &str {
        &self.db_filename
    }

    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    pub fn results_filename(&self) -> &str {
        &self.results_filename
    }
}

// ---- Workspaces / queue ----

/// The published workspace. Only this one is indexed unless all workspaces are enabled.
pub const LIVE_WORKSPACE_NAME: &str = "live";

/// Queue that live indexing jobs go to.
pub const LIVE_QUEUE_NAME: &str = "Flowpack.ElasticSearch.ContentRepositoryQueueIndexer.Live";

/// Accumulated element count at which jobs are submitted to the queue.
pub const QUEUE_BATCH_SIZE: usize = 500;

// ---- Bulk request ----

/// Default limits of one synchronous bulk request.
pub struct BulkDefaults;

impl BulkDefaults {
    pub const ELEMENTS: usize = 500;
    /// 40 MB.
    pub const OCTETS: usize = 40_000_000;
}

// ---- Replay ----

/// Event replay tuning.
pub struct ReplayConsts;

impl ReplayConsts {
    /// Bounded channel between the reader thread and the coordinator.
    pub const CHANNEL_CAP: usize = 10_000;
    /// How often the receive loop wakes up to check for Ctrl+C (milliseconds).
    pub const CANCEL_POLL_MS: u64 = 200;
    /// Progress bar is advanced every this many events.
    pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 100;
}

// ---- Job listing ----

/// With `jobs --list`, if more jobs than this are pending, write them to the results file instead of stdout.
pub const LIST_THRESHOLD: usize = 100;
