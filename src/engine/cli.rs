//! CLI command handlers: replay events into the queue, report pending jobs.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Settings;
use crate::engine::arg_parser::{Cli, Commands, JobsArgs, ReplayArgs, resolve_db_path};
use crate::engine::collaborators::KeyResolver;
use crate::engine::db_ops::{SqliteBulkIndexer, SqliteJobQueue, open_db};
use crate::pipeline::{DispatchCoordinator, ReplayOpts, replay_events};
use crate::report::report_jobs;
use crate::utils::{SettingsFile, apply_file_to_settings, load_settings_file, setup_logging};

/// Settings: defaults, then the settings file, then CLI flags.
fn setup_settings(args: &ReplayArgs, file: Option<&SettingsFile>) -> Settings {
    let mut settings = Settings::default();
    if let Some(file) = file {
        apply_file_to_settings(file, &mut settings);
    }
    if let Some(sync) = args.sync {
        settings.enable_async_indexing = !sync;
    }
    if let Some(all) = args.all_workspaces {
        settings.index_all_workspaces = all;
    }
    if let Some(n) = args.batch_size {
        settings.queue_batch_size = n;
    }
    if let Some(n) = args.bulk_elements {
        settings.bulk.elements = n;
    }
    if let Some(n) = args.bulk_octets {
        settings.bulk.octets = n;
    }
    if let Some(ref p) = args.postfix {
        settings.index_name_postfix = p.clone();
    }
    if let Some(ref q) = args.queue {
        settings.queue_name = q.clone();
    }
    settings
}

fn handle_replay(args: &ReplayArgs) -> Result<()> {
    let verbose = args.verbose.unwrap_or(false);
    setup_logging(verbose);
    let file = load_settings_file(Path::new("."));
    let settings = setup_settings(args, file.as_ref());
    let db_path = resolve_db_path(args.db.as_ref(), file.as_ref().and_then(|f| f.db_path()));
    debug!("Database: {}", db_path.display());

    let bulk = SqliteBulkIndexer::new(open_db(&db_path)?, settings.bulk);
    let queue = SqliteJobQueue::new(open_db(&db_path)?);
    let mut coordinator = DispatchCoordinator::new(settings, bulk, queue, KeyResolver);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let opts = ReplayOpts {
        strict: args.strict.unwrap_or(false),
        verbose,
        cancel_check: Some(cancel_requested),
    };
    replay_events(&args.events, &mut coordinator, &opts)?;

    let (bulk, queue, _) = coordinator.into_parts();
    let written = bulk.stats();
    info!(
        "Submitted {} jobs; bulk store wrote {} documents, removed {} in {} requests",
        queue.submitted(),
        written.upserted,
        written.deleted,
        written.requests
    );
    Ok(())
}

fn handle_jobs(args: &JobsArgs) -> Result<()> {
    setup_logging(args.verbose.unwrap_or(false));
    let file = load_settings_file(Path::new("."));
    let db_path = resolve_db_path(args.db.as_ref(), file.as_ref().and_then(|f| f.db_path()));
    let conn = open_db(&db_path)?;
    report_jobs(&conn, args.queue.as_deref(), args.list.unwrap_or(false))?;
    Ok(())
}

/// Run the selected subcommand.
pub fn handle_run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Replay(args) => handle_replay(args),
        Commands::Jobs(args) => handle_jobs(args),
    }
}
