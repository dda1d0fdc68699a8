//! qindexer CLI: replay node events into the job queue; inspect pending jobs.

use anyhow::Result;
use clap::Parser;
use qindexer::engine::arg_parser::Cli;
use qindexer::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
