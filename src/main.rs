use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use replisync::cli::Args;
use replisync::sync::SyncEngine;
use replisync::{logging, scheduler};

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&args.log_file)
        .with_context(|| format!("failed to set up logging to {}", args.log_file.display()))?;

    let engine = SyncEngine::new(&args.source_folder, &args.replica_folder)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .context("failed to install interrupt handler")?;

    scheduler::run(&engine, Duration::from_secs(args.sync_interval), &shutdown);

    Ok(())
}
