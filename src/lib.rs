// src/lib.rs

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod monitor;
pub mod mount;
pub mod sync;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::dispatch::Dispatcher;
use crate::engine::Orchestrator;
use crate::errors::{MirrorError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::monitor::{ChangeMonitor, NotifyChangeSource};
use crate::mount::{MountProber, MountTableProber};
use crate::sync::{MirrorCommand, RsyncExecutor};

/// High-level entry point used by `main.rs`. Returns the process exit status.
///
/// This wires together:
/// - config loading and source validation
/// - mount prober + mirror executor behind the dispatcher
/// - the change subscription (skipped with `--once`)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref())?;

    if args.destinations.is_empty() {
        return Err(MirrorError::NoDestinations);
    }

    let source = resolve_source(&RealFileSystem, &args.source)?;
    let prober = MountTableProber::new(cfg.mount.table.clone(), cfg.mount.matching);
    let command = MirrorCommand::from_config(&cfg.sync);

    if args.dry_run {
        print_dry_run(&source, &args.destinations, &prober, &command);
        return Ok(0);
    }

    let mut dispatcher = Dispatcher::new(prober, RsyncExecutor::new(command));

    if args.once {
        let summary = dispatcher.dispatch_all(&source, &args.destinations).await;
        info!(
            synced = summary.synced(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "single sync pass complete"
        );
        return Ok(if summary.all_succeeded() { 0 } else { 1 });
    }

    // Subscribe before the initial sync so nothing written during it is missed.
    let change_source =
        NotifyChangeSource::watch(&source, cfg.watch.recursive, cfg.watch.buffer_capacity)?;

    let mut orchestrator = Orchestrator::new(
        source,
        args.destinations,
        ChangeMonitor::new(change_source),
        dispatcher,
    )?
    .with_mount_poll(cfg.mount.poll_interval());

    let exit = orchestrator.run(ctrl_c()).await;
    info!(dispatches = orchestrator.dispatch_count(), ?exit, "monitor stopped");

    Ok(exit.exit_code(cfg.runtime.fail_on_read_error))
}

/// Turn the SOURCE argument into the absolute, canonical watch target.
///
/// The path must exist and be a directory.
pub fn resolve_source(fs: &dyn FileSystem, source: &Path) -> Result<PathBuf> {
    let resolved = fs
        .canonicalize(source)
        .map_err(|_| MirrorError::SourceNotDirectory(source.to_path_buf()))?;

    if !fs.is_dir(&resolved) {
        return Err(MirrorError::SourceNotDirectory(source.to_path_buf()));
    }

    Ok(resolved)
}

/// Completes on Ctrl-C. If the signal handler cannot be installed, never
/// completes and the process relies on default signal handling.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Dry-run output: source, destinations with live mount status, command.
fn print_dry_run(
    source: &Path,
    destinations: &[PathBuf],
    prober: &MountTableProber,
    command: &MirrorCommand,
) {
    println!("mountmirror dry-run");
    println!("  source: {}", source.display());
    println!("  mount table: {}", prober.table_path().display());
    println!();

    println!("destinations ({}):", destinations.len());
    for destination in destinations {
        if prober.is_mounted(destination) {
            println!("  - {} (mounted)", destination.display());
            println!("      cmd: {}", command.display(source, destination));
        } else {
            println!("  - {} (not mounted; would be skipped)", destination.display());
        }
    }
}
