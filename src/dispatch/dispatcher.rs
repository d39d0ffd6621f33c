// src/dispatch/dispatcher.rs

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::dispatch::outcome::{DispatchSummary, SyncOutcome, SyncStatus};
use crate::mount::MountProber;
use crate::sync::SyncExecutor;

/// Probes each destination and mirrors the source onto the mounted ones.
///
/// Destinations are processed strictly in order, one at a time. The probe for
/// a destination happens immediately before its own sync, never up front for
/// the whole list, so a volume that disappears during an earlier destination's
/// transfer is not synced on a stale reading.
pub struct Dispatcher<P: MountProber, E: SyncExecutor> {
    prober: P,
    executor: E,
}

impl<P: MountProber, E: SyncExecutor> std::fmt::Debug for Dispatcher<P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl<P: MountProber, E: SyncExecutor> Dispatcher<P, E> {
    pub fn new(prober: P, executor: E) -> Self {
        Self { prober, executor }
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run one full pass over `destinations`.
    ///
    /// Never fails as a whole: every problem is recorded in the returned
    /// summary against the destination it belongs to.
    pub async fn dispatch_all(
        &mut self,
        source: &Path,
        destinations: &[PathBuf],
    ) -> DispatchSummary {
        let mut outcomes = Vec::with_capacity(destinations.len());

        for destination in destinations {
            let status = self.dispatch_one(source, destination).await;
            outcomes.push(SyncOutcome {
                destination: destination.clone(),
                status,
            });
        }

        let summary = DispatchSummary { outcomes };
        debug!(
            synced = summary.synced(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            "dispatch finished"
        );
        summary
    }

    async fn dispatch_one(&mut self, source: &Path, destination: &Path) -> SyncStatus {
        if !self.prober.is_mounted(destination) {
            debug!(destination = %destination.display(), "destination not mounted; skipping");
            return SyncStatus::NotMounted;
        }

        match self.executor.sync(source, destination).await {
            Ok(()) => {
                info!(
                    "Successfully synced {} to {}",
                    source.display(),
                    destination.display()
                );
                SyncStatus::Synced
            }
            Err(err) => {
                warn!(
                    error = %err,
                    "Error syncing {} to {}",
                    source.display(),
                    destination.display()
                );
                SyncStatus::Failed(err.to_string())
            }
        }
    }
}
