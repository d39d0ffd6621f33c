// src/engine/orchestrator.rs

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::dispatch::{DispatchSummary, Dispatcher, SyncStatus};
use crate::errors::{MirrorError, Result};
use crate::monitor::{ChangeMonitor, ChangeSource, MonitorSignal};
use crate::mount::MountProber;
use crate::sync::SyncExecutor;

use super::RunExit;

/// Owns the watch subscription (through the monitor), the destination list
/// and the dispatcher for the lifetime of one run.
///
/// Single logical thread of control: the loop either waits (for a change or
/// for the next mount poll) or performs a dispatch, never both.
pub struct Orchestrator<S: ChangeSource, P: MountProber, E: SyncExecutor> {
    source: PathBuf,
    destinations: Vec<PathBuf>,
    monitor: ChangeMonitor<S>,
    dispatcher: Dispatcher<P, E>,
    dispatches: u64,
    mount_poll: Option<Duration>,
    /// Last known mount state, parallel to `destinations`.
    mounted: Vec<bool>,
}

/// What woke the main loop.
enum Wake {
    Signal(MonitorSignal),
    MountPoll,
}

impl<S: ChangeSource, P: MountProber, E: SyncExecutor> fmt::Debug for Orchestrator<S, P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("source", &self.source)
            .field("destinations", &self.destinations)
            .field("dispatches", &self.dispatches)
            .field("mount_poll", &self.mount_poll)
            .finish_non_exhaustive()
    }
}

impl<S: ChangeSource, P: MountProber, E: SyncExecutor> Orchestrator<S, P, E> {
    pub fn new(
        source: impl Into<PathBuf>,
        destinations: Vec<PathBuf>,
        monitor: ChangeMonitor<S>,
        dispatcher: Dispatcher<P, E>,
    ) -> Result<Self> {
        if destinations.is_empty() {
            return Err(MirrorError::NoDestinations);
        }

        let mounted = vec![false; destinations.len()];
        Ok(Self {
            source: source.into(),
            destinations,
            monitor,
            dispatcher,
            dispatches: 0,
            mount_poll: None,
            mounted,
        })
    }

    /// Re-probe every destination at this interval while idle and sync the
    /// ones that became mounted since the last look. Off by default.
    pub fn with_mount_poll(mut self, interval: Duration) -> Self {
        self.mount_poll = (!interval.is_zero()).then_some(interval);
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destinations(&self) -> &[PathBuf] {
        &self.destinations
    }

    /// Number of dispatches performed so far, including the initial one.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches
    }

    pub fn dispatcher(&self) -> &Dispatcher<P, E> {
        &self.dispatcher
    }

    /// One full pass over every destination.
    pub async fn dispatch(&mut self) -> DispatchSummary {
        self.dispatches += 1;
        let summary = self
            .dispatcher
            .dispatch_all(&self.source, &self.destinations)
            .await;

        for (state, outcome) in self.mounted.iter_mut().zip(&summary.outcomes) {
            *state = outcome.status != SyncStatus::NotMounted;
        }
        summary
    }

    /// Probe every destination and sync only those that went from unmounted
    /// to mounted since the previous observation. Returns `None` when nothing
    /// newly appeared.
    pub async fn sync_newly_mounted(&mut self) -> Option<DispatchSummary> {
        let mut appeared = Vec::new();

        for (index, destination) in self.destinations.iter().enumerate() {
            let now = self.dispatcher.prober().is_mounted(destination);
            match (self.mounted[index], now) {
                (false, true) => {
                    info!("Drive {} mounted.", destination.display());
                    appeared.push(index);
                }
                (true, false) => info!("Drive {} unmounted.", destination.display()),
                _ => {}
            }
            self.mounted[index] = now;
        }

        if appeared.is_empty() {
            return None;
        }

        let targets: Vec<PathBuf> = appeared
            .iter()
            .map(|&index| self.destinations[index].clone())
            .collect();

        self.dispatches += 1;
        let summary = self.dispatcher.dispatch_all(&self.source, &targets).await;

        // The volume may have vanished again between the poll and its sync.
        for (&index, outcome) in appeared.iter().zip(&summary.outcomes) {
            self.mounted[index] = outcome.status != SyncStatus::NotMounted;
        }
        Some(summary)
    }

    /// Main loop.
    ///
    /// - Dispatches once before reading any change notification.
    /// - Then waits for `BatchReady` and dispatches again, to completion,
    ///   before resuming the wait.
    /// - With a mount poll configured, the wait also wakes on each poll tick
    ///   and syncs destinations that were plugged in since the last look.
    /// - Returns on a read failure, or when `shutdown` completes while
    ///   waiting. A dispatch in progress is never interrupted.
    pub async fn run<F>(&mut self, shutdown: F) -> RunExit
    where
        F: Future<Output = ()>,
    {
        info!(
            source = %self.source.display(),
            destinations = self.destinations.len(),
            "initial sync"
        );
        self.dispatch().await;

        tokio::pin!(shutdown);

        let mut ticker = self.mount_poll.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            let wake = tokio::select! {
                signal = self.monitor.next_signal() => Wake::Signal(signal),
                _ = next_tick(ticker.as_mut()) => Wake::MountPoll,
                _ = &mut shutdown => {
                    info!("shutdown requested; stopping monitor");
                    return RunExit::Shutdown;
                }
            };

            let signal = match wake {
                Wake::Signal(signal) => signal,
                Wake::MountPoll => {
                    if let Some(summary) = self.sync_newly_mounted().await {
                        debug!(synced = summary.synced(), "hot-plug sync finished");
                    }
                    continue;
                }
            };

            match signal {
                MonitorSignal::BatchReady { trigger, batch_len } => {
                    info!(
                        kind = ?trigger.kind,
                        entry = ?trigger.name(),
                        batch_len,
                        "Change detected in {}",
                        self.source.display()
                    );
                    self.dispatch().await;
                }
                MonitorSignal::ReadFailed(err) => {
                    error!(error = %err, "Error reading change notifications; stopping");
                    return RunExit::ReadFailed(err);
                }
            }
        }
    }
}

/// Resolves on the next poll tick, or never when polling is off.
async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
