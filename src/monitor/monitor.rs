// src/monitor/monitor.rs

//! Coalescing of raw change batches into sync signals.
//!
//! The monitor alternates between two states:
//!
//! - Idle: waiting on the source for the next batch.
//! - Draining: scanning one delivered batch, in delivery order, for the first
//!   qualifying event.
//!
//! The first qualifying event ends the scan and produces exactly one
//! `BatchReady`; the rest of that batch is discarded. A batch with nothing
//! qualifying produces no signal and the monitor goes straight back to Idle.
//! Bursts are therefore bounded to one sync per read, without timers. A burst
//! that straddles two reads still yields two signals.

use tracing::{debug, trace};

use crate::monitor::event::{ChangeBatch, ChangeEvent};
use crate::monitor::source::{ChangeSource, ReadError};

/// What the orchestrator should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorSignal {
    /// A batch contained at least one qualifying event.
    BatchReady {
        /// The first qualifying event in the batch.
        trigger: ChangeEvent,
        /// Total number of raw events in the batch, qualifying or not.
        batch_len: usize,
    },
    /// The source failed; monitoring cannot continue.
    ReadFailed(ReadError),
}

/// First event in delivery order that is worth a sync, if any.
pub fn first_qualifying(batch: &ChangeBatch) -> Option<&ChangeEvent> {
    batch.iter().find(|event| event.qualifies())
}

#[derive(Debug)]
pub struct ChangeMonitor<S: ChangeSource> {
    source: S,
    failed: Option<ReadError>,
}

impl<S: ChangeSource> ChangeMonitor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            failed: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Block until a batch qualifies or the source fails.
    ///
    /// After a failure every further call returns the same failure without
    /// touching the source again.
    pub async fn next_signal(&mut self) -> MonitorSignal {
        if let Some(err) = &self.failed {
            return MonitorSignal::ReadFailed(err.clone());
        }

        loop {
            // Idle.
            let batch = match self.source.next_batch().await {
                Ok(batch) => batch,
                Err(err) => {
                    debug!(error = %err, "change source failed");
                    self.failed = Some(err.clone());
                    return MonitorSignal::ReadFailed(err);
                }
            };

            // Draining.
            if let Some(trigger) = first_qualifying(&batch) {
                return MonitorSignal::BatchReady {
                    trigger: trigger.clone(),
                    batch_len: batch.len(),
                };
            }

            trace!(events = batch.len(), "batch had no qualifying events");
        }
    }
}
