// src/engine/mod.rs

//! Orchestration engine for mountmirror.
//!
//! Wires the change monitor to the dispatcher: one unconditional dispatch at
//! startup, then one dispatch per qualifying batch, strictly one after the
//! other. An optional mount poll adds a second wake-up that syncs volumes
//! plugged in while idle. While a dispatch runs nothing is read from the change source;
//! notifications wait in the source's buffer (bounded, so a very long sync
//! can lose individual raw events, though never the follow-up dispatch).

pub mod orchestrator;

pub use orchestrator::Orchestrator;

use crate::monitor::ReadError;

/// Why [`Orchestrator::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunExit {
    /// The shutdown future completed (Ctrl-C in production).
    Shutdown,
    /// The change source failed; monitoring cannot continue.
    ReadFailed(ReadError),
}

impl RunExit {
    /// Process exit status for this outcome.
    ///
    /// A read failure exits 1 unless `fail_on_read_error` is off, in which
    /// case it is treated like a normal termination.
    pub fn exit_code(&self, fail_on_read_error: bool) -> i32 {
        match self {
            RunExit::Shutdown => 0,
            RunExit::ReadFailed(_) if fail_on_read_error => 1,
            RunExit::ReadFailed(_) => 0,
        }
    }
}
