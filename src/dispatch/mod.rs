// src/dispatch/mod.rs

//! Fan-out of one sync pass across every configured destination.
//!
//! Each destination is handled on its own: probe, then sync if mounted. An
//! unmounted destination is skipped without error, and a failed sync never
//! stops the destinations after it.

pub mod dispatcher;
pub mod outcome;

pub use dispatcher::Dispatcher;
pub use outcome::{DispatchSummary, SyncOutcome, SyncStatus};
