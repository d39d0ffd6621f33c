// src/monitor/mod.rs

//! Change detection.
//!
//! Turns the raw stream of filesystem notifications for the watched directory
//! into "a batch worth syncing" signals:
//!
//! - [`event`] holds the event and batch types.
//! - [`source`] defines the [`ChangeSource`] seam (one call = one buffer read).
//! - [`monitor`] applies the coalescing policy: at most one signal per batch.
//! - [`notify_source`] is the production source built on `notify`.

pub mod event;
pub mod monitor;
pub mod notify_source;
pub mod source;

pub use event::{ChangeBatch, ChangeEvent, ChangeKind};
pub use monitor::{first_qualifying, ChangeMonitor, MonitorSignal};
pub use notify_source::NotifyChangeSource;
pub use source::{BatchFuture, ChangeSource, ReadError};
