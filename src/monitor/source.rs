// src/monitor/source.rs

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::monitor::event::ChangeBatch;

/// A failed read from the change source. Always fatal to monitoring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("change notification stream closed")]
    Closed,

    #[error("error reading change notifications: {0}")]
    Watch(String),
}

pub type BatchFuture<'a> = Pin<Box<dyn Future<Output = Result<ChangeBatch, ReadError>> + Send + 'a>>;

/// Source of raw change batches for one watched directory.
///
/// Each call to [`next_batch`](ChangeSource::next_batch) corresponds to one
/// blocking read of the notification buffer: it waits until at least one
/// event is available and returns everything delivered together. The stream
/// is not restartable; once it returns an error it is done.
pub trait ChangeSource: Send {
    fn next_batch(&mut self) -> BatchFuture<'_>;
}
