// src/monitor/notify_source.rs

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{MirrorError, Result};
use crate::monitor::event::{ChangeBatch, ChangeEvent, ChangeKind};
use crate::monitor::source::{BatchFuture, ChangeSource, ReadError};

/// Message forwarded from the blocking `notify` callback into the async world.
#[derive(Debug)]
enum RawMessage {
    Event(Event),
    Error(notify::Error),
}

/// Production change source backed by `notify` (inotify on Linux).
///
/// The watcher thread pushes raw events into a bounded channel. A "read"
/// waits for the first event and then drains whatever else is already
/// queued; that is one batch. Events that arrive while the orchestrator is
/// busy syncing pile up in the channel and come out as a single batch.
///
/// Dropping this value stops watching.
pub struct NotifyChangeSource {
    root: PathBuf,
    rx: mpsc::Receiver<RawMessage>,
    dropped: Arc<AtomicU64>,
    dropped_total: u64,
    _watcher: RecommendedWatcher,
}

impl std::fmt::Debug for NotifyChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyChangeSource")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl NotifyChangeSource {
    /// Subscribe to changes under `root`.
    ///
    /// `root` should already be canonical so event paths can be made
    /// relative to it. Fails if the watcher cannot be created or the path
    /// cannot be watched.
    pub fn watch(root: impl Into<PathBuf>, recursive: bool, capacity: usize) -> Result<Self> {
        let root = root.into();
        let (tx, rx) = mpsc::channel::<RawMessage>(capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));

        let mut watcher = RecommendedWatcher::new(
            {
                let dropped = Arc::clone(&dropped);
                move |res: notify::Result<Event>| match res {
                    Ok(event) => {
                        if let Err(mpsc::error::TrySendError::Full(_)) =
                            tx.try_send(RawMessage::Event(event))
                        {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    Err(err) => {
                        // Runs on the watcher thread, outside the runtime, so
                        // waiting for room is allowed.
                        let _ = tx.blocking_send(RawMessage::Error(err));
                    }
                }
            },
            Config::default(),
        )
        .map_err(|source| MirrorError::Watch {
            path: root.clone(),
            source,
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&root, mode)
            .map_err(|source| MirrorError::Watch {
                path: root.clone(),
                source,
            })?;

        info!("Watching {} for changes...", root.display());

        Ok(Self {
            root,
            rx,
            dropped,
            dropped_total: 0,
            _watcher: watcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw events lost to a full buffer since the watch started.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_total + self.dropped.load(Ordering::Relaxed)
    }

    fn absorb(&self, message: RawMessage, batch: &mut ChangeBatch) -> std::result::Result<(), ReadError> {
        match message {
            RawMessage::Event(event) => {
                batch.extend(events_from_notify(&self.root, &event));
                Ok(())
            }
            RawMessage::Error(err) if is_fatal(&err) => Err(ReadError::Watch(err.to_string())),
            RawMessage::Error(err) => {
                warn!(error = %err, "transient watch error; continuing");
                Ok(())
            }
        }
    }
}

impl ChangeSource for NotifyChangeSource {
    fn next_batch(&mut self) -> BatchFuture<'_> {
        Box::pin(async move {
            let first = self.rx.recv().await.ok_or(ReadError::Closed)?;

            let mut batch = ChangeBatch::new();
            self.absorb(first, &mut batch)?;
            while let Ok(message) = self.rx.try_recv() {
                self.absorb(message, &mut batch)?;
            }

            let dropped = self.dropped.swap(0, Ordering::Relaxed);
            if dropped > 0 {
                self.dropped_total += dropped;
                warn!(dropped, "event buffer was full; some raw events were dropped");
            }

            debug!(events = batch.len(), "read change batch");
            Ok(batch)
        })
    }
}

/// Convert one `notify` event into per-path change events.
///
/// A rename reported with both paths yields a `MovedFrom` for the old path
/// and a `MovedTo` for the new one.
pub fn events_from_notify(root: &Path, event: &Event) -> Vec<ChangeEvent> {
    if event.paths.is_empty() {
        return vec![ChangeEvent::unnamed(kind_of(&event.kind))];
    }

    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind {
        return event
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let kind = if i == 0 {
                    ChangeKind::MovedFrom
                } else {
                    ChangeKind::MovedTo
                };
                named_event(root, kind, path)
            })
            .collect();
    }

    let kind = kind_of(&event.kind);
    event
        .paths
        .iter()
        .map(|path| named_event(root, kind, path))
        .collect()
}

fn named_event(root: &Path, kind: ChangeKind, path: &Path) -> ChangeEvent {
    let name = match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => None,
        Ok(rel) => Some(rel.to_path_buf()),
        Err(_) => Some(path.to_path_buf()),
    };
    ChangeEvent { kind, name }
}

/// Map `notify`'s event taxonomy onto the kinds the monitor cares about.
///
/// Attribute-only changes and access events are `Other`, as are queue
/// overflow markers (`notify` reports those as `EventKind::Other`).
pub fn kind_of(kind: &EventKind) -> ChangeKind {
    match kind {
        EventKind::Create(_) => ChangeKind::Create,
        EventKind::Remove(_) => ChangeKind::Delete,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            ChangeKind::Modify
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => ChangeKind::MovedFrom,
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::MovedTo,
        EventKind::Modify(ModifyKind::Metadata(_)) | EventKind::Modify(ModifyKind::Other) => {
            ChangeKind::Other
        }
        EventKind::Access(_) | EventKind::Any | EventKind::Other => ChangeKind::Other,
    }
}

/// Whether a watcher error ends monitoring.
///
/// A path or watch vanishing (a subdirectory deleted before its watch could
/// be added) and hitting the watch limit only affect part of the tree and are
/// logged. Anything else means the notification stream itself is broken.
pub fn is_fatal(err: &notify::Error) -> bool {
    !matches!(
        err.kind,
        notify::ErrorKind::PathNotFound
            | notify::ErrorKind::WatchNotFound
            | notify::ErrorKind::MaxFilesWatch
    )
}
