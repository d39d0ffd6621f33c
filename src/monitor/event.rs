// src/monitor/event.rs

use std::path::{Path, PathBuf};

/// Kind of a raw change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Create,
    Delete,
    Modify,
    /// An entry was moved out of (or renamed away within) the watched tree.
    MovedFrom,
    /// An entry was moved into (or renamed within) the watched tree.
    MovedTo,
    /// Anything else: attribute changes, access, overflow markers, ...
    Other,
}

impl ChangeKind {
    /// Kinds that can change what a mirror must contain.
    pub fn is_qualifying(self) -> bool {
        !matches!(self, ChangeKind::Other)
    }
}

/// One raw notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Entry the event is about, relative to the watched directory. `None`
    /// when the event concerns the watched directory itself.
    pub name: Option<PathBuf>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, name: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
        }
    }

    /// An event about the watched directory itself (no entry name).
    pub fn unnamed(kind: ChangeKind) -> Self {
        Self { kind, name: None }
    }

    /// Length of the entry name in bytes; zero for unnamed events.
    pub fn name_len(&self) -> usize {
        self.name
            .as_deref()
            .map_or(0, |n| n.as_os_str().len())
    }

    pub fn name(&self) -> Option<&Path> {
        self.name.as_deref()
    }

    /// Worth a sync: names an entry and has a qualifying kind.
    pub fn qualifies(&self) -> bool {
        self.name_len() > 0 && self.kind.is_qualifying()
    }
}

/// Everything delivered by a single read of the change source, in delivery
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    events: Vec<ChangeEvent>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ChangeEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEvent> {
        self.events.iter()
    }
}

impl From<Vec<ChangeEvent>> for ChangeBatch {
    fn from(events: Vec<ChangeEvent>) -> Self {
        Self { events }
    }
}

impl Extend<ChangeEvent> for ChangeBatch {
    fn extend<T: IntoIterator<Item = ChangeEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ChangeBatch {
    type Item = &'a ChangeEvent;
    type IntoIter = std::slice::Iter<'a, ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
