// src/dispatch/outcome.rs

use std::path::PathBuf;

/// Result of one destination within one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    /// Not present in the mount table at probe time. Not an error.
    NotMounted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub destination: PathBuf,
    pub status: SyncStatus,
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, SyncStatus::Failed(_))
    }
}

/// Per-destination outcomes of one dispatch, in destination order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub outcomes: Vec<SyncOutcome>,
}

impl DispatchSummary {
    pub fn synced(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Synced))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::NotMounted))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, SyncStatus::Failed(_)))
    }

    /// True when no mounted destination failed. Skips do not count against it.
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&SyncStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}
