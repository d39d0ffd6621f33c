//! Test doubles for the prober, executor and change source seams.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use mountmirror::monitor::{BatchFuture, ChangeBatch, ChangeSource, ReadError};
use mountmirror::mount::MountProber;
use mountmirror::sync::{SyncError, SyncExecutor, SyncFuture};

/// One observable step, recorded in call order across all fakes sharing a
/// journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Read,
    Probe(PathBuf),
    Sync(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Step>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, step: Step) {
        self.0.lock().unwrap().push(step);
    }

    pub fn steps(&self) -> Vec<Step> {
        self.0.lock().unwrap().clone()
    }
}

/// Prober whose mount table is a shared set that tests mutate directly.
#[derive(Debug, Clone, Default)]
pub struct FakeProber {
    mounted: Arc<Mutex<HashSet<PathBuf>>>,
    probes: Arc<Mutex<Vec<PathBuf>>>,
    journal: Option<Journal>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mounted<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let prober = Self::new();
        for p in paths {
            prober.mount(p);
        }
        prober
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn mount(&self, path: impl Into<PathBuf>) {
        self.mounted.lock().unwrap().insert(path.into());
    }

    pub fn unmount(&self, path: impl AsRef<Path>) {
        self.mounted.lock().unwrap().remove(path.as_ref());
    }

    pub fn probes(&self) -> Vec<PathBuf> {
        self.probes.lock().unwrap().clone()
    }
}

impl MountProber for FakeProber {
    fn is_mounted(&self, path: &Path) -> bool {
        self.probes.lock().unwrap().push(path.to_path_buf());
        if let Some(journal) = &self.journal {
            journal.record(Step::Probe(path.to_path_buf()));
        }
        // Exact string match, like the real table.
        self.mounted
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.as_os_str() == path.as_os_str())
    }
}

type SyncHook = Box<dyn FnMut(&Path) + Send>;

/// Executor that records calls and fails for selected destinations.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
    failing: Arc<Mutex<HashSet<PathBuf>>>,
    latency: Option<Duration>,
    hook: Arc<Mutex<Option<SyncHook>>>,
    journal: Option<Journal>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Every sync takes this long before reporting its outcome.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Called with the destination at the start of every sync.
    pub fn with_hook(self, hook: impl FnMut(&Path) + Send + 'static) -> Self {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
        self
    }

    pub fn fail_for(&self, destination: impl Into<PathBuf>) {
        self.failing.lock().unwrap().insert(destination.into());
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn synced_destinations(&self) -> Vec<PathBuf> {
        self.calls().into_iter().map(|(_, d)| d).collect()
    }
}

impl SyncExecutor for FakeExecutor {
    fn sync<'a>(&'a mut self, source: &'a Path, destination: &'a Path) -> SyncFuture<'a> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((source.to_path_buf(), destination.to_path_buf()));
            if let Some(journal) = &self.journal {
                journal.record(Step::Sync(destination.to_path_buf()));
            }
            if let Some(hook) = self.hook.lock().unwrap().as_mut() {
                hook(destination);
            }

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            if self.failing.lock().unwrap().contains(destination) {
                return Err(SyncError::Exited {
                    program: "fake-mirror".to_string(),
                    code: Some(23),
                });
            }
            Ok(())
        })
    }
}

/// Change source that replays a fixed script of reads.
///
/// When the script runs out it either reports the stream as closed or, with
/// [`then_pending`](ScriptedChangeSource::then_pending), blocks forever so the
/// run can only end through shutdown.
#[derive(Debug, Default)]
pub struct ScriptedChangeSource {
    script: VecDeque<Result<ChangeBatch, ReadError>>,
    pending_when_exhausted: bool,
    reads: Arc<Mutex<usize>>,
    journal: Option<Journal>,
}

impl ScriptedChangeSource {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<ChangeBatch, ReadError>>,
    {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A source whose first read reports the stream closed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_batches<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = ChangeBatch>,
    {
        Self::new(batches.into_iter().map(Ok))
    }

    pub fn then_pending(mut self) -> Self {
        self.pending_when_exhausted = true;
        self
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Shared counter of reads performed, readable after the source moved.
    pub fn read_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.reads)
    }
}

impl ChangeSource for ScriptedChangeSource {
    fn next_batch(&mut self) -> BatchFuture<'_> {
        Box::pin(async move {
            *self.reads.lock().unwrap() += 1;
            if let Some(journal) = &self.journal {
                journal.record(Step::Read);
            }

            match self.script.pop_front() {
                Some(item) => item,
                None if self.pending_when_exhausted => std::future::pending().await,
                None => Err(ReadError::Closed),
            }
        })
    }
}

/// Change source fed live from a test through a channel. Dropping the sender
/// closes the stream.
#[derive(Debug)]
pub struct ChannelChangeSource {
    rx: mpsc::UnboundedReceiver<Result<ChangeBatch, ReadError>>,
}

pub fn channel_source() -> (
    mpsc::UnboundedSender<Result<ChangeBatch, ReadError>>,
    ChannelChangeSource,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, ChannelChangeSource { rx })
}

impl ChangeSource for ChannelChangeSource {
    fn next_batch(&mut self) -> BatchFuture<'_> {
        Box::pin(async move { self.rx.recv().await.unwrap_or(Err(ReadError::Closed)) })
    }
}
