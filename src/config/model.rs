// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::MountMatch;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [mount]
/// table = "/proc/self/mounts"
/// matching = "exact"
/// poll_interval_ms = 5000
///
/// [sync]
/// program = "rsync"
/// args = ["-a", "--delete"]
///
/// [watch]
/// recursive = true
/// buffer_capacity = 4096
///
/// [runtime]
/// fail_on_read_error = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMirrorConfig {
    #[serde(default)]
    pub mount: MountSection,

    #[serde(default)]
    pub sync: SyncSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawMirrorConfig>`
/// (see `config::validate`) or [`MirrorConfig::default`].
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub mount: MountSection,
    pub sync: SyncSection,
    pub watch: WatchSection,
    pub runtime: RuntimeSection,
}

impl MirrorConfig {
    pub(crate) fn new_unchecked(raw: RawMirrorConfig) -> Self {
        Self {
            mount: raw.mount,
            sync: raw.sync,
            watch: raw.watch,
            runtime: raw.runtime,
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self::new_unchecked(RawMirrorConfig::default())
    }
}

/// `[mount]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountSection {
    /// Live mount table to read on every probe.
    #[serde(default = "default_mount_table")]
    pub table: PathBuf,

    /// How destinations are compared against mount points.
    #[serde(default)]
    pub matching: MountMatch,

    /// How often idle destinations are re-probed so a volume plugged in
    /// after startup gets synced without waiting for a source change.
    /// `0` turns polling off.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl MountSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_mount_table() -> PathBuf {
    PathBuf::from("/proc/self/mounts")
}

impl Default for MountSection {
    fn default() -> Self {
        Self {
            table: default_mount_table(),
            matching: MountMatch::default(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// `[sync]` section: the external mirroring command.
///
/// The command line is `program args... <source>/ <destination>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    #[serde(default = "default_program")]
    pub program: String,

    /// Must keep archive + delete semantics for the destination to end up an
    /// exact mirror.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_program() -> String {
    "rsync".to_string()
}

fn default_args() -> Vec<String> {
    vec!["-a".to_string(), "--delete".to_string()]
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Watch the whole subtree (default) or only direct children.
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// Number of raw events buffered between the watcher thread and the
    /// monitor. Events beyond this while a sync runs are dropped.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

fn default_recursive() -> bool {
    true
}

fn default_buffer_capacity() -> usize {
    4096
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            recursive: default_recursive(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

/// `[runtime]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    /// Exit with status 1 (instead of 0) when the change source fails.
    #[serde(default = "default_fail_on_read_error")]
    pub fail_on_read_error: bool,
}

fn default_fail_on_read_error() -> bool {
    true
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            fail_on_read_error: default_fail_on_read_error(),
        }
    }
}
