#![allow(dead_code)]

use std::path::PathBuf;

use mountmirror::config::{MirrorConfig, RawMirrorConfig};
use mountmirror::errors::Result;
use mountmirror::types::MountMatch;

/// Builder for `MirrorConfig` to simplify test setup.
pub struct ConfigBuilder {
    config: RawMirrorConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawMirrorConfig::default(),
        }
    }

    pub fn mount_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.mount.table = path.into();
        self
    }

    pub fn matching(mut self, matching: MountMatch) -> Self {
        self.config.mount.matching = matching;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.mount.poll_interval_ms = ms;
        self
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.sync.program = program.to_string();
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.config.sync.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn recursive(mut self, val: bool) -> Self {
        self.config.watch.recursive = val;
        self
    }

    pub fn buffer_capacity(mut self, val: usize) -> Self {
        self.config.watch.buffer_capacity = val;
        self
    }

    pub fn fail_on_read_error(mut self, val: bool) -> Self {
        self.config.runtime.fail_on_read_error = val;
        self
    }

    pub fn try_build(self) -> Result<MirrorConfig> {
        MirrorConfig::try_from(self.config)
    }

    pub fn build(self) -> MirrorConfig {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
