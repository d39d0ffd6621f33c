// src/sync/mod.rs

//! Mirror execution layer.
//!
//! The dispatcher talks to a [`SyncExecutor`] instead of spawning processes
//! itself, so tests can swap in a fake with controllable latency and outcome.
//!
//! - [`command`] builds the external command line.
//! - [`executor`] holds the trait and the `rsync`-backed implementation.

pub mod command;
pub mod executor;

use thiserror::Error;

pub use command::MirrorCommand;
pub use executor::{RsyncExecutor, SyncExecutor, SyncFuture};

/// Why a single mirror operation failed.
///
/// The exit code is reported as-is; the tool's diagnostics are logged but
/// never interpreted.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {}", describe_exit(.code))]
    Exited { program: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
