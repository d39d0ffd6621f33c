// src/mount/mod.rs

//! Mount availability checks.
//!
//! Answers "is destination D mounted right now?" by reading the live mount
//! table on every call. Nothing is cached: a volume unmounted mid-sync is only
//! noticed by the next probe.

pub mod prober;
pub mod table;

pub use prober::{MountProber, MountTableProber};
pub use table::{parse_mount_table, unescape_mount_field, MountEntry};
