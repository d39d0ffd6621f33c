// src/config/mod.rs

//! Configuration loading and validation.
//!
//! The config file is optional; every section falls back to defaults that
//! reproduce the plain `mountmirror <SOURCE> <DESTINATION>...` behaviour.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    MirrorConfig, MountSection, RawMirrorConfig, RuntimeSection, SyncSection, WatchSection,
};
