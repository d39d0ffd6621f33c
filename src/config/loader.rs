// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{MirrorConfig, RawMirrorConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawMirrorConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawMirrorConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawMirrorConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<MirrorConfig> {
    let raw_config = load_from_path(&path)?;
    let config = MirrorConfig::try_from(raw_config)?;
    Ok(config)
}

/// Load `path` if one was given on the command line, otherwise use defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<MirrorConfig> {
    match path {
        Some(path) => load_and_validate(path),
        None => Ok(MirrorConfig::default()),
    }
}
