// src/config/validate.rs

use crate::config::model::{MirrorConfig, RawMirrorConfig};
use crate::errors::{MirrorError, Result};

impl TryFrom<RawMirrorConfig> for MirrorConfig {
    type Error = MirrorError;

    fn try_from(raw: RawMirrorConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(MirrorConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawMirrorConfig) -> Result<()> {
    validate_mount(cfg)?;
    validate_sync(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn validate_mount(cfg: &RawMirrorConfig) -> Result<()> {
    if cfg.mount.table.as_os_str().is_empty() {
        return Err(MirrorError::ConfigError(
            "[mount].table must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_sync(cfg: &RawMirrorConfig) -> Result<()> {
    if cfg.sync.program.trim().is_empty() {
        return Err(MirrorError::ConfigError(
            "[sync].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch(cfg: &RawMirrorConfig) -> Result<()> {
    if cfg.watch.buffer_capacity == 0 {
        return Err(MirrorError::ConfigError(
            "[watch].buffer_capacity must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
