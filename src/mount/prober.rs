// src/mount/prober.rs

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{trace, warn};

use crate::fs::{FileSystem, RealFileSystem};
use crate::mount::table::parse_mount_table;
use crate::types::MountMatch;

/// Answers whether a destination path is currently a mount point.
///
/// Implementations must not cache: every call reflects the mount state at the
/// moment of the call. Tests substitute a fake.
pub trait MountProber: Send + Sync {
    fn is_mounted(&self, path: &Path) -> bool;
}

/// Production prober backed by the kernel's mount table file.
#[derive(Debug, Clone)]
pub struct MountTableProber {
    fs: Arc<dyn FileSystem>,
    table: PathBuf,
    matching: MountMatch,
}

impl MountTableProber {
    pub fn new(table: impl Into<PathBuf>, matching: MountMatch) -> Self {
        Self::with_fs(Arc::new(RealFileSystem), table, matching)
    }

    pub fn with_fs(
        fs: Arc<dyn FileSystem>,
        table: impl Into<PathBuf>,
        matching: MountMatch,
    ) -> Self {
        Self {
            fs,
            table: table.into(),
            matching,
        }
    }

    pub fn table_path(&self) -> &Path {
        &self.table
    }

    /// Read a fresh snapshot of mount points, in table order.
    pub fn mount_points(&self) -> Result<Vec<PathBuf>> {
        let contents = self.fs.read(&self.table)?;
        Ok(parse_mount_table(&contents)
            .into_iter()
            .map(|entry| entry.mount_point)
            .collect())
    }

    fn matches(&self, wanted: &Path, mount_point: &Path) -> bool {
        match self.matching {
            MountMatch::Exact => wanted.as_os_str() == mount_point.as_os_str(),
            MountMatch::Normalized => wanted == lexical_normalize(mount_point),
        }
    }

    /// The form of `path` that is compared against table entries.
    fn comparable(&self, path: &Path) -> PathBuf {
        match self.matching {
            MountMatch::Exact => path.to_path_buf(),
            // Kernel mount points are already canonical, so only the
            // destination needs symlink resolution.
            MountMatch::Normalized => self
                .fs
                .canonicalize(path)
                .unwrap_or_else(|_| lexical_normalize(path)),
        }
    }
}

impl MountProber for MountTableProber {
    fn is_mounted(&self, path: &Path) -> bool {
        let points = match self.mount_points() {
            Ok(points) => points,
            Err(err) => {
                warn!(
                    table = ?self.table,
                    error = %err,
                    "cannot read mount table; treating destination as not mounted"
                );
                return false;
            }
        };

        let wanted = self.comparable(path);
        let mounted = points.iter().any(|point| self.matches(&wanted, point));
        trace!(destination = ?path, mounted, entries = points.len(), "mount probe");
        mounted
    }
}

/// Drop `.` components and trailing slashes without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| *c != Component::CurDir)
        .collect()
}
