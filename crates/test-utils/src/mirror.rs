//! In-process mirror executor for scenario tests that should not depend on
//! `rsync` being installed.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mountmirror::sync::{SyncError, SyncExecutor, SyncFuture};

/// Makes `destination` an exact copy of `source` (files and directories,
/// deleting anything extra). Symlinks and metadata are ignored.
#[derive(Debug, Clone, Default)]
pub struct DirMirrorExecutor;

impl SyncExecutor for DirMirrorExecutor {
    fn sync<'a>(&'a mut self, source: &'a Path, destination: &'a Path) -> SyncFuture<'a> {
        Box::pin(async move {
            mirror_dir(source, destination).map_err(|source| SyncError::Wait {
                program: "dir-mirror".to_string(),
                source,
            })
        })
    }
}

pub fn mirror_dir(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    let src_names = entry_names(src)?;
    for name in entry_names(dst)? {
        if !src_names.contains(&name) {
            remove_any(&dst.join(&name))?;
        }
    }

    for name in src_names {
        let from = src.join(&name);
        let to = dst.join(&name);
        let meta = fs::symlink_metadata(&from)?;

        if meta.is_dir() {
            if to.is_file() {
                fs::remove_file(&to)?;
            }
            mirror_dir(&from, &to)?;
        } else if meta.is_file() {
            if to.is_dir() {
                fs::remove_dir_all(&to)?;
            }
            fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

/// Sorted relative paths of every file and directory under `root`.
pub fn tree_listing(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    walk(root, root, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_path_buf());
        }
        if path.is_dir() {
            walk(root, &path, out)?;
        }
    }
    Ok(())
}

fn entry_names(dir: &Path) -> io::Result<BTreeSet<std::ffi::OsString>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect()
}

fn remove_any(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
