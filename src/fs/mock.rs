// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

/// In-memory filesystem for tests.
///
/// Paths are stored as given. `canonicalize` follows symlinks and strips
/// trailing slashes, and only succeeds for paths that exist.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.as_ref().to_path_buf(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.as_ref().to_path_buf(), MockEntry::Dir);
    }

    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            path.as_ref().to_path_buf(),
            MockEntry::Symlink(target.as_ref().to_path_buf()),
        );
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(path.as_ref());
    }

    fn resolve(&self, path: &Path) -> Option<(PathBuf, MockEntry)> {
        let entries = self.entries.lock().unwrap();
        let mut current: PathBuf = path.components().filter(|c| *c != Component::CurDir).collect();

        // Bounded so a symlink loop cannot hang a test.
        for _ in 0..32 {
            match entries.get(&current) {
                Some(MockEntry::Symlink(target)) => current = target.clone(),
                Some(entry) => return Some((current, entry.clone())),
                None => return None,
            }
        }
        None
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.resolve(path) {
            Some((_, MockEntry::File(content))) => Ok(content),
            Some(_) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some((_, MockEntry::Dir)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path)
            .map(|(resolved, _)| resolved)
            .ok_or_else(|| anyhow!("No such file or directory: {:?}", path))
    }
}
