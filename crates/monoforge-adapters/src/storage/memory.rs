//! In-memory storage for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use monoforge_core::{
    application::{ApplicationError, ports::Storage},
    domain::RelativePath,
    error::{ForgeError, ForgeResult},
};

/// In-memory storage. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<MemoryStorageInner>>,
}

#[derive(Debug, Default)]
struct MemoryStorageInner {
    files: BTreeMap<RelativePath, String>,
    directories: BTreeSet<RelativePath>,
}

impl MemoryStorageInner {
    fn add_parents(&mut self, path: &RelativePath) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.is_root() {
                break;
            }
            current = dir.parent();
            self.directories.insert(dir);
        }
    }

    fn contains(&self, path: &RelativePath) -> bool {
        path.is_root()
            || self.files.contains_key(path)
            || self.directories.contains(path)
            || self.files.keys().any(|p| p.starts_with(path))
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file (testing helper).
    pub fn with_file(self, path: &str, content: &str) -> Self {
        {
            let mut inner = self.write_lock();
            let path = RelativePath::new(path);
            inner.add_parents(&path);
            inner.files.insert(path, content.to_string());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &str) -> Option<String> {
        let path = RelativePath::try_new(path).ok()?;
        self.read_lock().files.get(&path).cloned()
    }

    /// Every stored file path, sorted.
    pub fn files(&self) -> Vec<String> {
        self.read_lock()
            .files
            .keys()
            .map(|p| p.as_str().to_string())
            .collect()
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, MemoryStorageInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, MemoryStorageInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &RelativePath) -> bool {
        self.read_lock().contains(path)
    }

    fn is_file(&self, path: &RelativePath) -> bool {
        self.read_lock().files.contains_key(path)
    }

    fn read_to_string(&self, path: &RelativePath) -> ForgeResult<Option<String>> {
        Ok(self.read_lock().files.get(path).cloned())
    }

    fn list_files(&self, path: &RelativePath) -> ForgeResult<Vec<RelativePath>> {
        Ok(self
            .read_lock()
            .files
            .keys()
            .filter(|p| *p != path)
            .filter_map(|p| p.strip_prefix(path))
            .collect())
    }

    fn write_file(&self, path: &RelativePath, content: &str) -> ForgeResult<()> {
        let mut inner = self.write_lock();
        if inner.directories.contains(path) {
            return Err(not_a_file(path));
        }
        inner.add_parents(path);
        inner.files.insert(path.clone(), content.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &RelativePath) -> ForgeResult<()> {
        let mut inner = self.write_lock();
        if inner.files.contains_key(path) {
            return Err(ApplicationError::storage(path.as_str(), "a file exists at this path").into());
        }
        inner.add_parents(path);
        if !path.is_root() {
            inner.directories.insert(path.clone());
        }
        Ok(())
    }

    fn remove(&self, path: &RelativePath) -> ForgeResult<()> {
        let mut inner = self.write_lock();
        inner.files.retain(|p, _| !p.starts_with(path));
        inner.directories.retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn rename(&self, from: &RelativePath, to: &RelativePath) -> ForgeResult<()> {
        let mut inner = self.write_lock();
        if !inner.contains(from) {
            return Err(ApplicationError::storage(from.as_str(), "no such file or directory").into());
        }

        let files: Vec<_> = inner
            .files
            .iter()
            .filter(|(p, _)| p.starts_with(from))
            .map(|(p, c)| (p.clone(), c.clone()))
            .collect();
        let dirs: Vec<_> = inner
            .directories
            .iter()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();

        inner.files.retain(|p, _| !p.starts_with(from));
        inner.directories.retain(|p| !p.starts_with(from));
        inner.directories.remove(to);

        inner.add_parents(to);
        for dir in dirs {
            if let Some(moved) = dir.rebase(from, to) {
                inner.directories.insert(moved);
            }
        }
        for (path, content) in files {
            if let Some(moved) = path.rebase(from, to) {
                inner.files.insert(moved, content);
            }
        }
        Ok(())
    }
}

fn not_a_file(path: &RelativePath) -> ForgeError {
    ApplicationError::storage(path.as_str(), "a directory exists at this path").into()
}
