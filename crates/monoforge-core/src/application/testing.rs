//! In-crate storage stub for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::application::{ApplicationError, ports::Storage};
use crate::domain::RelativePath;
use crate::error::ForgeResult;

#[derive(Debug, Default)]
pub(crate) struct StubStorage {
    files: Mutex<BTreeMap<RelativePath, String>>,
    failing_prefix: Mutex<Option<RelativePath>>,
}

impl StubStorage {
    pub(crate) fn with_files(files: &[(&str, &str)]) -> Self {
        let stub = Self::default();
        {
            let mut map = stub.lock();
            for (path, content) in files {
                map.insert(RelativePath::new(path), content.to_string());
            }
        }
        stub
    }

    pub(crate) fn file(&self, path: &str) -> Option<String> {
        self.lock().get(&RelativePath::new(path)).cloned()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.lock().keys().map(|p| p.as_str().to_string()).collect()
    }

    pub(crate) fn fail_writes_under(&self, prefix: &str) {
        *self.failing_prefix.lock().unwrap() = Some(RelativePath::new(prefix));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<RelativePath, String>> {
        self.files.lock().unwrap()
    }

    fn check_writable(&self, path: &RelativePath) -> ForgeResult<()> {
        match &*self.failing_prefix.lock().unwrap() {
            Some(prefix) if path.starts_with(prefix) => {
                Err(ApplicationError::storage(path.as_str(), "permission denied").into())
            }
            _ => Ok(()),
        }
    }
}

impl Storage for StubStorage {
    fn exists(&self, path: &RelativePath) -> bool {
        self.lock().keys().any(|p| p.starts_with(path))
    }

    fn is_file(&self, path: &RelativePath) -> bool {
        self.lock().contains_key(path)
    }

    fn read_to_string(&self, path: &RelativePath) -> ForgeResult<Option<String>> {
        Ok(self.lock().get(path).cloned())
    }

    fn list_files(&self, path: &RelativePath) -> ForgeResult<Vec<RelativePath>> {
        Ok(self
            .lock()
            .keys()
            .filter(|p| *p != path)
            .filter_map(|p| p.strip_prefix(path))
            .collect())
    }

    fn write_file(&self, path: &RelativePath, content: &str) -> ForgeResult<()> {
        self.check_writable(path)?;
        self.lock().insert(path.clone(), content.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &RelativePath) -> ForgeResult<()> {
        self.check_writable(path)
    }

    fn remove(&self, path: &RelativePath) -> ForgeResult<()> {
        self.check_writable(path)?;
        self.lock().retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn rename(&self, from: &RelativePath, to: &RelativePath) -> ForgeResult<()> {
        self.check_writable(to)?;
        let mut map = self.lock();
        let moving: Vec<RelativePath> = map.keys().filter(|p| p.starts_with(from)).cloned().collect();
        for old in moving {
            if let (Some(content), Some(new)) = (map.remove(&old), old.rebase(from, to)) {
                map.insert(new, content);
            }
        }
        Ok(())
    }
}
