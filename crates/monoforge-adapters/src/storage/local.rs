//! Local disk storage using std::fs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use monoforge_core::{
    application::{ApplicationError, ports::Storage},
    domain::RelativePath,
    error::{ForgeError, ForgeResult},
};

/// Production storage rooted at a workspace directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a storage adapter for the workspace at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &RelativePath) -> PathBuf {
        path.to_path_under(&self.root)
    }
}

impl Storage for LocalStorage {
    fn exists(&self, path: &RelativePath) -> bool {
        self.resolve(path).exists()
    }

    fn is_file(&self, path: &RelativePath) -> bool {
        self.resolve(path).is_file()
    }

    fn read_to_string(&self, path: &RelativePath) -> ForgeResult<Option<String>> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Ok(None);
        }
        fs::read_to_string(&full)
            .map(Some)
            .map_err(|e| map_io_error(&full, e, "read file"))
    }

    fn list_files(&self, path: &RelativePath) -> ForgeResult<Vec<RelativePath>> {
        let base = self.resolve(path);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&base).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::storage(&base, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&base)
                .map_err(|e| ApplicationError::storage(entry.path(), e))?;
            files.push(RelativePath::try_new(rel.to_string_lossy())?);
        }
        Ok(files)
    }

    fn write_file(&self, path: &RelativePath, content: &str) -> ForgeResult<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        fs::write(&full, content).map_err(|e| map_io_error(&full, e, "write file"))
    }

    fn create_dir_all(&self, path: &RelativePath) -> ForgeResult<()> {
        let full = self.resolve(path);
        fs::create_dir_all(&full).map_err(|e| map_io_error(&full, e, "create directory"))
    }

    fn remove(&self, path: &RelativePath) -> ForgeResult<()> {
        let full = self.resolve(path);
        let result = if full.is_dir() {
            fs::remove_dir_all(&full)
        } else {
            fs::remove_file(&full)
        };
        match result {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(map_io_error(&full, e, "remove")),
            _ => Ok(()),
        }
    }

    fn rename(&self, from: &RelativePath, to: &RelativePath) -> ForgeResult<()> {
        let source = self.resolve(from);
        let target = self.resolve(to);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        // An empty directory at the target is allowed; clear it so the move
        // behaves the same on every platform.
        if target.is_dir() {
            fs::remove_dir(&target).map_err(|e| map_io_error(&target, e, "replace directory"))?;
        }

        debug!(from = %source.display(), to = %target.display(), "renaming");
        fs::rename(&source, &target).map_err(|e| map_io_error(&source, e, "rename"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> ForgeError {
    ApplicationError::Storage {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
