//! The Virtual Tree: a staged, in-memory view over workspace storage.
//!
//! Every generator works against a [`VirtualTree`]. Reads fall through to
//! the [`Storage`] port for paths the session has not touched; writes,
//! renames and deletes are staged in memory and recorded in an operation
//! log. Nothing reaches storage until [`VirtualTree::flush`] replays the log.
//!
//! ```text
//!   generator ──► VirtualTree ──(flush)──► Storage
//!                  │  entries: path → File | Dir
//!                  │  hidden:  prefixes whose real content is gone
//!                  └─ log:     CreateDir | Write | Rename | Delete
//! ```
//!
//! ## Invariants
//!
//! - a path is staged at most once in `entries`
//! - a rename moves every staged and real descendant of the old prefix
//! - a path at or under a `hidden` prefix is never served from storage
//! - the log is replayed in order; a failed flush is not rolled back

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::{ApplicationError, ports::Storage};
use crate::domain::{DomainError, RelativePath};
use crate::error::ForgeResult;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    File(String),
    Dir,
}

/// One staged mutation, in the order it was applied to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOperation {
    CreateDir { path: RelativePath },
    Write { path: RelativePath, content: String },
    Rename { from: RelativePath, to: RelativePath },
    Delete { path: RelativePath },
}

impl TreeOperation {
    /// The path the operation acts on (the source, for a rename).
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::CreateDir { path } | Self::Write { path, .. } | Self::Delete { path } => path,
            Self::Rename { from, .. } => from,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateDir { .. } => "create-dir",
            Self::Write { .. } => "write",
            Self::Rename { .. } => "rename",
            Self::Delete { .. } => "delete",
        }
    }
}

impl fmt::Display for TreeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path } => write!(f, "create-dir {path}"),
            Self::Write { path, content } => write!(f, "write {path} ({} bytes)", content.len()),
            Self::Rename { from, to } => write!(f, "rename {from} -> {to}"),
            Self::Delete { path } => write!(f, "delete {path}"),
        }
    }
}

/// Proof that a tree was flushed successfully.
///
/// Only [`VirtualTree::flush`] can build one, which is what lets deferred
/// tasks demand it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReceipt {
    session: Uuid,
    operations: usize,
}

impl FlushReceipt {
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Number of operations applied.
    pub fn operations(&self) -> usize {
        self.operations
    }
}

pub struct VirtualTree {
    session: Uuid,
    storage: Arc<dyn Storage>,
    entries: BTreeMap<RelativePath, Entry>,
    hidden: BTreeSet<RelativePath>,
    log: Vec<TreeOperation>,
}

impl fmt::Debug for VirtualTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualTree")
            .field("session", &self.session)
            .field("staged", &self.entries.len())
            .field("operations", &self.log.len())
            .finish()
    }
}

impl VirtualTree {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let session = Uuid::new_v4();
        debug!(%session, "Virtual tree session opened");
        Self {
            session,
            storage,
            entries: BTreeMap::new(),
            hidden: BTreeSet::new(),
            log: Vec::new(),
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn exists(&self, path: &RelativePath) -> bool {
        if path.is_root() || self.entries.contains_key(path) || self.has_staged_below(path) {
            return true;
        }
        !self.is_hidden(path) && self.storage.exists(path)
    }

    pub fn is_file(&self, path: &RelativePath) -> bool {
        match self.entries.get(path) {
            Some(Entry::File(_)) => true,
            Some(Entry::Dir) => false,
            None => {
                !self.has_staged_below(path) && !self.is_hidden(path) && self.storage.is_file(path)
            }
        }
    }

    /// # Errors
    /// `NotFound` if the path does not exist or is a directory.
    pub fn read(&self, path: &RelativePath) -> ForgeResult<String> {
        match self.entries.get(path) {
            Some(Entry::File(content)) => return Ok(content.clone()),
            Some(Entry::Dir) => return Err(not_found(path)),
            None => {}
        }
        if self.is_hidden(path) {
            return Err(not_found(path));
        }
        self.storage
            .read_to_string(path)?
            .ok_or_else(|| not_found(path))
    }

    /// Like `read`, but absence is `None` rather than an error.
    pub fn read_optional(&self, path: &RelativePath) -> ForgeResult<Option<String>> {
        if !self.is_file(path) {
            return Ok(None);
        }
        self.read(path).map(Some)
    }

    /// Names of the immediate children of `path`, sorted.
    pub fn children(&self, path: &RelativePath) -> ForgeResult<Vec<String>> {
        let mut names = BTreeSet::new();

        for staged in self.entries.keys() {
            if let Some(name) = staged
                .strip_prefix(path)
                .and_then(|rest| rest.segments().next().map(str::to_string))
            {
                names.insert(name);
            }
        }

        if !self.is_hidden(path) {
            for file in self.storage.list_files(path)? {
                if self.is_hidden(&path.join_path(&file)) {
                    continue;
                }
                if let Some(first) = file.segments().next() {
                    names.insert(first.to_string());
                }
            }
        }

        Ok(names.into_iter().collect())
    }

    /// Every file at or below `path` (workspace-relative), sorted.
    pub fn files_under(&self, path: &RelativePath) -> ForgeResult<Vec<RelativePath>> {
        let mut files: BTreeSet<RelativePath> = self
            .entries
            .iter()
            .filter(|(p, e)| matches!(e, Entry::File(_)) && p.starts_with(path))
            .map(|(p, _)| p.clone())
            .collect();

        for full in self.real_files_under(path)? {
            if !self.entries.contains_key(&full) {
                files.insert(full);
            }
        }

        Ok(files.into_iter().collect())
    }

    /// Files written during this session, in path order.
    pub fn changed_files(&self) -> Vec<RelativePath> {
        self.entries
            .iter()
            .filter(|(_, e)| matches!(e, Entry::File(_)))
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn operations(&self) -> &[TreeOperation] {
        &self.log
    }

    /// True if nothing has been staged.
    pub fn is_clean(&self) -> bool {
        self.log.is_empty()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Stage a create-or-overwrite. Writing identical content is a no-op.
    pub fn write(&mut self, path: &RelativePath, content: impl Into<String>) -> ForgeResult<()> {
        let content = content.into();
        if path.is_root() {
            return Err(DomainError::InvalidOptions {
                field: "path".into(),
                reason: "cannot write to the workspace root".into(),
            }
            .into());
        }
        if self.read_optional(path)?.as_deref() == Some(content.as_str()) {
            return Ok(());
        }

        debug!(path = %path, bytes = content.len(), "write staged");
        self.entries.insert(path.clone(), Entry::File(content.clone()));
        self.log.push(TreeOperation::Write {
            path: path.clone(),
            content,
        });
        Ok(())
    }

    /// Stage an (possibly empty) directory. Existing paths are left alone.
    pub fn create_dir(&mut self, path: &RelativePath) {
        if self.exists(path) {
            return;
        }
        debug!(path = %path, "create-dir staged");
        self.entries.insert(path.clone(), Entry::Dir);
        self.log.push(TreeOperation::CreateDir { path: path.clone() });
    }

    /// Stage removal of a file or subtree. Returns false if nothing existed.
    pub fn delete(&mut self, path: &RelativePath) -> bool {
        if path.is_root() || !self.exists(path) {
            return false;
        }
        debug!(path = %path, "delete staged");
        self.entries.retain(|p, _| !p.starts_with(path));
        self.hidden.insert(path.clone());
        self.log.push(TreeOperation::Delete { path: path.clone() });
        true
    }

    /// Stage a move of everything at or below `from` to `to`.
    ///
    /// # Errors
    /// `InvalidRename` if `from` does not exist, `to` lies inside `from`, or
    /// `to` exists and is not an empty directory.
    pub fn rename(&mut self, from: &RelativePath, to: &RelativePath) -> ForgeResult<()> {
        let invalid = |reason: &str| DomainError::InvalidRename {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        };

        if from.is_root() || !self.exists(from) {
            return Err(invalid("source does not exist").into());
        }
        if to.starts_with(from) {
            return Err(invalid("destination lies inside the source").into());
        }
        if self.exists(to) && !self.is_empty_dir(to)? {
            return Err(invalid("destination already exists and is not empty").into());
        }

        // Real content has to be pulled into memory so that later reads at
        // the new location see it before flush moves it on disk.
        let mut moved: Vec<(RelativePath, Entry)> = Vec::new();
        if !self.entries.contains_key(from) && !self.is_hidden(from) && self.storage.is_file(from) {
            if let Some(content) = self.storage.read_to_string(from)? {
                moved.push((to.clone(), Entry::File(content)));
            }
        } else {
            for full in self.real_files_under(from)? {
                if self.entries.contains_key(&full) {
                    continue;
                }
                if let (Some(target), Some(content)) =
                    (full.rebase(from, to), self.storage.read_to_string(&full)?)
                {
                    moved.push((target, Entry::File(content)));
                }
            }
        }

        let staged: Vec<RelativePath> = self
            .entries
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in staged {
            if let (Some(entry), Some(target)) = (self.entries.remove(&old), old.rebase(from, to)) {
                moved.push((target, entry));
            }
        }

        let count = moved.len();
        self.entries.extend(moved);
        self.hidden.insert(from.clone());
        self.log.push(TreeOperation::Rename {
            from: from.clone(),
            to: to.clone(),
        });

        debug!(from = %from, to = %to, entries = count, "rename staged");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Session end
    // -------------------------------------------------------------------------

    /// Apply every staged operation to storage, in order.
    ///
    /// There is no rollback: if operation N fails, operations before N stay
    /// applied and the error names N.
    #[instrument(skip_all, fields(session = %self.session, operations = self.log.len()))]
    pub fn flush(self) -> ForgeResult<FlushReceipt> {
        for (index, op) in self.log.iter().enumerate() {
            let applied = match op {
                TreeOperation::CreateDir { path } => self.storage.create_dir_all(path),
                TreeOperation::Write { path, content } => self.storage.write_file(path, content),
                TreeOperation::Rename { from, to } => self.storage.rename(from, to),
                TreeOperation::Delete { path } => self.storage.remove(path),
            };

            if let Err(e) = applied {
                warn!(index, operation = %op, error = %e, "Flush aborted");
                return Err(ApplicationError::FlushFailed {
                    index,
                    operation: op.kind().to_string(),
                    path: op.path().to_string(),
                    reason: e.to_string(),
                }
                .into());
            }
        }

        info!("Virtual tree flushed");
        Ok(FlushReceipt {
            session: self.session,
            operations: self.log.len(),
        })
    }

    /// Drop every staged change.
    pub fn discard(self) {
        info!(
            session = %self.session,
            operations = self.log.len(),
            "Virtual tree discarded"
        );
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn has_staged_below(&self, path: &RelativePath) -> bool {
        self.entries
            .keys()
            .any(|p| p != path && p.starts_with(path))
    }

    fn is_hidden(&self, path: &RelativePath) -> bool {
        self.hidden.iter().any(|h| path.starts_with(h))
    }

    fn is_empty_dir(&self, path: &RelativePath) -> ForgeResult<bool> {
        if self.is_file(path) || self.has_staged_below(path) {
            return Ok(false);
        }
        Ok(self.real_files_under(path)?.is_empty())
    }

    /// Real files below `path` that the session has not hidden.
    fn real_files_under(&self, path: &RelativePath) -> ForgeResult<Vec<RelativePath>> {
        if self.is_hidden(path) {
            return Ok(Vec::new());
        }
        Ok(self
            .storage
            .list_files(path)?
            .into_iter()
            .map(|rel| path.join_path(&rel))
            .filter(|full| !self.is_hidden(full))
            .collect())
    }
}

fn not_found(path: &RelativePath) -> crate::error::ForgeError {
    DomainError::NotFound {
        path: path.to_string(),
    }
    .into()
}
