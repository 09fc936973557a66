//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `monoforge-adapters` crate provides implementations.

use serde::Serialize;

use crate::application::tree::VirtualTree;
use crate::domain::{ProjectKind, RelativePath, TemplateSet};
use crate::error::ForgeResult;

/// Port for the real file hierarchy behind a [`VirtualTree`].
///
/// Implemented by:
/// - `monoforge_adapters::storage::LocalStorage` (production)
/// - `monoforge_adapters::storage::MemoryStorage` (testing)
///
/// ## Design Notes
///
/// - All paths are workspace-relative; the adapter owns the root
/// - Absent paths are not errors for queries: `exists` is false,
///   `read_to_string` is `None`, `list_files` is empty
#[cfg_attr(test, mockall::automock)]
pub trait Storage: Send + Sync {
    fn exists(&self, path: &RelativePath) -> bool;

    fn is_file(&self, path: &RelativePath) -> bool;

    /// Read a file; `None` if it does not exist.
    fn read_to_string(&self, path: &RelativePath) -> ForgeResult<Option<String>>;

    /// Every file below `path`, recursively, relative to `path`.
    fn list_files(&self, path: &RelativePath) -> ForgeResult<Vec<RelativePath>>;

    /// Create or overwrite a file, creating parent directories.
    fn write_file(&self, path: &RelativePath, content: &str) -> ForgeResult<()>;

    fn create_dir_all(&self, path: &RelativePath) -> ForgeResult<()>;

    /// Remove a file or a whole directory. Removing nothing is not an error.
    fn remove(&self, path: &RelativePath) -> ForgeResult<()>;

    /// Move a file or directory, creating the destination's parents.
    fn rename(&self, from: &RelativePath, to: &RelativePath) -> ForgeResult<()>;
}

/// What the base skeleton collaborator is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkeletonRequest {
    /// Physical project name; also the directory at the workspace root.
    pub project_name: String,
    pub kind: ProjectKind,
    pub bundler: String,
    pub style: String,
    pub unit_test_runner: Option<String>,
    /// `Some` makes the collaborator emit a `{project_name}-e2e` companion.
    pub e2e_test_runner: Option<String>,
    pub tags: Vec<String>,
}

impl SkeletonRequest {
    /// # Errors
    /// `AbsolutePathNotAllowed` or `PathEscapesWorkspace` for a project name
    /// that is not a plain workspace-relative path.
    pub fn directory(&self) -> ForgeResult<RelativePath> {
        Ok(RelativePath::try_new(&self.project_name)?)
    }

    pub fn companion_directory(&self) -> ForgeResult<Option<RelativePath>> {
        match self.e2e_test_runner {
            Some(_) => Ok(Some(RelativePath::try_new(format!("{}-e2e", self.project_name))?)),
            None => Ok(None),
        }
    }
}

/// Port for the black-box "create an application/library" generator.
#[cfg_attr(test, mockall::automock)]
pub trait SkeletonGenerator: Send + Sync {
    fn generate(&self, tree: &mut VirtualTree, request: &SkeletonRequest) -> ForgeResult<()>;
}

/// Port for template set lookup.
///
/// Implemented by:
/// - `monoforge_adapters::builtin_templates::BuiltinCatalog` (compiled in)
/// - `monoforge_adapters::template_loader::DirectoryCatalog` (on disk)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateCatalog: Send + Sync {
    /// # Errors
    /// `TemplateSetNotFound` if no set has this name.
    fn template_set(&self, name: &str) -> ForgeResult<TemplateSet>;

    /// Names of every set this catalog can serve.
    fn available(&self) -> Vec<String>;
}

/// Port for normalising generated files.
#[cfg_attr(test, mockall::automock)]
pub trait Formatter: Send + Sync {
    /// Format `files` in place inside the tree; returns how many changed.
    fn format(&self, tree: &mut VirtualTree, files: &[RelativePath]) -> ForgeResult<usize>;
}

/// Port for installing workspace dependencies after a flush.
#[cfg_attr(test, mockall::automock)]
pub trait DependencyInstaller: Send + Sync {
    /// Human-readable command, e.g. `pnpm install`.
    fn command_line(&self) -> String;

    fn install(&self) -> ForgeResult<()>;
}
