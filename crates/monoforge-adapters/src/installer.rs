//! Package manager invocation for the deferred install task.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, instrument};

use monoforge_core::{
    application::{ApplicationError, ports::DependencyInstaller},
    error::ForgeResult,
};

/// Supported package managers, detected from the workspace lockfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    /// Pick the manager whose lockfile is present; npm when there is none.
    pub fn detect(workspace_root: &Path) -> Self {
        [
            ("pnpm-lock.yaml", Self::Pnpm),
            ("yarn.lock", Self::Yarn),
            ("bun.lockb", Self::Bun),
            ("bun.lock", Self::Bun),
        ]
        .into_iter()
        .find(|(lockfile, _)| workspace_root.join(lockfile).is_file())
        .map(|(_, pm)| pm)
        .unwrap_or(Self::Npm)
    }

    pub fn program(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Bun => "bun",
        }
    }
}

/// Runs `<package manager> install` in the workspace root.
#[derive(Debug, Clone)]
pub struct PackageManagerInstaller {
    workspace_root: PathBuf,
    manager: PackageManager,
}

impl PackageManagerInstaller {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let manager = PackageManager::detect(&workspace_root);
        Self {
            workspace_root,
            manager,
        }
    }

    pub fn with_manager(mut self, manager: PackageManager) -> Self {
        self.manager = manager;
        self
    }

    pub fn manager(&self) -> PackageManager {
        self.manager
    }
}

impl DependencyInstaller for PackageManagerInstaller {
    fn command_line(&self) -> String {
        format!("{} install", self.manager.program())
    }

    #[instrument(skip(self), fields(cwd = %self.workspace_root.display(), pm = self.manager.program()))]
    fn install(&self) -> ForgeResult<()> {
        info!("Installing dependencies");
        let status = Command::new(self.manager.program())
            .arg("install")
            .current_dir(&self.workspace_root)
            .status()
            .map_err(|e| ApplicationError::InstallFailed {
                reason: format!("cannot run {}: {e}", self.manager.program()),
            })?;

        if !status.success() {
            return Err(ApplicationError::InstallFailed {
                reason: format!("`{}` exited with {status}", self.command_line()),
            }
            .into());
        }
        Ok(())
    }
}
