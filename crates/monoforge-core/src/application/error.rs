//! Application layer errors.
//!
//! These errors represent failures in orchestration and at the ports, not
//! business rules. Business rule violations are `DomainError` from
//! `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A storage port call failed.
    #[error("Storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    /// Replaying the staged operations against storage failed part way.
    ///
    /// Operations before `index` have been applied and are not rolled back.
    #[error("Flush failed at operation #{index} ({operation}) on {path}: {reason}")]
    FlushFailed {
        index: usize,
        operation: String,
        path: String,
        reason: String,
    },

    /// The catalogue has no template set with this name.
    #[error("Template set not found: {name}")]
    TemplateSetNotFound { name: String },

    /// An on-disk template set could not be loaded.
    #[error("Cannot load templates from {path}: {reason}")]
    TemplateSource { path: PathBuf, reason: String },

    /// The base skeleton collaborator failed.
    #[error("Skeleton generation failed: {reason}")]
    SkeletonFailed { reason: String },

    /// The formatting collaborator failed.
    #[error("Formatting failed: {reason}")]
    FormatFailed { reason: String },

    /// Dependency installation failed.
    #[error("Dependency installation failed: {reason}")]
    InstallFailed { reason: String },
}

impl ApplicationError {
    pub fn storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Storage {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Storage { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions in the workspace".into(),
            ],
            Self::FlushFailed { index, .. } => vec![
                format!("Operations before #{} were already applied", index),
                "Inspect the workspace and remove partial output before retrying".into(),
            ],
            Self::TemplateSetNotFound { name } => vec![
                format!("No template set named '{}'", name),
                "Check --templates or generate.templates_dir in your config".into(),
            ],
            Self::TemplateSource { path, .. } => vec![
                format!("Check the template directory: {}", path.display()),
                "A template.toml manifest must be valid TOML".into(),
            ],
            Self::InstallFailed { .. } => vec![
                "Run the package manager install command manually".into(),
                "Or re-run with --skip-install".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateSetNotFound { .. } => ErrorCategory::NotFound,
            Self::TemplateSource { .. } => ErrorCategory::Configuration,
            Self::Storage { .. }
            | Self::FlushFailed { .. }
            | Self::SkeletonFailed { .. }
            | Self::FormatFailed { .. }
            | Self::InstallFailed { .. } => ErrorCategory::Internal,
        }
    }
}
