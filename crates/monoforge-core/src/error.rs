//! Root error type shared by every layer of the crate.
//!
//! Domain and application errors convert into [`ForgeError`] with `?`; the
//! CLI only ever sees this type.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, ErrorCategory as DomainCategory};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForgeError {
    /// Invalid options, template tokens, renames or documents.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage, flush and collaborator failures.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// A broken invariant inside monoforge itself.
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl ForgeError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "Re-run with -vv and include the log when reporting".into(),
                "Issues: https://github.com/monoforge/monoforge/issues".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category().into(),
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Coarse grouping used for exit codes and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

impl From<DomainCategory> for ErrorCategory {
    fn from(category: DomainCategory) -> Self {
        match category {
            DomainCategory::Validation => Self::Validation,
            DomainCategory::NotFound => Self::NotFound,
            DomainCategory::Internal => Self::Internal,
        }
    }
}

pub type ForgeResult<T> = Result<T, ForgeError>;
