// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so a pipeline can record and re-raise them)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid option '{field}': {reason}")]
    InvalidOptions { field: String, reason: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the workspace: {path}")]
    PathEscapesWorkspace { path: String },

    // ========================================================================
    // Template Errors (development-time defects)
    // ========================================================================
    #[error("Unresolved template token '{token}' in {location}")]
    UnresolvedToken { token: String, location: String },

    #[error("Malformed template {location}: {reason}")]
    MalformedTemplate { location: String, reason: String },

    // ========================================================================
    // Tree Errors
    // ========================================================================
    #[error("Cannot rename '{from}' to '{to}': {reason}")]
    InvalidRename {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Path not found: {path}")]
    NotFound { path: String },

    #[error("Cannot patch document '{path}': {reason}")]
    InvalidDocument { path: String, reason: String },

    // ========================================================================
    // Catalogue Errors (404-level equivalent)
    // ========================================================================
    #[error("Unknown generator: {0}")]
    UnknownGenerator(String),
}

impl DomainError {
    pub(crate) fn invalid_options(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidOptions { field, reason } => vec![
                format!("Option '{}' was rejected: {}", field, reason),
                "Project names are single path segments, e.g. my-app or widget".into(),
            ],
            Self::UnresolvedToken { token, location } => vec![
                format!("The template at {} references '{}'", location, token),
                "Pass the value as an option or remove the token from the template".into(),
            ],
            Self::MalformedTemplate { location, .. } => vec![
                format!("Check the token syntax in {}", location),
                "Content tokens look like <%= name %>, path tokens like __name__".into(),
            ],
            Self::InvalidRename { to, .. } => vec![
                format!("Make sure '{}' does not already contain files", to),
                "Choose a different project name or category".into(),
            ],
            Self::NotFound { path } => vec![format!("Nothing exists at '{}'", path)],
            Self::InvalidDocument { path, .. } => vec![
                format!("'{}' must be valid JSON to be patched", path),
                "Fix the file by hand and re-run the generator".into(),
            ],
            Self::UnknownGenerator(_) => vec!["Try: monoforge list".into()],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidOptions { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesWorkspace { .. }
            | Self::InvalidRename { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } | Self::UnknownGenerator(_) => ErrorCategory::NotFound,
            Self::UnresolvedToken { .. }
            | Self::MalformedTemplate { .. }
            | Self::InvalidDocument { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
