//! `CliError`: every failure the binary can report, its suggestions and its
//! exit code.

use std::error::Error as _;

use owo_colors::OwoColorize;
use thiserror::Error;

use monoforge_core::error::{ErrorCategory as CoreCategory, ForgeError};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Arguments that parse but make no sense together.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Wrapped so that the CLI can map the core category to an exit code.
    #[error("{0}")]
    Core(#[from] ForgeError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,

    /// The generator ran and the files were written, but a deferred task failed.
    #[error("{} post-generation task(s) failed: {}", failed.len(), failed.join(", "))]
    TasksFailed { failed: Vec<String> },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],
            Self::ConfigError { .. } => vec![
                format!("Check {} or {}", crate::config::LOCAL_CONFIG_FILE, crate::config::AppConfig::config_path().display()),
                "Use 'monoforge init --force' to write a fresh default config".into(),
            ],
            Self::Core(core) => core.suggestions(),
            Self::IoError { .. } => vec![
                "Check file permissions".into(),
                "Check available disk space".into(),
            ],
            Self::Cancelled => vec!["No changes were made".into()],
            Self::TasksFailed { .. } => vec![
                "The generated files are in place".into(),
                "Re-run the failed step by hand, e.g. your package manager's install".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::Cancelled => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } | Self::TasksFailed { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Render for a terminal, with colour.
    pub fn format_colored(&self, verbose: bool) -> String {
        self.render(verbose, true)
    }

    /// Render for pipes and log files.
    pub fn format_plain(&self, verbose: bool) -> String {
        self.render(verbose, false)
    }

    fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: fn(&str) -> String| {
            if color { style(text) } else { text.to_owned() }
        };

        let mut out = format!(
            "\n{} {}\n",
            paint("\u{2717} Error:", |t| t.red().bold().to_string()),
            paint(&self.to_string(), |t| t.red().to_string()),
        );

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                let line = format!("Caused by: {err}");
                out.push_str(&format!("  {}\n", paint(&line, |t| t.dimmed().to_string())));
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str(&format!(
                "\n{}\n",
                paint("Suggestions:", |t| t.yellow().bold().to_string())
            ));
            for suggestion in suggestions {
                out.push_str(&format!("  - {suggestion}\n"));
            }
        }

        if !verbose {
            out.push_str(&paint(
                "\nUse -v / --verbose for more details.\n",
                |t| t.dimmed().to_string(),
            ));
        }
        out
    }

    /// Emit one event at a severity matching the category.
    pub fn log(&self) {
        let category = self.category();
        match category {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(?category, error = %self, "Command rejected");
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(?category, error = %self, "Command failed");
            }
        }
        if let Some(source) = self.source() {
            tracing::debug!(cause = %source, "Error source");
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}
