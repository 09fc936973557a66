//! Generator input: the declarative options record and its validated form.
//!
//! # Design
//!
//! `GeneratorOptions` is what callers build (CLI flags, tests, other tools).
//! It is deliberately loose: every field except the name is optional.
//! `ResolvedOptions` is what the pipeline consumes. It can only be produced
//! by `GeneratorSpec::resolve`, so holding one proves that validation ran and
//! all defaults were applied.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

// ── Category ──────────────────────────────────────────────────────────────────

/// The top-level bucket a project lives in under the projects directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Apps,
    Libs,
    Tools,
    Experiments,
    Shared,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Apps,
        Self::Libs,
        Self::Tools,
        Self::Experiments,
        Self::Shared,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Apps => "apps",
            Self::Libs => "libs",
            Self::Tools => "tools",
            Self::Experiments => "experiments",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apps" | "app" => Ok(Self::Apps),
            "libs" | "lib" => Ok(Self::Libs),
            "tools" | "tool" => Ok(Self::Tools),
            "experiments" | "experiment" => Ok(Self::Experiments),
            "shared" => Ok(Self::Shared),
            other => Err(DomainError::invalid_options(
                "category",
                format!("unknown category: {other}"),
            )),
        }
    }
}

// ── ProjectName ───────────────────────────────────────────────────────────────

/// A project name that is safe to use as a single path segment.
///
/// Invariant: non-empty, ASCII alphanumerics plus `-`, `_` and `.`, starting
/// with an alphanumeric. Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let reject = |reason: &str| Err(DomainError::invalid_options("name", reason));

        if raw.is_empty() {
            return reject("name cannot be empty");
        }
        if raw.contains('/') || raw.contains('\\') {
            return reject("name cannot contain path separators");
        }
        if raw == "." || raw == ".." {
            return reject("name cannot be a relative path marker");
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return reject("name cannot contain whitespace");
        }
        if !raw.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return reject("name must start with a letter or digit");
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(DomainError::invalid_options(
                "name",
                format!("character '{bad}' is not allowed"),
            ));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── GeneratorOptions ──────────────────────────────────────────────────────────

/// Caller-supplied options for one generator invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    pub name: String,
    pub category: Option<Category>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl GeneratorOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }
}

// ── ResolvedOptions ───────────────────────────────────────────────────────────

/// Validated options with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub(crate) name: ProjectName,
    pub(crate) category: Category,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) flags: BTreeMap<String, bool>,
}

impl ResolvedOptions {
    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn flags(&self) -> &BTreeMap<String, bool> {
        &self.flags
    }

    /// Value of a declared flag; undeclared flags read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}
