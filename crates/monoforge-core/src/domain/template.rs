//! Template sets and token substitution.
//!
//! ## Token syntax
//!
//! | Where            | Syntax              | Example                       |
//! |------------------|---------------------|-------------------------------|
//! | file contents    | `<%= identifier %>` | `export const <%= className %>` |
//! | file/dir names   | `__identifier__`    | `__fileName__.spec.ts__tmpl__` |
//!
//! Substitution is strict in both places: a token with no value in the
//! [`TemplateContext`] fails with `UnresolvedToken` instead of being left in
//! the output. The `tmpl` token always resolves to the empty string, which is
//! how a trailing `__tmpl__` marker disappears from file names.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::common::RelativePath;
use crate::domain::error::DomainError;
use crate::domain::naming::Names;
use crate::domain::options::ResolvedOptions;

static CONTENT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<%=(.*?)%>").expect("content token pattern is valid")
});

static PATH_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"__([A-Za-z][A-Za-z0-9]*)__").expect("path token pattern is valid")
});

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

const OPEN_TAG: &str = "<%=";

/// One file in a template set. `path` is relative to the template root and
/// may itself contain path tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    pub path: String,
    pub content: String,
}

impl TemplateEntry {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A named collection of template files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    pub name: String,
    pub entries: Vec<TemplateEntry>,
}

impl TemplateSet {
    pub fn new(name: impl Into<String>, mut entries: Vec<TemplateEntry>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Token → value map used to instantiate a template set.
///
/// Backed by a `BTreeMap` so that `tokens()` is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateContext {
    /// A context holding only the `tmpl` marker.
    pub fn new() -> Self {
        let mut values = BTreeMap::new();
        values.insert("tmpl".to_string(), String::new());
        Self { values }
    }

    /// Every token a generator's templates can rely on.
    ///
    /// `project_root` is the project's final location, not its staging path,
    /// since rendered files outlive the relocation.
    pub fn for_project(options: &ResolvedOptions, project_root: &RelativePath) -> Self {
        let names = Names::derive(options.name().as_str());

        let mut ctx = Self::new()
            .with("name", names.name)
            .with("fileName", names.file_name)
            .with("className", names.class_name)
            .with("propertyName", names.property_name)
            .with("constantName", names.constant_name)
            .with("title", options.title())
            .with("description", options.description())
            .with("category", options.category().as_str())
            .with("projectRoot", project_root.as_str());

        for (flag, value) in options.flags() {
            ctx = ctx.with(flag.as_str(), if *value { "true" } else { "false" });
        }
        ctx
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(token.into(), value.into());
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Substitute `<%= token %>` occurrences in file contents.
    ///
    /// `location` names the template file in error messages.
    ///
    /// # Errors
    /// - `MalformedTemplate` for an unterminated `<%=` or a non-identifier
    ///   between the tags
    /// - `UnresolvedToken` for an identifier with no value
    pub fn render_content(&self, text: &str, location: &str) -> Result<String, DomainError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in CONTENT_TOKEN.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            check_no_open_tag(&text[last..whole.start()], location)?;
            out.push_str(&text[last..whole.start()]);

            let inner = caps.get(1).map_or("", |m| m.as_str()).trim();
            if !IDENTIFIER.is_match(inner) {
                return Err(DomainError::MalformedTemplate {
                    location: location.to_string(),
                    reason: format!("'{inner}' is not a token name"),
                });
            }
            out.push_str(self.lookup(inner, location)?);
            last = whole.end();
        }

        check_no_open_tag(&text[last..], location)?;
        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Substitute `__token__` occurrences in a template path.
    ///
    /// Segments that render to the empty string are dropped, so a directory
    /// named `__tmpl__` flattens into its parent.
    pub fn render_path(&self, path: &str) -> Result<RelativePath, DomainError> {
        let mut rendered = Vec::new();

        for segment in path.split(['/', '\\']).filter(|s| !s.is_empty()) {
            let mut failure = None;
            let replaced = PATH_TOKEN.replace_all(segment, |caps: &Captures<'_>| {
                let token = &caps[1];
                match self.lookup(token, path) {
                    Ok(value) => value.to_string(),
                    Err(e) => {
                        failure.get_or_insert(e);
                        String::new()
                    }
                }
            });
            if let Some(err) = failure {
                return Err(err);
            }
            if !replaced.is_empty() {
                rendered.push(replaced.into_owned());
            }
        }

        RelativePath::try_new(rendered.join("/"))
    }

    fn lookup(&self, token: &str, location: &str) -> Result<&str, DomainError> {
        self.get(token).ok_or_else(|| DomainError::UnresolvedToken {
            token: token.to_string(),
            location: location.to_string(),
        })
    }
}

fn check_no_open_tag(fragment: &str, location: &str) -> Result<(), DomainError> {
    if fragment.contains(OPEN_TAG) {
        return Err(DomainError::MalformedTemplate {
            location: location.to_string(),
            reason: "'<%=' is never closed with '%>'".into(),
        });
    }
    Ok(())
}
