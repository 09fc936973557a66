use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::error::DomainError;

/// A workspace path guaranteed to be **relative** and normalised.
///
/// This type encodes the invariant every staged tree operation relies on:
/// paths never point outside the workspace root.
///
/// - always `/`-separated, regardless of platform
/// - no leading `./`, no empty or `.` segments, no trailing slash
/// - `..` segments and absolute paths are rejected
/// - the empty path denotes the workspace root itself
///
/// `RelativePath` is a *semantic guardrail*, not a filesystem abstraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RelativePath(String);

impl RelativePath {
    /// The workspace root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Create a new relative path.
    ///
    /// # Panics
    /// Panics if the path is absolute or escapes the workspace (use `try_new`
    /// for fallible construction).
    pub fn new(path: impl AsRef<str>) -> Self {
        match Self::try_new(path.as_ref()) {
            Ok(p) => p,
            Err(e) => panic!("RelativePath rejected {:?}: {e}", path.as_ref()),
        }
    }

    /// Fallible constructor.
    pub fn try_new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref();
        let unified = raw.replace('\\', "/");

        if unified.starts_with('/') || Path::new(raw).is_absolute() || has_drive_prefix(&unified)
        {
            return Err(DomainError::AbsolutePathNotAllowed { path: raw.into() });
        }

        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(DomainError::PathEscapesWorkspace { path: raw.into() });
                }
                other => segments.push(other),
            }
        }

        Ok(Self(segments.join("/")))
    }

    /// Join a relative segment, maintaining the invariant.
    pub fn join(&self, segment: impl AsRef<str>) -> Result<Self, DomainError> {
        let tail = Self::try_new(segment)?;
        Ok(self.join_path(&tail))
    }

    /// Join another already-validated path.
    pub fn join_path(&self, tail: &RelativePath) -> Self {
        match (self.is_root(), tail.is_root()) {
            (true, _) => tail.clone(),
            (_, true) => self.clone(),
            _ => Self(format!("{}/{}", self.0, tail.0)),
        }
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind('/') {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        })
    }

    /// Segment-wise prefix test: `apps/web` starts with `apps` but not `app`.
    pub fn starts_with(&self, prefix: &RelativePath) -> bool {
        if prefix.is_root() {
            return true;
        }
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0) && self.0.as_bytes().get(prefix.0.len()) == Some(&b'/'))
    }

    /// Remove `prefix` from the front, if present.
    pub fn strip_prefix(&self, prefix: &RelativePath) -> Option<Self> {
        if !self.starts_with(prefix) {
            return None;
        }
        if prefix.is_root() {
            return Some(self.clone());
        }
        Some(Self(self.0[prefix.0.len()..].trim_start_matches('/').to_string()))
    }

    /// Re-root this path from `from` onto `to`.
    pub fn rebase(&self, from: &RelativePath, to: &RelativePath) -> Option<Self> {
        self.strip_prefix(from).map(|tail| to.join_path(&tail))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against a real directory.
    pub fn to_path_under(&self, root: &Path) -> PathBuf {
        self.segments().fold(root.to_path_buf(), |acc, s| acc.join(s))
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RelativePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------------
    // RelativePath
    // ---------------------------------------------------------------------

    #[test]
    fn relative_path_normalises_separators() {
        let p = RelativePath::new("./apps//web\\src/");
        assert_eq!(p.as_str(), "apps/web/src");
    }

    #[test]
    #[should_panic]
    fn relative_path_rejects_absolute() {
        RelativePath::new("/etc/passwd");
    }

    #[test]
    fn try_new_rejects_parent_segments() {
        assert!(matches!(
            RelativePath::try_new("apps/../../etc"),
            Err(DomainError::PathEscapesWorkspace { .. })
        ));
    }

    #[test]
    fn try_new_rejects_drive_letters() {
        assert!(RelativePath::try_new("C:/Windows").is_err());
    }

    #[test]
    fn starts_with_is_segment_aware() {
        let p = RelativePath::new("apps/web/src");
        assert!(p.starts_with(&RelativePath::new("apps/web")));
        assert!(p.starts_with(&RelativePath::new("apps/web/src")));
        assert!(!p.starts_with(&RelativePath::new("apps/we")));
        assert!(p.starts_with(&RelativePath::root()));
    }

    #[test]
    fn rebase_moves_prefix() {
        let p = RelativePath::new("staging/src/main.ts");
        let moved = p
            .rebase(&RelativePath::new("staging"), &RelativePath::new("apps/web"))
            .unwrap();
        assert_eq!(moved.as_str(), "apps/web/src/main.ts");
    }

    #[test]
    fn depth_and_parent() {
        let p = RelativePath::new("micro-repos/libs/widget");
        assert_eq!(p.depth(), 3);
        assert_eq!(p.parent().unwrap().as_str(), "micro-repos/libs");
        assert_eq!(RelativePath::new("a").parent(), Some(RelativePath::root()));
        assert_eq!(RelativePath::root().parent(), None);
    }

    #[test]
    fn join_root_is_identity() {
        let root = RelativePath::root();
        let p = root.join("libs").unwrap();
        assert_eq!(p.as_str(), "libs");
        assert_eq!(p.join("").unwrap(), p);
    }

    #[test]
    fn to_path_under_uses_platform_separators() {
        let p = RelativePath::new("a/b/c.txt");
        let resolved = p.to_path_under(Path::new("root"));
        assert_eq!(resolved, Path::new("root").join("a").join("b").join("c.txt"));
    }
}
