//! Template sets loaded from a directory on disk.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── counter-app/
//! │   ├── template.toml        ← optional manifest
//! │   ├── app.tsx
//! │   └── src/components/Counter.tsx
//! └── utils-lib/
//!     └── src/lib/__fileName__.ts__tmpl__
//! ```
//!
//! Every immediate subdirectory is one set, named after the directory unless
//! the manifest says otherwise. Every file below it except `template.toml`
//! is an entry.
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! name        = "counter-app"      # optional; defaults to the directory name
//! description = "Counter widget"   # optional
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use monoforge_core::{
    application::{ApplicationError, ports::TemplateCatalog},
    domain::{TemplateEntry, TemplateSet},
    error::ForgeResult,
};

const MANIFEST: &str = "template.toml";

/// Why one set directory could not be loaded.
#[derive(Debug, Error)]
enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Deserialised `template.toml`.
#[derive(Debug, Deserialize, Default)]
struct TemplateManifest {
    #[serde(default)]
    template: TemplateSection,
}

#[derive(Debug, Deserialize, Default)]
struct TemplateSection {
    name: Option<String>,
    description: Option<String>,
}

/// One loaded set and its manifest description.
#[derive(Debug, Clone)]
struct LoadedSet {
    set: TemplateSet,
    description: Option<String>,
}

/// Catalog over the subdirectories of a templates directory.
///
/// Subdirectories whose manifest is invalid or whose files cannot be read
/// emit a `WARN` log and are skipped; they do not prevent other sets from
/// loading.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    sets: BTreeMap<String, LoadedSet>,
}

impl DirectoryCatalog {
    /// Load every set under `root`.
    ///
    /// # Errors
    ///
    /// `TemplateSource` if `root` is missing or cannot be listed.
    #[instrument(fields(dir = %root.as_ref().display()), skip(root))]
    pub fn load(root: impl AsRef<Path>) -> ForgeResult<Self> {
        let root = root.as_ref().to_path_buf();
        let source_error = |reason: String| ApplicationError::TemplateSource {
            path: root.clone(),
            reason,
        };

        let read_dir = fs::read_dir(&root).map_err(|e| source_error(e.to_string()))?;

        let mut dirs = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| source_error(e.to_string()))?;
            if entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut sets = BTreeMap::new();
        for dir in dirs {
            match load_set(&dir) {
                Ok(loaded) => {
                    debug!(set = %loaded.set.name, files = loaded.set.len(), "loaded template set");
                    if sets.contains_key(&loaded.set.name) {
                        warn!(set = %loaded.set.name, dir = %dir.display(), "duplicate set name; keeping the first");
                        continue;
                    }
                    sets.insert(loaded.set.name.clone(), loaded);
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping template directory due to load error");
                }
            }
        }

        debug!(count = sets.len(), "finished loading template sets");
        Ok(Self { root, sets })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.sets.get(name)?.description.as_deref()
    }
}

impl TemplateCatalog for DirectoryCatalog {
    fn template_set(&self, name: &str) -> ForgeResult<TemplateSet> {
        self.sets
            .get(name)
            .map(|loaded| loaded.set.clone())
            .ok_or_else(|| ApplicationError::TemplateSetNotFound { name: name.into() }.into())
    }

    fn available(&self) -> Vec<String> {
        self.sets.keys().cloned().collect()
    }
}

fn load_set(dir: &Path) -> Result<LoadedSet, LoadError> {
    let manifest_path = dir.join(MANIFEST);
    let manifest = if manifest_path.is_file() {
        let raw = fs::read_to_string(&manifest_path).map_err(|source| LoadError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        toml::from_str::<TemplateManifest>(&raw).map_err(|source| LoadError::Manifest {
            path: manifest_path.clone(),
            source,
        })?
    } else {
        TemplateManifest::default()
    };

    let mut entries = Vec::new();
    for walk_entry in WalkDir::new(dir).min_depth(1) {
        let walk_entry = walk_entry?;
        if !walk_entry.file_type().is_file() {
            continue;
        }
        let rel = walk_entry.path().strip_prefix(dir).unwrap_or(walk_entry.path());
        if rel == Path::new(MANIFEST) {
            continue;
        }

        let content = fs::read_to_string(walk_entry.path()).map_err(|source| LoadError::Io {
            path: walk_entry.path().to_path_buf(),
            source,
        })?;
        entries.push(TemplateEntry::new(normalize_path(rel), content));
    }

    let name = manifest
        .template
        .name
        .unwrap_or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());

    Ok(LoadedSet {
        set: TemplateSet::new(name, entries),
        description: manifest.template.description,
    })
}

/// Forward slashes on every platform.
fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
