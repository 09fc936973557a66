//! Relocation plans and typed configuration patches.
//!
//! Moving a project changes its nesting depth, which silently breaks every
//! configuration field that points back to the workspace root through a
//! chain of `../`. A [`RelocationPlan`] records where a project moves and
//! which of its documents need repair; each document gets a typed
//! [`DocumentPatch`] describing exactly which fields to rewrite.
//!
//! Patches are pure `&str -> String` transformations and are idempotent:
//! applying one to its own output yields the same output.

use serde_json::{Map, Value};

use crate::domain::common::RelativePath;
use crate::domain::error::DomainError;

const NX_PROJECT_SCHEMA: &str = "node_modules/nx/schemas/project-schema.json";
const BASE_TSCONFIG: &str = "tsconfig.base.json";
const BASE_ESLINT_CONFIG: &str = "eslint.config.mjs";
const VITE_CACHE_DIR: &str = "node_modules/.vite";
const TSC_OUT_DIR: &str = "dist/out-tsc";
const TSCONFIG_VARIANTS: [&str; 3] = [
    "tsconfig.app.json",
    "tsconfig.lib.json",
    "tsconfig.spec.json",
];

/// `../` repeated once per segment of `path`: the way back to the workspace
/// root from a project at `path`.
pub fn relative_prefix(path: &RelativePath) -> String {
    "../".repeat(path.depth())
}

// ── Text rules ────────────────────────────────────────────────────────────────

/// Replace a literal fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    pub from: String,
    pub to: String,
}

impl TextRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Replace every `from`, never matching inside an existing `to`.
    ///
    /// When `to` contains `from` (`../a` → `../../../a`), a plain replace
    /// would grow the prefix on every run. Splitting on `to` first keeps
    /// already-rewritten fragments intact.
    pub fn apply(&self, text: &str) -> String {
        if self.from.is_empty() || self.from == self.to {
            return text.to_string();
        }
        if self.to.contains(&self.from) {
            text.split(self.to.as_str())
                .map(|piece| piece.replace(&self.from, &self.to))
                .collect::<Vec<_>>()
                .join(&self.to)
        } else {
            text.replace(&self.from, &self.to)
        }
    }
}

// ── Document patches ──────────────────────────────────────────────────────────

/// A typed rewrite for one kind of configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPatch {
    /// `project.json`: `$schema` and `sourceRoot`.
    ProjectDescriptor { schema: String, source_root: String },
    /// `tsconfig*.json`: `extends` when given, and `compilerOptions.outDir`
    /// when the document already declares one.
    BuildConfig {
        extends: Option<String>,
        out_dir: Option<String>,
    },
    /// `package.json`: metadata and merged `devDependencies`.
    PackageManifest {
        description: Option<String>,
        keywords: Vec<String>,
        dev_dependencies: Vec<(String, String)>,
    },
    /// Any text file: literal fragment replacement.
    Text { rules: Vec<TextRule> },
}

impl DocumentPatch {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProjectDescriptor { .. } => "project-descriptor",
            Self::BuildConfig { .. } => "build-config",
            Self::PackageManifest { .. } => "package-manifest",
            Self::Text { .. } => "text",
        }
    }

    /// Apply the patch to `content`. `path` is only used in errors.
    ///
    /// # Errors
    /// `InvalidDocument` when a structured patch meets content that is not a
    /// JSON object.
    pub fn apply(&self, path: &RelativePath, content: &str) -> Result<String, DomainError> {
        match self {
            Self::Text { rules } => Ok(rules
                .iter()
                .fold(content.to_string(), |acc, rule| rule.apply(&acc))),
            Self::ProjectDescriptor {
                schema,
                source_root,
            } => patch_json(path, content, |doc| {
                doc.insert("$schema".into(), Value::String(schema.clone()));
                doc.insert("sourceRoot".into(), Value::String(source_root.clone()));
            }),
            Self::BuildConfig { extends, out_dir } => patch_json(path, content, |doc| {
                if let Some(extends) = extends {
                    doc.insert("extends".into(), Value::String(extends.clone()));
                }
                let existing = doc
                    .get_mut("compilerOptions")
                    .and_then(Value::as_object_mut)
                    .and_then(|options| options.get_mut("outDir"));
                if let (Some(out_dir), Some(slot)) = (out_dir, existing) {
                    *slot = Value::String(out_dir.clone());
                }
            }),
            Self::PackageManifest {
                description,
                keywords,
                dev_dependencies,
            } => patch_json(path, content, |doc| {
                if let Some(description) = description {
                    doc.insert("description".into(), Value::String(description.clone()));
                }
                if !keywords.is_empty() {
                    let list = keywords.iter().cloned().map(Value::String).collect();
                    doc.insert("keywords".into(), Value::Array(list));
                }
                if !dev_dependencies.is_empty() {
                    let slot = doc
                        .entry("devDependencies")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if !slot.is_object() {
                        *slot = Value::Object(Map::new());
                    }
                    if let Value::Object(deps) = slot {
                        for (pkg, version) in dev_dependencies {
                            deps.insert(pkg.clone(), Value::String(version.clone()));
                        }
                    }
                }
            }),
        }
    }
}

fn patch_json(
    path: &RelativePath,
    content: &str,
    edit: impl FnOnce(&mut Map<String, Value>),
) -> Result<String, DomainError> {
    let invalid = |reason: String| DomainError::InvalidDocument {
        path: path.to_string(),
        reason,
    };

    let mut value: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
    let Value::Object(doc) = &mut value else {
        return Err(invalid("top-level value is not an object".into()));
    };
    edit(doc);

    let mut out = serde_json::to_string_pretty(&value).map_err(|e| invalid(e.to_string()))?;
    out.push('\n');
    Ok(out)
}

// ── Plans ─────────────────────────────────────────────────────────────────────

/// A document to repair, relative to the project's destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRepair {
    pub file: RelativePath,
    pub patch: DocumentPatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationPlan {
    pub source: RelativePath,
    pub destination: RelativePath,
    pub documents: Vec<DocumentRepair>,
}

impl RelocationPlan {
    pub fn new(source: RelativePath, destination: RelativePath) -> Self {
        Self {
            source,
            destination,
            documents: Vec::new(),
        }
    }

    pub fn with_document(mut self, file: impl Into<RelativePath>, patch: DocumentPatch) -> Self {
        self.documents.push(DocumentRepair {
            file: file.into(),
            patch,
        });
        self
    }

    /// The repairs every skeleton-generated project needs after a move.
    pub fn for_project(source: RelativePath, destination: RelativePath) -> Self {
        let old_prefix = relative_prefix(&source);
        let new_prefix = relative_prefix(&destination);
        let source_root = destination.join_path(&RelativePath::new("src"));
        let out_dir = format!("{new_prefix}{TSC_OUT_DIR}");

        let root_relative = |target: &str| {
            TextRule::new(
                format!("'{old_prefix}{target}"),
                format!("'{new_prefix}{target}"),
            )
        };

        let mut plan = Self::new(source, destination)
            .with_document(
                "project.json",
                DocumentPatch::ProjectDescriptor {
                    schema: format!("{new_prefix}{NX_PROJECT_SCHEMA}"),
                    source_root: source_root.as_str().to_string(),
                },
            )
            .with_document(
                "tsconfig.json",
                DocumentPatch::BuildConfig {
                    extends: Some(format!("{new_prefix}{BASE_TSCONFIG}")),
                    out_dir: Some(out_dir.clone()),
                },
            );
        // Variants extend ./tsconfig.json, so only their output dir moves.
        for variant in TSCONFIG_VARIANTS {
            plan = plan.with_document(
                variant,
                DocumentPatch::BuildConfig {
                    extends: None,
                    out_dir: Some(out_dir.clone()),
                },
            );
        }

        plan.with_document(
            BASE_ESLINT_CONFIG,
            DocumentPatch::Text {
                rules: vec![root_relative(BASE_ESLINT_CONFIG)],
            },
        )
        .with_document(
            "vite.config.ts",
            DocumentPatch::Text {
                rules: vec![root_relative(VITE_CACHE_DIR)],
            },
        )
    }

    /// Absolute (workspace-relative) path of a planned document.
    pub fn document_path(&self, repair: &DocumentRepair) -> RelativePath {
        self.destination.join_path(&repair.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefix_follows_depth() {
        assert_eq!(relative_prefix(&RelativePath::root()), "");
        assert_eq!(relative_prefix(&RelativePath::new("staging")), "../");
        assert_eq!(
            relative_prefix(&RelativePath::new("micro-repos/libs/widget")),
            "../../../"
        );
    }

    #[test]
    fn text_rule_is_idempotent_when_target_contains_source() {
        let rule = TextRule::new("'../tsconfig.base.json", "'../../../tsconfig.base.json");
        let once = rule.apply("a '../tsconfig.base.json' b '../tsconfig.base.json'");
        let twice = rule.apply(&once);
        assert_eq!(once, "a '../../../tsconfig.base.json' b '../../../tsconfig.base.json'");
        assert_eq!(twice, once);
    }

    #[test]
    fn text_rule_plain_replace() {
        let rule = TextRule::new("old-name", "new-name");
        assert_eq!(rule.apply("old-name/old-name"), "new-name/new-name");
    }

    #[test]
    fn empty_from_is_noop() {
        assert_eq!(TextRule::new("", "x").apply("abc"), "abc");
    }

    #[test]
    fn project_descriptor_sets_fields_and_keeps_order() {
        let patch = DocumentPatch::ProjectDescriptor {
            schema: "../../../node_modules/nx/schemas/project-schema.json".into(),
            source_root: "micro-repos/libs/widget/src".into(),
        };
        let input = r#"{"name":"w","$schema":"../x.json","sourceRoot":"w/src","tags":[]}"#;
        let out = patch.apply(&RelativePath::new("project.json"), input).unwrap();

        assert_eq!(
            out,
            "{\n  \"name\": \"w\",\n  \"$schema\": \"../../../node_modules/nx/schemas/project-schema.json\",\n  \"sourceRoot\": \"micro-repos/libs/widget/src\",\n  \"tags\": []\n}\n"
        );
        assert_eq!(patch.apply(&RelativePath::new("project.json"), &out).unwrap(), out);
    }

    #[test]
    fn package_manifest_merges_dev_dependencies() {
        let patch = DocumentPatch::PackageManifest {
            description: Some("Utility library".into()),
            keywords: vec!["utils".into(), "nx".into()],
            dev_dependencies: vec![("@storybook/react".into(), "^7.0.0".into())],
        };
        let input = r#"{"name":"w","devDependencies":{"vite":"^5.0.0"}}"#;
        let out = patch.apply(&RelativePath::new("package.json"), input).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["description"], "Utility library");
        assert_eq!(value["keywords"][1], "nx");
        assert_eq!(value["devDependencies"]["vite"], "^5.0.0");
        assert_eq!(value["devDependencies"]["@storybook/react"], "^7.0.0");
    }

    #[test]
    fn structured_patch_rejects_invalid_json() {
        let patch = DocumentPatch::BuildConfig {
            extends: Some("../tsconfig.base.json".into()),
            out_dir: None,
        };
        let err = patch
            .apply(&RelativePath::new("tsconfig.json"), "{ not json")
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDocument { .. }));

        let err = patch
            .apply(&RelativePath::new("tsconfig.json"), "[1, 2]")
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDocument { .. }));
    }

    #[test]
    fn plan_for_project_derives_prefixes() {
        let plan = RelocationPlan::for_project(
            RelativePath::new("micro-repos-libs-widget"),
            RelativePath::new("micro-repos/libs/widget"),
        );
        assert_eq!(plan.documents.len(), 7);
        assert_eq!(
            plan.documents[0].patch,
            DocumentPatch::ProjectDescriptor {
                schema: "../../../node_modules/nx/schemas/project-schema.json".into(),
                source_root: "micro-repos/libs/widget/src".into(),
            }
        );
        assert_eq!(
            plan.documents[1].patch,
            DocumentPatch::BuildConfig {
                extends: Some("../../../tsconfig.base.json".into()),
                out_dir: Some("../../../dist/out-tsc".into()),
            }
        );
        assert_eq!(
            plan.documents[2..5]
                .iter()
                .map(|d| d.file.as_str())
                .collect::<Vec<_>>(),
            vec!["tsconfig.app.json", "tsconfig.lib.json", "tsconfig.spec.json"]
        );
        assert_eq!(
            plan.document_path(&plan.documents[0]).as_str(),
            "micro-repos/libs/widget/project.json"
        );
    }

    #[test]
    fn build_config_moves_existing_out_dir_only() {
        let patch = DocumentPatch::BuildConfig {
            extends: None,
            out_dir: Some("../../../dist/out-tsc".into()),
        };
        let variant = r#"{"extends":"./tsconfig.json","compilerOptions":{"outDir":"../dist/out-tsc","declaration":true}}"#;
        let out = patch.apply(&RelativePath::new("tsconfig.lib.json"), variant).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["extends"], "./tsconfig.json");
        assert_eq!(value["compilerOptions"]["outDir"], "../../../dist/out-tsc");
        assert_eq!(value["compilerOptions"]["declaration"], true);
        assert_eq!(patch.apply(&RelativePath::new("tsconfig.lib.json"), &out).unwrap(), out);

        let bare = r#"{"extends":"../tsconfig.base.json"}"#;
        let out = patch.apply(&RelativePath::new("tsconfig.json"), bare).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("compilerOptions").is_none());
    }
}
