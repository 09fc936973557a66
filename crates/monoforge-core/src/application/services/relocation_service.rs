//! Path relocation and reference repair.
//!
//! A relocation is a staged rename followed by typed patches over the
//! moved project's configuration documents. Repairs always run after their
//! project's rename and before the tree is flushed.

use tracing::{debug, info, instrument};

use crate::{
    application::tree::VirtualTree,
    domain::{DocumentPatch, DomainValidator as validator, RelativePath, RelocationPlan},
    error::ForgeResult,
};

/// What a plan actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationOutcome {
    /// False when the source did not exist and nothing moved.
    pub relocated: bool,
    /// Documents whose content changed.
    pub repaired: Vec<RelativePath>,
}

/// Move `source` to `destination`. Returns false, staging nothing, when the
/// source does not exist.
///
/// # Errors
/// `InvalidRename` from the tree.
pub fn relocate(
    tree: &mut VirtualTree,
    source: &RelativePath,
    destination: &RelativePath,
) -> ForgeResult<bool> {
    if !tree.exists(source) {
        debug!(source = %source, "nothing to relocate");
        return Ok(false);
    }
    tree.rename(source, destination)?;
    Ok(true)
}

/// Apply `patch` to `file`. Absent files are skipped; unchanged content is
/// not rewritten. Returns whether the file changed.
///
/// # Errors
/// `InvalidDocument` when a structured patch meets malformed JSON.
pub fn repair_references(
    tree: &mut VirtualTree,
    file: &RelativePath,
    patch: &DocumentPatch,
) -> ForgeResult<bool> {
    let Some(current) = tree.read_optional(file)? else {
        debug!(file = %file, "skipping repair of absent document");
        return Ok(false);
    };

    let patched = patch.apply(file, &current)?;
    if patched == current {
        return Ok(false);
    }

    debug!(file = %file, patch = patch.kind(), "document repaired");
    tree.write(file, patched)?;
    Ok(true)
}

/// Relocate per `plan`, then repair each of its documents at the new location.
#[instrument(skip_all, fields(source = %plan.source, destination = %plan.destination))]
pub fn apply_plan(tree: &mut VirtualTree, plan: &RelocationPlan) -> ForgeResult<RelocationOutcome> {
    validator::validate_plan(plan)?;

    if !relocate(tree, &plan.source, &plan.destination)? {
        return Ok(RelocationOutcome::default());
    }

    let mut repaired = Vec::new();
    for repair in &plan.documents {
        let path = plan.document_path(repair);
        if repair_references(tree, &path, &repair.patch)? {
            repaired.push(path);
        }
    }

    info!(repaired = repaired.len(), "Project relocated");
    Ok(RelocationOutcome {
        relocated: true,
        repaired,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::testing::StubStorage;
    use crate::domain::{DomainError, TextRule};
    use crate::error::ForgeError;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> RelativePath {
        RelativePath::new(s)
    }

    fn staged_project(tree: &mut VirtualTree, root: &str) {
        tree.write(
            &p(&format!("{root}/project.json")),
            format!(
                "{{\n  \"name\": \"{root}\",\n  \"$schema\": \"../node_modules/nx/schemas/project-schema.json\",\n  \"sourceRoot\": \"{root}/src\"\n}}\n"
            ),
        )
        .unwrap();
        tree.write(
            &p(&format!("{root}/tsconfig.json")),
            "{\n  \"extends\": \"../tsconfig.base.json\"\n}\n",
        )
        .unwrap();
    }

    #[test]
    fn relocate_missing_source_is_false() {
        let mut tree = VirtualTree::new(Arc::new(StubStorage::default()));
        assert!(!relocate(&mut tree, &p("ghost"), &p("libs/ghost")).unwrap());
        assert!(tree.is_clean());
    }

    #[test]
    fn apply_plan_moves_and_repairs() {
        let mut tree = VirtualTree::new(Arc::new(StubStorage::default()));
        staged_project(&mut tree, "micro-repos-libs-widget");

        let plan = RelocationPlan::for_project(
            p("micro-repos-libs-widget"),
            p("micro-repos/libs/widget"),
        );
        let outcome = apply_plan(&mut tree, &plan).unwrap();

        assert!(outcome.relocated);
        assert_eq!(
            outcome.repaired,
            vec![
                p("micro-repos/libs/widget/project.json"),
                p("micro-repos/libs/widget/tsconfig.json"),
            ]
        );

        let project: serde_json::Value =
            serde_json::from_str(&tree.read(&p("micro-repos/libs/widget/project.json")).unwrap())
                .unwrap();
        assert_eq!(project["$schema"], "../../../node_modules/nx/schemas/project-schema.json");
        assert_eq!(project["sourceRoot"], "micro-repos/libs/widget/src");
        assert_eq!(project["name"], "micro-repos-libs-widget");

        let tsconfig = tree.read(&p("micro-repos/libs/widget/tsconfig.json")).unwrap();
        assert!(tsconfig.contains("\"../../../tsconfig.base.json\""));
    }

    #[test]
    fn repair_is_idempotent() {
        let mut tree = VirtualTree::new(Arc::new(StubStorage::default()));
        tree.write(&p("w/eslint.config.mjs"), "import base from '../eslint.config.mjs';")
            .unwrap();
        let patch = DocumentPatch::Text {
            rules: vec![TextRule::new("'../eslint.config.mjs", "'../../../eslint.config.mjs")],
        };

        assert!(repair_references(&mut tree, &p("w/eslint.config.mjs"), &patch).unwrap());
        let ops = tree.operations().len();
        assert!(!repair_references(&mut tree, &p("w/eslint.config.mjs"), &patch).unwrap());
        assert_eq!(tree.operations().len(), ops);
        assert_eq!(
            tree.read(&p("w/eslint.config.mjs")).unwrap(),
            "import base from '../../../eslint.config.mjs';"
        );
    }

    #[test]
    fn repair_skips_absent_documents() {
        let mut tree = VirtualTree::new(Arc::new(StubStorage::default()));
        let patch = DocumentPatch::BuildConfig {
            extends: Some("../tsconfig.base.json".into()),
            out_dir: None,
        };
        assert!(!repair_references(&mut tree, &p("none/tsconfig.json"), &patch).unwrap());
    }

    #[test]
    fn occupied_destination_fails() {
        let storage = Arc::new(StubStorage::with_files(&[("micro-repos/libs/widget/x.ts", "")]));
        let mut tree = VirtualTree::new(storage);
        staged_project(&mut tree, "stage");

        let plan = RelocationPlan::for_project(p("stage"), p("micro-repos/libs/widget"));
        let err = apply_plan(&mut tree, &plan).unwrap_err();
        assert!(matches!(err, ForgeError::Domain(DomainError::InvalidRename { .. })));
    }
}
