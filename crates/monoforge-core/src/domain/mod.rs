//! Core domain layer for Monoforge.
//!
//! Pure logic with no I/O: generator descriptions, option validation, name
//! derivation, template tokens and relocation patches. Everything that
//! touches a tree or the outside world goes through the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or process calls
//! - **Immutable values**: options, plans and patches are Clone + PartialEq
// Public API - what the world sees
pub mod common;
pub mod error;
pub mod generator;
pub mod naming;
pub mod options;
pub mod relocation;
pub mod template;

mod validation;

// Re-exports for convenience
pub use common::RelativePath;
pub use error::{DomainError, ErrorCategory};
pub use generator::{BUILTIN_GENERATORS, FlagDependencies, FlagSpec, GeneratorSpec, ProjectKind};
pub use naming::Names;
pub use options::{Category, GeneratorOptions, ProjectName, ResolvedOptions};
pub use relocation::{DocumentPatch, DocumentRepair, RelocationPlan, TextRule, relative_prefix};
pub use template::{TemplateContext, TemplateEntry, TemplateSet};
pub use validation::DomainValidator;

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn validator_resolves_options() {
        let spec = GeneratorSpec::find("counter-app").unwrap();
        let resolved =
            DomainValidator::validate_options(spec, &GeneratorOptions::new("clicks")).unwrap();
        assert_eq!(resolved.name().as_str(), "clicks");
        assert_eq!(resolved.title(), "Counter");
    }

    #[test]
    fn duplicate_template_paths_are_rejected() {
        let set = TemplateSet::new(
            "dup",
            vec![
                TemplateEntry::new("a.ts", "1"),
                TemplateEntry::new("a.ts", "2"),
            ],
        );
        assert!(matches!(
            DomainValidator::validate_template_set(&set),
            Err(DomainError::MalformedTemplate { .. })
        ));
    }

    #[test]
    fn plan_into_own_subtree_is_rejected() {
        let plan = RelocationPlan::new(RelativePath::new("a"), RelativePath::new("a/b"));
        assert!(matches!(
            DomainValidator::validate_plan(&plan),
            Err(DomainError::InvalidRename { .. })
        ));
    }

    #[test]
    fn plan_between_siblings_is_valid() {
        let plan = RelocationPlan::for_project(
            RelativePath::new("micro-repos-apps-demo"),
            RelativePath::new("micro-repos/apps/demo"),
        );
        assert!(DomainValidator::validate_plan(&plan).is_ok());
    }

    // ========================================================================
    // End-to-end domain flow (no tree involved)
    // ========================================================================

    #[test]
    fn options_flow_into_template_context_and_plan() {
        let spec = GeneratorSpec::find("utils-lib").unwrap();
        let resolved = spec
            .resolve(&GeneratorOptions::new("string-tools").category(Category::Shared))
            .unwrap();

        let destination = RelativePath::new("micro-repos")
            .join(resolved.category().as_str())
            .and_then(|p| p.join(resolved.name().as_str()))
            .unwrap();
        assert_eq!(destination.as_str(), "micro-repos/shared/string-tools");

        let ctx = TemplateContext::for_project(&resolved, &destination);
        let path = ctx.render_path("src/lib/__fileName__.ts").unwrap();
        assert_eq!(path.as_str(), "src/lib/string-tools.ts");

        let body = ctx
            .render_content("export function <%= propertyName %>() {}", "lib.ts")
            .unwrap();
        assert_eq!(body, "export function stringTools() {}");
    }
}
