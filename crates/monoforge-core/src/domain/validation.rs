use std::collections::BTreeSet;

use crate::domain::{
    error::DomainError,
    generator::GeneratorSpec,
    options::{GeneratorOptions, ResolvedOptions},
    relocation::RelocationPlan,
    template::TemplateSet,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across services.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_options(
        spec: &GeneratorSpec,
        options: &GeneratorOptions,
    ) -> Result<ResolvedOptions, DomainError> {
        spec.resolve(options)
    }

    /// Two entries with the same raw path would silently overwrite each other.
    pub fn validate_template_set(set: &TemplateSet) -> Result<(), DomainError> {
        let mut seen = BTreeSet::new();
        for entry in &set.entries {
            if !seen.insert(entry.path.as_str()) {
                return Err(DomainError::MalformedTemplate {
                    location: format!("{}/{}", set.name, entry.path),
                    reason: "duplicate template path".into(),
                });
            }
        }
        Ok(())
    }

    pub fn validate_plan(plan: &RelocationPlan) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidRename {
            from: plan.source.to_string(),
            to: plan.destination.to_string(),
            reason: reason.into(),
        };

        if plan.source.is_root() || plan.destination.is_root() {
            return Err(invalid("the workspace root cannot be moved"));
        }
        if plan.destination.starts_with(&plan.source) {
            return Err(invalid("destination lies inside the source"));
        }
        Ok(())
    }
}
