//! Generator Service - main application orchestrator.
//!
//! Runs one generator against a virtual tree:
//!
//! ```text
//! Validating → BaseSkeleton → Templating → Relocating → Finalizing → Done
//! ```
//!
//! Any phase can fail; the remaining phases are skipped and the tree is left
//! for the caller to discard. Nothing here flushes. The caller flushes the
//! tree and only then runs the returned deferred tasks.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{Span, error, field, info, instrument, warn};

use crate::{
    application::{
        ports::{DependencyInstaller, Formatter, SkeletonGenerator, SkeletonRequest, TemplateCatalog},
        services::{relocation_service, template_engine},
        tasks::{DeferredTask, DeferredTasks},
        tree::VirtualTree,
    },
    domain::{
        BUILTIN_GENERATORS, Category, DocumentPatch, DomainError, DomainValidator as validator,
        GeneratorOptions, GeneratorSpec, ProjectKind, RelativePath, RelocationPlan,
        ResolvedOptions, TemplateContext,
    },
    error::{ForgeError, ForgeResult},
};

/// Pipeline phase, recorded on the `generate` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Validating,
    BaseSkeleton,
    Templating,
    Relocating,
    Finalizing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::BaseSkeleton => "base-skeleton",
            Self::Templating => "templating",
            Self::Relocating => "relocating",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
        })
    }
}

/// Where projects go inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    /// Parent of every category directory, e.g. `micro-repos`.
    pub projects_dir: RelativePath,
    /// Category that e2e companions are moved into.
    pub e2e_category: String,
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            projects_dir: RelativePath::new("micro-repos"),
            e2e_category: "e2e".into(),
        }
    }
}

impl WorkspaceLayout {
    /// `{projects_dir}/{category}/{name}`.
    pub fn destination(&self, category: Category, name: &str) -> ForgeResult<RelativePath> {
        Ok(self.projects_dir.join(category.as_str())?.join(name)?)
    }

    /// `{projects_dir}/{e2e_category}/{name}-e2e`.
    pub fn companion_destination(&self, name: &str) -> ForgeResult<RelativePath> {
        Ok(self
            .projects_dir
            .join(&self.e2e_category)?
            .join(format!("{name}-e2e"))?)
    }

    /// `{projects_dir_slug}-{category}-{name}`: a single segment at the root.
    pub fn staging_name(&self, category: Category, name: &str) -> String {
        let mut parts: Vec<&str> = self.projects_dir.segments().collect();
        parts.push(category.as_str());
        parts.push(name);
        parts.join("-")
    }
}

/// Everything one generator run produced.
#[derive(Debug)]
pub struct Generation {
    pub generator: &'static str,
    pub options: ResolvedOptions,
    pub project: RelativePath,
    /// Set when a companion existed and was moved.
    pub companion: Option<RelativePath>,
    pub templated: Vec<RelativePath>,
    pub repaired: Vec<RelativePath>,
    pub formatted: usize,
    /// Non-fatal problems (companion relocation, formatting).
    pub warnings: Vec<String>,
    pub tasks: DeferredTasks,
}

/// Information about a generator for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorInfo {
    pub id: String,
    pub summary: String,
    pub kind: String,
    pub default_category: String,
    pub categories: Vec<String>,
    pub flags: Vec<String>,
}

/// Main generator orchestrator.
pub struct GeneratorService {
    skeleton: Box<dyn SkeletonGenerator>,
    catalog: Box<dyn TemplateCatalog>,
    formatter: Option<Box<dyn Formatter>>,
    installer: Option<Arc<dyn DependencyInstaller>>,
    layout: WorkspaceLayout,
}

impl GeneratorService {
    /// Create a service with the required adapters. Formatting and
    /// installation are off until their adapters are supplied.
    pub fn new(skeleton: Box<dyn SkeletonGenerator>, catalog: Box<dyn TemplateCatalog>) -> Self {
        Self {
            skeleton,
            catalog,
            formatter: None,
            installer: None,
            layout: WorkspaceLayout::default(),
        }
    }

    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_installer(mut self, installer: Arc<dyn DependencyInstaller>) -> Self {
        self.installer = Some(installer);
        self
    }

    pub fn with_layout(mut self, layout: WorkspaceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// List every built-in generator.
    pub fn list_generators(&self) -> Vec<GeneratorInfo> {
        BUILTIN_GENERATORS
            .iter()
            .map(|g| GeneratorInfo {
                id: g.id.to_string(),
                summary: g.summary.to_string(),
                kind: g.kind.to_string(),
                default_category: g.default_category.to_string(),
                categories: g.categories.iter().map(ToString::to_string).collect(),
                flags: g
                    .flags
                    .iter()
                    .map(|f| format!("{}={}", f.name, f.default))
                    .collect(),
            })
            .collect()
    }

    /// Run the generator `generator_id` against `tree`.
    #[instrument(skip_all, fields(generator = %generator_id, project = %options.name, phase = field::Empty))]
    pub fn generate(
        &self,
        tree: &mut VirtualTree,
        generator_id: &str,
        options: &GeneratorOptions,
    ) -> ForgeResult<Generation> {
        let mut phase = Phase::Validating;
        let result = self.run_phases(tree, generator_id, options, &mut phase);
        if let Err(e) = &result {
            error!(phase = %phase, error = %e, "Generator failed");
        }
        result
    }

    fn run_phases(
        &self,
        tree: &mut VirtualTree,
        generator_id: &str,
        options: &GeneratorOptions,
        phase: &mut Phase,
    ) -> ForgeResult<Generation> {
        // 1. Validating
        enter(phase, Phase::Validating);
        let spec = GeneratorSpec::find(generator_id)?;
        let resolved = validator::validate_options(spec, options)?;
        let name = resolved.name().as_str();

        let project = self.layout.destination(resolved.category(), name)?;
        let staging = RelativePath::try_new(self.layout.staging_name(resolved.category(), name))?;
        info!(destination = %project, staging = %staging, "Options validated");

        // 2. BaseSkeleton
        enter(phase, Phase::BaseSkeleton);
        let request = skeleton_request(spec, &resolved, &staging);
        self.skeleton.generate(tree, &request)?;

        // 3. Templating
        enter(phase, Phase::Templating);
        let set = self.catalog.template_set(spec.template_set)?;
        let target = staging.join(spec.template_target)?;
        let context = TemplateContext::for_project(&resolved, &project);
        let templated = template_engine::instantiate(tree, &set, &target, &context)?;
        info!(files = templated.len(), "Templates instantiated");

        // 4. Relocating
        enter(phase, Phase::Relocating);
        let mut warnings = Vec::new();
        let primary = relocation_service::apply_plan(
            tree,
            &RelocationPlan::for_project(staging.clone(), project.clone()),
        )?;
        if !primary.relocated {
            let message = format!("nothing was generated at {staging}; skipped relocation");
            warn!("{message}");
            warnings.push(message);
        }
        let mut repaired = primary.repaired;

        let mut companion = None;
        if let Some(companion_staging) = request.companion_directory()? {
            let companion_dest = self.layout.companion_destination(name)?;
            let plan = RelocationPlan::for_project(companion_staging.clone(), companion_dest.clone());
            match relocation_service::apply_plan(tree, &plan) {
                Ok(outcome) if outcome.relocated => {
                    repaired.extend(outcome.repaired);
                    companion = Some(companion_dest);
                }
                Ok(_) => {}
                Err(ForgeError::Domain(e @ DomainError::InvalidRename { .. })) => {
                    // Never flush a staging directory at the workspace root.
                    tree.delete(&companion_staging);
                    warn!(error = %e, staging = %companion_staging, "Companion relocation skipped");
                    warnings.push(format!("companion not relocated: {e}"));
                }
                Err(e) => return Err(e),
            }
        }

        // 5. Finalizing
        enter(phase, Phase::Finalizing);
        if !spec.manifest_keywords.is_empty() {
            let manifest = project.join("package.json")?;
            let patch = DocumentPatch::PackageManifest {
                description: Some(resolved.description().to_string()),
                keywords: spec.manifest_keywords.iter().map(|k| k.to_string()).collect(),
                dev_dependencies: spec.dev_dependencies_for(&resolved),
            };
            if relocation_service::repair_references(tree, &manifest, &patch)? {
                repaired.push(manifest);
            }
        }

        let mut formatted = 0;
        if let Some(formatter) = &self.formatter {
            let changed = tree.changed_files();
            match formatter.format(tree, &changed) {
                Ok(n) => formatted = n,
                Err(e) => {
                    warn!(error = %e, "Formatting failed; continuing");
                    warnings.push(format!("formatting failed: {e}"));
                }
            }
        }

        let mut tasks = DeferredTasks::new(tree.session());
        if let Some(installer) = &self.installer {
            let installer = Arc::clone(installer);
            tasks.push(DeferredTask::new(
                format!("install dependencies ({})", installer.command_line()),
                move || installer.install(),
            ));
        }

        enter(phase, Phase::Done);
        info!(
            project = %project,
            operations = tree.operations().len(),
            tasks = tasks.len(),
            "Generator completed"
        );

        Ok(Generation {
            generator: spec.id,
            options: resolved,
            project,
            companion,
            templated,
            repaired,
            formatted,
            warnings,
            tasks,
        })
    }
}

fn enter(current: &mut Phase, next: Phase) {
    *current = next;
    Span::current().record("phase", field::display(next));
    info!(phase = %next, "Entering phase");
}

fn skeleton_request(
    spec: &GeneratorSpec,
    options: &ResolvedOptions,
    staging: &RelativePath,
) -> SkeletonRequest {
    let (unit_test_runner, e2e_test_runner, type_tag) = match spec.kind {
        ProjectKind::Application => (Some("vitest"), Some("playwright"), "type:app"),
        ProjectKind::Library => (
            options.flag("includeTests").then_some("vitest"),
            None,
            "type:util",
        ),
    };

    SkeletonRequest {
        project_name: staging.as_str().to_string(),
        kind: spec.kind,
        bundler: "vite".into(),
        style: "css".into(),
        unit_test_runner: unit_test_runner.map(str::to_string),
        e2e_test_runner: e2e_test_runner.map(str::to_string),
        tags: vec![format!("scope:{}", options.category()), type_tag.to_string()],
    }
}
