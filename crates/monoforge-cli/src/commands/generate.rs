//! Implementation of the `monoforge generate` command.
//!
//! Responsibility: turn CLI arguments into generator options, wire the
//! adapters into a `GeneratorService`, then flush the staged tree and run
//! the deferred tasks. No generator logic lives here.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use monoforge_adapters::{BasicFormatter, LocalStorage, NxSkeleton, PackageManagerInstaller, discover};
use monoforge_core::{
    application::{Generation, GeneratorService, TaskReport, TreeOperation, VirtualTree},
    domain::{Category, GeneratorOptions},
};

use crate::{
    cli::{GenerateArgs, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Machine-readable result for `--format json`.
#[derive(Debug, Serialize)]
struct GenerateSummary {
    session: Uuid,
    finished_at: DateTime<Utc>,
    generator: String,
    project: String,
    category: String,
    companion: Option<String>,
    dry_run: bool,
    files: Vec<String>,
    operations: Vec<String>,
    warnings: Vec<String>,
    tasks_completed: Vec<String>,
    tasks_failed: Vec<String>,
}

/// Execute the `monoforge generate` command.
///
/// 1. Resolve the workspace root and build generator options
/// 2. Confirm with the user unless `--yes`, `--quiet` or `--dry-run`
/// 3. Stage everything in a virtual tree
/// 4. Flush, or print the staged operations for `--dry-run`
/// 5. Run deferred tasks (dependency installation)
#[instrument(skip_all, fields(generator = %args.generator, project = %args.name))]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let workspace = resolve_workspace(args.workspace.as_deref())?;
    let options = build_options(&args)?;
    let service = build_service(&args, &config, &workspace)?;

    if !args.dry_run && !args.yes && !global.quiet && std::io::stdin().is_terminal() {
        let prompt = format!(
            "Generate '{}' with {} in {}?",
            args.name,
            args.generator,
            workspace.display()
        );
        if !confirm(&prompt)? {
            return Err(CliError::Cancelled);
        }
    }

    let mut tree = VirtualTree::new(Arc::new(LocalStorage::new(&workspace)));
    let session = tree.session();
    debug!(session = %session, workspace = %workspace.display(), "Generator session started");

    let mut generation = match service.generate(&mut tree, &args.generator, &options) {
        Ok(generation) => generation,
        Err(e) => {
            tree.discard();
            return Err(e.into());
        }
    };

    for warning in &generation.warnings {
        output.warning(warning)?;
    }

    let files: Vec<String> = tree.changed_files().iter().map(ToString::to_string).collect();
    let operations: Vec<String> = tree.operations().iter().map(TreeOperation::to_string).collect();

    if args.dry_run {
        tree.discard();
        output.header(&format!("Dry run: {} staged operation(s)", operations.len()))?;
        for op in &operations {
            output.print(&format!("  {op}"))?;
        }
        for label in generation.tasks.labels() {
            output.print(&format!("  deferred: {label}"))?;
        }
        if output.is_json() {
            output.json(&summary(session, &args, &generation, files, operations, true, None))?;
        }
        return Ok(());
    }

    let spinner = output.spinner(format!("Writing {} file(s)...", files.len()));
    let receipt = match tree.flush() {
        Ok(receipt) => receipt,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    spinner.set_message("Running deferred tasks...");

    let tasks = std::mem::take(&mut generation.tasks);
    let report = tasks.run(&receipt);
    spinner.finish_and_clear();

    info!(
        generator = generation.generator,
        project = %generation.project,
        files = files.len(),
        templated = generation.templated.len(),
        repaired = generation.repaired.len(),
        formatted = generation.formatted,
        "Generation completed"
    );

    if output.is_json() {
        let result = summary(session, &args, &generation, files, operations, false, Some(&report));
        output.json(&result)?;
    } else {
        output.success(&format!("Generated {}", generation.project))?;
        if let Some(companion) = &generation.companion {
            output.info(&format!("Companion moved to {companion}"))?;
        }
        output.print(&format!(
            "  {} file(s) written, {} from templates, {} reference(s) repaired",
            files.len(),
            generation.templated.len(),
            generation.repaired.len()
        ))?;
        print_report(&report, &output)?;
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::TasksFailed {
            failed: report.failed.iter().map(|f| f.label.clone()).collect(),
        })
    }
}

// ── Workspace + service wiring ────────────────────────────────────────────────

fn resolve_workspace(explicit: Option<&Path>) -> CliResult<PathBuf> {
    let root = match explicit {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(|e| CliError::IoError {
            message: "failed to read the current directory".into(),
            source: e,
        })?,
    };

    if !root.is_dir() {
        return Err(CliError::InvalidInput {
            message: format!("workspace '{}' is not a directory", root.display()),
        });
    }
    Ok(root)
}

fn build_service(args: &GenerateArgs, config: &AppConfig, workspace: &Path) -> CliResult<GeneratorService> {
    let templates = args
        .templates
        .as_deref()
        .or(config.generate.templates_dir.as_deref());
    let catalog = discover(workspace, templates)?;
    debug!(overlay = ?catalog.overlay_dir(), "Template catalog ready");

    let mut service = GeneratorService::new(Box::new(NxSkeleton), Box::new(catalog))
        .with_layout(config.layout()?);

    if !(args.skip_format || config.generate.skip_format) {
        service = service.with_formatter(Box::new(BasicFormatter));
    }
    if !(args.skip_install || config.generate.skip_install || args.dry_run) {
        service = service.with_installer(Arc::new(PackageManagerInstaller::new(workspace)));
    }
    Ok(service)
}

fn build_options(args: &GenerateArgs) -> CliResult<GeneratorOptions> {
    let mut options = GeneratorOptions::new(&args.name);

    if let Some(category) = &args.category {
        let category: Category = category.parse().map_err(|e: monoforge_core::domain::DomainError| CliError::Core(e.into()))?;
        options = options.category(category);
    }
    if let Some(title) = &args.title {
        options = options.title(title);
    }
    if let Some(description) = &args.description {
        options = options.description(description);
    }
    for flag in &args.enable {
        options = options.flag(flag, true);
    }
    for flag in &args.disable {
        if args.enable.contains(flag) {
            return Err(CliError::InvalidInput {
                message: format!("flag '{flag}' is both enabled and disabled"),
            });
        }
        options = options.flag(flag, false);
    }
    Ok(options)
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn summary(
    session: Uuid,
    args: &GenerateArgs,
    generation: &Generation,
    files: Vec<String>,
    operations: Vec<String>,
    dry_run: bool,
    report: Option<&TaskReport>,
) -> GenerateSummary {
    GenerateSummary {
        session,
        finished_at: Utc::now(),
        generator: args.generator.clone(),
        project: generation.project.to_string(),
        category: generation.options.category().to_string(),
        companion: generation.companion.as_ref().map(ToString::to_string),
        dry_run,
        files,
        operations,
        warnings: generation.warnings.clone(),
        tasks_completed: report.map(|r| r.completed.clone()).unwrap_or_default(),
        tasks_failed: report
            .map(|r| r.failed.iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
    }
}

fn print_report(report: &TaskReport, output: &OutputManager) -> CliResult<()> {
    for label in &report.completed {
        output.print(&format!("  done: {label}"))?;
    }
    for failure in &report.failed {
        output.warning(&failure.to_string())?;
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn confirm(prompt: &str) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm(prompt: &str) -> CliResult<bool> {
    use std::io::{self, Write};

    print!("{prompt} [Y/n] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}
