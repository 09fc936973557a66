//! End-to-end generator runs over the real adapters.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

use monoforge_adapters::{
    BasicFormatter, BuiltinCatalog, LocalStorage, MemoryStorage, NxSkeleton, discover,
};
use monoforge_core::{
    application::{ApplicationError, VirtualTree, ports::{DependencyInstaller, Storage}},
    domain::{Category, DomainError, GeneratorOptions},
    error::{ForgeError, ForgeResult},
    prelude::GeneratorService,
};

#[derive(Default)]
struct CountingInstaller {
    runs: AtomicUsize,
}

impl DependencyInstaller for CountingInstaller {
    fn command_line(&self) -> String {
        "npm install".into()
    }

    fn install(&self) -> ForgeResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn service() -> GeneratorService {
    GeneratorService::new(Box::new(NxSkeleton::new()), Box::new(BuiltinCatalog::new()))
        .with_formatter(Box::new(BasicFormatter::new()))
}

fn json(storage: &MemoryStorage, path: &str) -> Value {
    let raw = storage
        .read_file(path)
        .unwrap_or_else(|| panic!("{path} was not written"));
    serde_json::from_str(&raw).unwrap()
}

fn run(storage: &MemoryStorage, generator: &str, options: &GeneratorOptions) -> ForgeResult<()> {
    let mut tree = VirtualTree::new(Arc::new(storage.clone()));
    match service().generate(&mut tree, generator, options) {
        Ok(generation) => {
            let receipt = tree.flush()?;
            assert!(generation.tasks.run(&receipt).is_success());
            Ok(())
        }
        Err(e) => {
            tree.discard();
            Err(e)
        }
    }
}

#[test]
fn utils_lib_lands_under_category_with_repaired_configuration() {
    let storage = MemoryStorage::new();
    run(&storage, "utils-lib", &GeneratorOptions::new("widget")).unwrap();

    let files = storage.files();
    assert!(files.iter().all(|f| f.starts_with("micro-repos/libs/widget/")), "{files:?}");
    assert!(files.contains(&"micro-repos/libs/widget/src/lib/widget.ts".to_string()));
    assert!(files.contains(&"micro-repos/libs/widget/src/lib/widget.spec.ts".to_string()));

    let project = json(&storage, "micro-repos/libs/widget/project.json");
    assert_eq!(project["$schema"], "../../../node_modules/nx/schemas/project-schema.json");
    assert_eq!(project["sourceRoot"], "micro-repos/libs/widget/src");
    assert_eq!(project["tags"], serde_json::json!(["scope:libs", "type:util"]));

    let tsconfig = json(&storage, "micro-repos/libs/widget/tsconfig.json");
    assert_eq!(tsconfig["extends"], "../../../tsconfig.base.json");

    let manifest = json(&storage, "micro-repos/libs/widget/package.json");
    assert_eq!(manifest["description"], "Utility library");
    assert_eq!(manifest["keywords"], serde_json::json!(["utils", "typescript", "nx"]));
    assert!(manifest.get("devDependencies").is_none());

    let eslint = storage.read_file("micro-repos/libs/widget/eslint.config.mjs").unwrap();
    assert!(eslint.contains("'../../../eslint.config.mjs'"));
    let vite = storage.read_file("micro-repos/libs/widget/vite.config.ts").unwrap();
    assert!(vite.contains("'../../../node_modules/.vite/"));
}

#[test]
fn utils_lib_with_storybook_adds_dev_dependencies() {
    let storage = MemoryStorage::new();
    let options = GeneratorOptions::new("ui-kit")
        .category(Category::Shared)
        .flag("includeStorybook", true)
        .flag("includeTests", false);
    run(&storage, "utils-lib", &options).unwrap();

    let manifest = json(&storage, "micro-repos/shared/ui-kit/package.json");
    assert_eq!(manifest["devDependencies"]["@storybook/react"], "^7.0.0");
    assert!(storage.read_file("micro-repos/shared/ui-kit/tsconfig.spec.json").is_none());
}

#[test]
fn counter_app_moves_project_and_companion() {
    let storage = MemoryStorage::new();
    run(&storage, "counter-app", &GeneratorOptions::new("clicks")).unwrap();

    let app = storage
        .read_file("micro-repos/apps/clicks/src/app/app.tsx")
        .unwrap();
    assert!(app.contains("title=\"Counter\""));
    assert!(storage
        .read_file("micro-repos/apps/clicks/src/app/src/components/Counter.tsx")
        .is_some());

    let companion = json(&storage, "micro-repos/e2e/clicks-e2e/project.json");
    assert_eq!(companion["$schema"], "../../../node_modules/nx/schemas/project-schema.json");
    assert_eq!(companion["sourceRoot"], "micro-repos/e2e/clicks-e2e/src");

    assert!(storage.files().iter().all(|f| f.starts_with("micro-repos/")));
}

#[test]
fn todo_app_renders_flags() {
    let storage = MemoryStorage::new();
    let options = GeneratorOptions::new("tasks")
        .title("My tasks")
        .flag("enablePriority", true);
    run(&storage, "todo-app", &options).unwrap();

    let app = storage.read_file("micro-repos/apps/tasks/src/app/app.tsx").unwrap();
    assert!(app.contains("title=\"My tasks\""));
    assert!(app.contains("enableFilters={true}"));
    assert!(app.contains("enablePriority={true}"));
}

#[test]
fn generation_is_deterministic() {
    let a = MemoryStorage::new();
    let b = MemoryStorage::new();
    run(&a, "counter-app", &GeneratorOptions::new("clicks")).unwrap();
    run(&b, "counter-app", &GeneratorOptions::new("clicks")).unwrap();

    assert_eq!(a.files(), b.files());
    for file in a.files() {
        assert_eq!(a.read_file(&file), b.read_file(&file), "{file}");
    }
}

#[test]
fn second_run_into_occupied_destination_changes_nothing() {
    let storage = MemoryStorage::new();
    run(&storage, "utils-lib", &GeneratorOptions::new("widget")).unwrap();
    let before: Vec<_> = storage
        .files()
        .into_iter()
        .map(|f| (storage.read_file(&f), f))
        .collect();

    let err = run(&storage, "utils-lib", &GeneratorOptions::new("widget")).unwrap_err();
    assert!(matches!(err, ForgeError::Domain(DomainError::InvalidRename { .. })));

    let after: Vec<_> = storage
        .files()
        .into_iter()
        .map(|f| (storage.read_file(&f), f))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn existing_companion_is_a_warning_not_an_error() {
    let storage = MemoryStorage::new().with_file("micro-repos/e2e/clicks-e2e/keep.txt", "mine");
    let mut tree = VirtualTree::new(Arc::new(storage.clone()));

    let generation = service()
        .generate(&mut tree, "counter-app", &GeneratorOptions::new("clicks"))
        .unwrap();
    assert_eq!(generation.companion, None);
    assert_eq!(generation.warnings.len(), 1);

    tree.flush().unwrap();
    assert_eq!(storage.read_file("micro-repos/e2e/clicks-e2e/keep.txt").as_deref(), Some("mine"));
    assert!(storage.read_file("micro-repos/apps/clicks/project.json").is_some());
    let files = storage.files();
    assert!(files.iter().all(|f| f.starts_with("micro-repos/")), "{files:?}");
}

#[test]
fn every_tsconfig_points_back_to_the_workspace_root() {
    let storage = MemoryStorage::new();
    run(&storage, "utils-lib", &GeneratorOptions::new("widget")).unwrap();
    run(&storage, "counter-app", &GeneratorOptions::new("clicks")).unwrap();

    let tsconfigs: Vec<String> = storage
        .files()
        .into_iter()
        .filter(|f| {
            let name = f.rsplit('/').next().unwrap_or_default();
            name.starts_with("tsconfig") && name.ends_with(".json")
        })
        .collect();
    for expected in [
        "micro-repos/libs/widget/tsconfig.lib.json",
        "micro-repos/apps/clicks/tsconfig.app.json",
        "micro-repos/e2e/clicks-e2e/tsconfig.json",
    ] {
        assert!(tsconfigs.iter().any(|f| f == expected), "{expected} missing: {tsconfigs:?}");
    }

    for file in &tsconfigs {
        let depth = file.matches('/').count();
        let prefix = "../".repeat(depth);
        let doc = json(&storage, file);

        if let Some(extends) = doc["extends"].as_str().filter(|e| !e.starts_with("./")) {
            assert_eq!(extends, format!("{prefix}tsconfig.base.json"), "{file}");
        }
        if let Some(out_dir) = doc["compilerOptions"]["outDir"].as_str() {
            assert_eq!(out_dir, format!("{prefix}dist/out-tsc"), "{file}");
        }
    }

    let lib = json(&storage, "micro-repos/libs/widget/tsconfig.lib.json");
    assert_eq!(lib["compilerOptions"]["outDir"], "../../../dist/out-tsc");
    assert_eq!(lib["extends"], "./tsconfig.json");
}

#[test]
fn unresolved_token_leaves_storage_untouched() {
    let workspace = TempDir::new().unwrap();
    let set = workspace.path().join("tools/templates/counter-app");
    fs::create_dir_all(&set).unwrap();
    fs::write(set.join("app.tsx"), "<%= missingToken %>").unwrap();

    let storage = Arc::new(LocalStorage::new(workspace.path()));
    let catalog = discover(workspace.path(), None).unwrap();
    let service = GeneratorService::new(Box::new(NxSkeleton::new()), Box::new(catalog));

    let mut tree = VirtualTree::new(storage.clone());
    let err = service
        .generate(&mut tree, "counter-app", &GeneratorOptions::new("clicks"))
        .unwrap_err();
    tree.discard();

    assert!(matches!(
        err,
        ForgeError::Domain(DomainError::UnresolvedToken { ref token, .. }) if token == "missingToken"
    ));
    assert!(!workspace.path().join("micro-repos").exists());
    assert!(!workspace.path().join("micro-repos-apps-clicks").exists());
}

#[test]
fn failed_flush_never_runs_tasks() {
    let workspace = TempDir::new().unwrap();
    // A file where the projects directory should be makes the move fail.
    fs::write(workspace.path().join("micro-repos"), "").unwrap();

    let installer = Arc::new(CountingInstaller::default());
    let service = service().with_installer(installer.clone());
    let storage = Arc::new(LocalStorage::new(workspace.path()));

    let mut tree = VirtualTree::new(storage);
    let generation = service
        .generate(&mut tree, "utils-lib", &GeneratorOptions::new("widget"))
        .unwrap();
    assert_eq!(generation.tasks.len(), 1);

    let err = tree.flush().unwrap_err();
    assert!(matches!(
        err,
        ForgeError::Application(ApplicationError::FlushFailed { .. })
    ));
    drop(generation);
    assert_eq!(installer.runs.load(Ordering::SeqCst), 0);
}

#[test]
fn local_storage_run_writes_to_disk_and_runs_install_after_flush() {
    let workspace = TempDir::new().unwrap();
    let installer = Arc::new(CountingInstaller::default());
    let service = service().with_installer(installer.clone());
    let storage = Arc::new(LocalStorage::new(workspace.path()));

    let mut tree = VirtualTree::new(storage.clone());
    let generation = service
        .generate(&mut tree, "utils-lib", &GeneratorOptions::new("widget").category(Category::Tools))
        .unwrap();
    assert_eq!(installer.runs.load(Ordering::SeqCst), 0);

    let receipt = tree.flush().unwrap();
    let report = generation.tasks.run(&receipt);
    assert_eq!(report.completed, vec!["install dependencies (npm install)"]);
    assert_eq!(installer.runs.load(Ordering::SeqCst), 1);

    assert!(storage.is_file(&"micro-repos/tools/widget/project.json".into()));
    assert!(!workspace.path().join("micro-repos-tools-widget").exists());
}
