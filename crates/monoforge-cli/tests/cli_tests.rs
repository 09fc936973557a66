//! End-to-end tests for the `monoforge` binary.

use std::fs;
use std::path::Path;

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the developer's config and environment.
fn monoforge(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("monoforge");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("MONOFORGE_TEMPLATES_DIR")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn list_json_describes_builtin_generators() {
    let temp = TempDir::new().unwrap();
    let out = monoforge(temp.path())
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let generators: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let ids: Vec<&str> = generators
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["counter-app", "todo-app", "utils-lib"]);
}

#[test]
fn dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path())
        .args(["generate", "utils-lib", "widget", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains(
            "rename micro-repos-libs-widget -> micro-repos/libs/widget",
        ));

    assert!(!temp.path().join("micro-repos").exists());
    assert!(!temp.path().join("micro-repos-libs-widget").exists());
}

#[test]
fn generate_library_into_workspace() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path())
        .args(["generate", "utils-lib", "widget", "--skip-install", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("micro-repos/libs/widget"));

    let root = temp.path().join("micro-repos/libs/widget");
    let project: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("project.json")).unwrap()).unwrap();
    assert_eq!(
        project["$schema"],
        "../../../node_modules/nx/schemas/project-schema.json"
    );
    assert!(root.join("src/lib/widget.ts").is_file());
    assert!(!temp.path().join("micro-repos-libs-widget").exists());
}

#[test]
fn generate_json_output_reports_files() {
    let temp = TempDir::new().unwrap();
    let out = monoforge(temp.path())
        .args([
            "--output-format",
            "json",
            "generate",
            "counter-app",
            "clicks",
            "--skip-install",
            "--title",
            "Click me",
        ])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["project"], "micro-repos/apps/clicks");
    assert_eq!(summary["dry_run"], false);
    assert!(
        summary["files"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f == "micro-repos/apps/clicks/src/app/src/components/Counter.tsx")
    );
}

#[test]
fn unknown_generator_is_not_found() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path())
        .args(["generate", "rocket-app", "x", "--skip-install"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("rocket-app"))
        .stderr(predicate::str::contains("monoforge list"));
}

#[test]
fn invalid_name_is_a_user_error() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path())
        .args(["generate", "utils-lib", "Bad Name", "--skip-install"])
        .assert()
        .code(2);
    assert!(fs::read_dir(temp.path()).unwrap().next().is_none());
}

#[test]
fn occupied_destination_is_left_untouched() {
    let temp = TempDir::new().unwrap();
    let existing = temp.path().join("micro-repos/libs/widget");
    fs::create_dir_all(&existing).unwrap();
    fs::write(existing.join("keep.txt"), "mine").unwrap();

    monoforge(temp.path())
        .args(["generate", "utils-lib", "widget", "--skip-install"])
        .assert()
        .code(2);

    assert_eq!(fs::read_to_string(existing.join("keep.txt")).unwrap(), "mine");
    assert!(!existing.join("project.json").exists());
    assert!(!temp.path().join("micro-repos-libs-widget").exists());
}

#[test]
fn config_get_reads_local_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".monoforge.toml"),
        "[workspace]\nprojects_dir = \"packages\"\n",
    )
    .unwrap();

    monoforge(temp.path())
        .args(["config", "get", "workspace.projects_dir"])
        .assert()
        .success()
        .stdout("packages\n");
}

#[test]
fn unknown_config_key_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path())
        .args(["config", "get", "nope.missing"])
        .assert()
        .code(4);
}

#[test]
fn init_local_then_refuse_without_force() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path()).args(["init", "--local"]).assert().success();
    assert!(temp.path().join(".monoforge.toml").is_file());

    monoforge(temp.path())
        .args(["init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn completions_for_bash() {
    let temp = TempDir::new().unwrap();
    monoforge(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("monoforge"));
}
