//! Base project skeletons in the layout Nx generators produce.
//!
//! The skeleton is written at the workspace root under the request's
//! project name. Every configuration file points back to the root through a
//! relative prefix sized for that location; relocation rewrites those
//! fields once the project moves.

use serde_json::{Value, json};
use tracing::{debug, instrument};

use monoforge_core::{
    application::{ApplicationError, VirtualTree, ports::{SkeletonGenerator, SkeletonRequest}},
    domain::{Names, ProjectKind, RelativePath, relative_prefix},
    error::ForgeResult,
};

/// Writes application and library skeletons for Vite + TypeScript projects.
#[derive(Debug, Clone, Default)]
pub struct NxSkeleton;

impl NxSkeleton {
    pub fn new() -> Self {
        Self
    }
}

impl SkeletonGenerator for NxSkeleton {
    #[instrument(skip_all, fields(project = %request.project_name, kind = %request.kind))]
    fn generate(&self, tree: &mut VirtualTree, request: &SkeletonRequest) -> ForgeResult<()> {
        if request.bundler != "vite" {
            return Err(ApplicationError::SkeletonFailed {
                reason: format!("unsupported bundler '{}'", request.bundler),
            }
            .into());
        }

        let root = request.directory()?;
        let mut writer = Writer { tree, root };
        match request.kind {
            ProjectKind::Application => application(&mut writer, request)?,
            ProjectKind::Library => library(&mut writer, request)?,
        }

        if let Some(companion) = request.companion_directory()? {
            let mut writer = Writer {
                tree: writer.tree,
                root: companion,
            };
            e2e_companion(&mut writer, request)?;
        }
        Ok(())
    }
}

struct Writer<'a> {
    tree: &'a mut VirtualTree,
    root: RelativePath,
}

impl Writer<'_> {
    fn prefix(&self) -> String {
        relative_prefix(&self.root)
    }

    fn dir(&self) -> &str {
        self.root.as_str()
    }

    fn text(&mut self, file: &str, content: impl Into<String>) -> ForgeResult<()> {
        let path = self.root.join(file)?;
        debug!(path = %path, "skeleton file");
        self.tree.write(&path, content)
    }

    fn json(&mut self, file: &str, value: &Value) -> ForgeResult<()> {
        let mut text = serde_json::to_string_pretty(value).map_err(|e| {
            ApplicationError::SkeletonFailed {
                reason: format!("cannot serialise {file}: {e}"),
            }
        })?;
        text.push('\n');
        self.text(file, text)
    }

    fn project_descriptor(&mut self, project_type: &str, tags: &[String], targets: Value) -> ForgeResult<()> {
        let prefix = self.prefix();
        let dir = self.dir().to_string();
        self.json(
            "project.json",
            &json!({
                "name": dir,
                "$schema": format!("{prefix}node_modules/nx/schemas/project-schema.json"),
                "sourceRoot": format!("{dir}/src"),
                "projectType": project_type,
                "tags": tags,
                "targets": targets,
            }),
        )
    }

    fn eslint_config(&mut self) -> ForgeResult<()> {
        let prefix = self.prefix();
        self.text(
            "eslint.config.mjs",
            format!("import baseConfig from '{prefix}eslint.config.mjs';\n\nexport default [...baseConfig];\n"),
        )
    }
}

fn application(w: &mut Writer<'_>, request: &SkeletonRequest) -> ForgeResult<()> {
    let prefix = w.prefix();
    let dir = w.dir().to_string();

    w.project_descriptor("application", &request.tags, json!({}))?;
    w.json(
        "tsconfig.json",
        &json!({
            "extends": format!("{prefix}tsconfig.base.json"),
            "compilerOptions": { "jsx": "react-jsx", "allowJs": false, "strict": true },
            "files": [],
            "include": [],
            "references": [{ "path": "./tsconfig.app.json" }],
        }),
    )?;
    w.json(
        "tsconfig.app.json",
        &json!({
            "extends": "./tsconfig.json",
            "compilerOptions": { "outDir": format!("{prefix}dist/out-tsc"), "types": ["node", "vite/client"] },
            "include": ["src/**/*.ts", "src/**/*.tsx"],
            "exclude": ["src/**/*.spec.ts", "src/**/*.test.tsx"],
        }),
    )?;
    w.text("vite.config.ts", vite_config(&prefix, &dir, request, false))?;
    w.eslint_config()?;
    w.text(
        "index.html",
        format!(
            "<!doctype html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"utf-8\" />\n    <title>{dir}</title>\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n  </head>\n  <body>\n    <div id=\"root\"></div>\n    <script type=\"module\" src=\"/src/main.tsx\"></script>\n  </body>\n</html>\n"
        ),
    )?;
    w.text(
        "src/main.tsx",
        "import { StrictMode } from 'react';\nimport * as ReactDOM from 'react-dom/client';\nimport App from './app/app';\n\nconst root = ReactDOM.createRoot(\n  document.getElementById('root') as HTMLElement\n);\n\nroot.render(\n  <StrictMode>\n    <App />\n  </StrictMode>\n);\n",
    )?;
    w.text(
        "src/app/app.tsx",
        format!("export function App() {{\n  return <h1>Welcome {dir}</h1>;\n}}\n\nexport default App;\n"),
    )?;
    w.text(&format!("src/styles.{}", request.style), "/* global styles */\n")?;

    if request.unit_test_runner.is_some() {
        w.text(
            "src/app/app.spec.tsx",
            "import { render } from '@testing-library/react';\nimport App from './app';\n\ndescribe('App', () => {\n  it('should render successfully', () => {\n    const { baseElement } = render(<App />);\n    expect(baseElement).toBeTruthy();\n  });\n});\n",
        )?;
    }
    Ok(())
}

fn library(w: &mut Writer<'_>, request: &SkeletonRequest) -> ForgeResult<()> {
    let prefix = w.prefix();
    let dir = w.dir().to_string();
    let names = Names::derive(&dir);

    w.project_descriptor("library", &request.tags, json!({}))?;
    w.json(
        "tsconfig.json",
        &json!({
            "extends": format!("{prefix}tsconfig.base.json"),
            "compilerOptions": { "module": "esnext", "strict": true },
            "files": [],
            "include": [],
            "references": [{ "path": "./tsconfig.lib.json" }],
        }),
    )?;
    w.json(
        "tsconfig.lib.json",
        &json!({
            "extends": "./tsconfig.json",
            "compilerOptions": { "outDir": format!("{prefix}dist/out-tsc"), "declaration": true },
            "include": ["src/**/*.ts"],
            "exclude": ["src/**/*.spec.ts"],
        }),
    )?;
    w.json(
        "package.json",
        &json!({
            "name": format!("@workspace/{dir}"),
            "version": "0.0.1",
            "type": "module",
            "main": "./src/index.ts",
            "types": "./src/index.ts",
        }),
    )?;
    w.text("vite.config.ts", vite_config(&prefix, &dir, request, true))?;
    w.eslint_config()?;
    w.text("README.md", format!("# {dir}\n\nThis library was generated with Nx.\n"))?;
    w.text("src/index.ts", format!("export * from './lib/{}';\n", names.file_name))?;
    w.text(
        &format!("src/lib/{}.ts", names.file_name),
        format!("export function {}(): string {{\n  return '{dir}';\n}}\n", names.property_name),
    )?;

    if request.unit_test_runner.is_some() {
        w.json(
            "tsconfig.spec.json",
            &json!({
                "extends": "./tsconfig.json",
                "compilerOptions": { "outDir": format!("{prefix}dist/out-tsc"), "types": ["vitest/globals", "node"] },
                "include": ["src/**/*.spec.ts", "src/**/*.test.ts"],
            }),
        )?;
    }
    Ok(())
}

fn e2e_companion(w: &mut Writer<'_>, request: &SkeletonRequest) -> ForgeResult<()> {
    let prefix = w.prefix();
    let runner = request.e2e_test_runner.as_deref().unwrap_or("playwright");

    let mut tags = request.tags.clone();
    tags.retain(|t| !t.starts_with("type:"));
    tags.push("type:e2e".into());

    w.project_descriptor(
        "application",
        &tags,
        json!({ "e2e": { "executor": format!("@nx/{runner}:{runner}") } }),
    )?;
    w.json(
        "tsconfig.json",
        &json!({
            "extends": format!("{prefix}tsconfig.base.json"),
            "compilerOptions": { "outDir": format!("{prefix}dist/out-tsc"), "sourceMap": false },
            "include": ["**/*.ts", "playwright.config.ts"],
        }),
    )?;
    w.text(
        "playwright.config.ts",
        "import { defineConfig, devices } from '@playwright/test';\n\nexport default defineConfig({\n  testDir: './src',\n  use: { baseURL: 'http://localhost:4300' },\n  projects: [{ name: 'chromium', use: { ...devices['Desktop Chrome'] } }],\n});\n",
    )?;
    w.text(
        "src/example.spec.ts",
        "import { test, expect } from '@playwright/test';\n\ntest('has title', async ({ page }) => {\n  await page.goto('/');\n  expect(await page.locator('h1').innerText()).toContain('Welcome');\n});\n",
    )?;
    w.eslint_config()
}

fn vite_config(prefix: &str, dir: &str, request: &SkeletonRequest, library: bool) -> String {
    let test_block = match request.unit_test_runner.as_deref() {
        Some("vitest") => format!(
            "  test: {{\n    globals: true,\n    environment: '{}',\n    include: ['src/**/*.{{test,spec}}.{{ts,tsx}}'],\n  }},\n",
            if library { "node" } else { "jsdom" }
        ),
        _ => String::new(),
    };
    let build_block = if library {
        "  build: {\n    lib: { entry: 'src/index.ts', formats: ['es'] },\n  },\n"
    } else {
        "  server: { port: 4200, host: 'localhost' },\n"
    };

    format!(
        "/// <reference types='vitest' />\nimport {{ defineConfig }} from 'vite';\n\nexport default defineConfig({{\n  root: __dirname,\n  cacheDir: '{prefix}node_modules/.vite/{dir}',\n{build_block}{test_block}}});\n"
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn request(kind: ProjectKind, unit: Option<&str>, e2e: Option<&str>) -> SkeletonRequest {
        SkeletonRequest {
            project_name: "micro-repos-libs-widget".into(),
            kind,
            bundler: "vite".into(),
            style: "css".into(),
            unit_test_runner: unit.map(str::to_string),
            e2e_test_runner: e2e.map(str::to_string),
            tags: vec!["scope:libs".into(), "type:util".into()],
        }
    }

    fn tree() -> VirtualTree {
        VirtualTree::new(Arc::new(MemoryStorage::new()))
    }

    fn read_json(tree: &VirtualTree, path: &str) -> Value {
        serde_json::from_str(&tree.read(&RelativePath::new(path)).unwrap()).unwrap()
    }

    #[test]
    fn library_points_one_level_up() {
        let mut tree = tree();
        NxSkeleton::new()
            .generate(&mut tree, &request(ProjectKind::Library, None, None))
            .unwrap();

        let project = read_json(&tree, "micro-repos-libs-widget/project.json");
        assert_eq!(project["$schema"], "../node_modules/nx/schemas/project-schema.json");
        assert_eq!(project["sourceRoot"], "micro-repos-libs-widget/src");
        assert_eq!(project["tags"], json!(["scope:libs", "type:util"]));

        let tsconfig = read_json(&tree, "micro-repos-libs-widget/tsconfig.json");
        assert_eq!(tsconfig["extends"], "../tsconfig.base.json");

        assert!(tree.is_file(&RelativePath::new("micro-repos-libs-widget/package.json")));
        assert!(!tree.exists(&RelativePath::new("micro-repos-libs-widget/tsconfig.spec.json")));
    }

    #[test]
    fn library_with_unit_tests_gets_spec_config() {
        let mut tree = tree();
        NxSkeleton::new()
            .generate(&mut tree, &request(ProjectKind::Library, Some("vitest"), None))
            .unwrap();

        assert!(tree.is_file(&RelativePath::new("micro-repos-libs-widget/tsconfig.spec.json")));
        let vite = tree.read(&RelativePath::new("micro-repos-libs-widget/vite.config.ts")).unwrap();
        assert!(vite.contains("cacheDir: '../node_modules/.vite/micro-repos-libs-widget'"));
        assert!(vite.contains("globals: true"));
    }

    #[test]
    fn application_with_e2e_writes_companion() {
        let mut tree = tree();
        NxSkeleton::new()
            .generate(&mut tree, &request(ProjectKind::Application, Some("vitest"), Some("playwright")))
            .unwrap();

        assert!(tree.is_file(&RelativePath::new("micro-repos-libs-widget/src/app/app.tsx")));
        let companion = read_json(&tree, "micro-repos-libs-widget-e2e/project.json");
        assert_eq!(companion["targets"]["e2e"]["executor"], "@nx/playwright:playwright");
        assert_eq!(companion["tags"], json!(["scope:libs", "type:e2e"]));
        let eslint = tree
            .read(&RelativePath::new("micro-repos-libs-widget-e2e/eslint.config.mjs"))
            .unwrap();
        assert!(eslint.contains("'../eslint.config.mjs'"));
    }

    #[test]
    fn unsupported_bundler_fails() {
        let mut tree = tree();
        let mut req = request(ProjectKind::Library, None, None);
        req.bundler = "webpack".into();
        assert!(NxSkeleton::new().generate(&mut tree, &req).is_err());
        assert!(tree.is_clean());
    }
}
