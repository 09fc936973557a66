//! The generator catalogue.
//!
//! Each generator is a static, declarative description: which kind of
//! project the skeleton collaborator should emit, which categories it may be
//! placed in, which feature flags it understands, and which template set is
//! layered on top. The orchestrator interprets these descriptions; adding a
//! generator never requires touching pipeline code.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::options::{Category, GeneratorOptions, ProjectName, ResolvedOptions};

/// What the base skeleton collaborator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Application,
    Library,
}

impl ProjectKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Library => "library",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named boolean a generator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagSpec {
    pub name: &'static str,
    pub default: bool,
    pub description: &'static str,
}

/// devDependencies merged into `package.json` when a flag is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagDependencies {
    pub flag: &'static str,
    pub dev_dependencies: &'static [(&'static str, &'static str)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeneratorSpec {
    pub id: &'static str,
    pub summary: &'static str,
    pub kind: ProjectKind,
    pub default_category: Category,
    pub categories: &'static [Category],
    pub flags: &'static [FlagSpec],
    /// Key into the template catalogue.
    pub template_set: &'static str,
    /// Where templates land, relative to the project root.
    pub template_target: &'static str,
    pub default_title: Option<&'static str>,
    pub default_description: Option<&'static str>,
    /// Keywords written to `package.json`. Empty means the manifest is left alone.
    pub manifest_keywords: &'static [&'static str],
    pub flag_dependencies: &'static [FlagDependencies],
}

const APP_CATEGORIES: &[Category] = &[
    Category::Apps,
    Category::Libs,
    Category::Tools,
    Category::Experiments,
];

const LIB_CATEGORIES: &[Category] = &[Category::Libs, Category::Tools, Category::Shared];

const STORYBOOK_VERSION: &str = "^7.0.0";

pub const BUILTIN_GENERATORS: &[GeneratorSpec] = &[
    GeneratorSpec {
        id: "counter-app",
        summary: "React application with a counter demo component",
        kind: ProjectKind::Application,
        default_category: Category::Apps,
        categories: APP_CATEGORIES,
        flags: &[],
        template_set: "counter-app",
        template_target: "src/app",
        default_title: Some("Counter"),
        default_description: None,
        manifest_keywords: &[],
        flag_dependencies: &[],
    },
    GeneratorSpec {
        id: "todo-app",
        summary: "React application with a todo list demo component",
        kind: ProjectKind::Application,
        default_category: Category::Apps,
        categories: APP_CATEGORIES,
        flags: &[
            FlagSpec {
                name: "enableFilters",
                default: true,
                description: "Show all/active/completed filters",
            },
            FlagSpec {
                name: "enablePriority",
                default: false,
                description: "Track a priority per todo item",
            },
        ],
        template_set: "todo-app",
        template_target: "src/app",
        default_title: Some("Todo list"),
        default_description: None,
        manifest_keywords: &[],
        flag_dependencies: &[],
    },
    GeneratorSpec {
        id: "utils-lib",
        summary: "TypeScript utility library",
        kind: ProjectKind::Library,
        default_category: Category::Libs,
        categories: LIB_CATEGORIES,
        flags: &[
            FlagSpec {
                name: "includeTests",
                default: true,
                description: "Generate unit test files",
            },
            FlagSpec {
                name: "includeStorybook",
                default: false,
                description: "Add Storybook devDependencies",
            },
        ],
        template_set: "utils-lib",
        template_target: "",
        default_title: None,
        default_description: Some("Utility library"),
        manifest_keywords: &["utils", "typescript", "nx"],
        flag_dependencies: &[FlagDependencies {
            flag: "includeStorybook",
            dev_dependencies: &[
                ("@storybook/react", STORYBOOK_VERSION),
                ("@storybook/react-vite", STORYBOOK_VERSION),
            ],
        }],
    },
];

impl GeneratorSpec {
    /// Look up a built-in generator by id.
    pub fn find(id: &str) -> Result<&'static GeneratorSpec, DomainError> {
        BUILTIN_GENERATORS
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| DomainError::UnknownGenerator(id.to_string()))
    }

    /// Applications get an e2e companion from the skeleton collaborator.
    pub fn has_companion(&self) -> bool {
        self.kind == ProjectKind::Application
    }

    pub fn flag_spec(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Validate caller options against this generator and fill in defaults.
    pub fn resolve(&self, options: &GeneratorOptions) -> Result<ResolvedOptions, DomainError> {
        let name = ProjectName::parse(options.name.trim())?;

        let category = options.category.unwrap_or(self.default_category);
        if !self.categories.contains(&category) {
            let allowed: Vec<&str> = self.categories.iter().map(Category::as_str).collect();
            return Err(DomainError::invalid_options(
                "category",
                format!(
                    "'{}' is not accepted by {} (expected one of: {})",
                    category,
                    self.id,
                    allowed.join(", ")
                ),
            ));
        }

        if let Some(unknown) = options.flags.keys().find(|k| self.flag_spec(k).is_none()) {
            let declared: Vec<&str> = self.flags.iter().map(|f| f.name).collect();
            let reason = if declared.is_empty() {
                format!("{} does not accept any flags, got '{unknown}'", self.id)
            } else {
                format!(
                    "unknown flag '{unknown}' (expected one of: {})",
                    declared.join(", ")
                )
            };
            return Err(DomainError::invalid_options("flags", reason));
        }

        let flags: BTreeMap<String, bool> = self
            .flags
            .iter()
            .map(|f| {
                let value = options.flags.get(f.name).copied().unwrap_or(f.default);
                (f.name.to_string(), value)
            })
            .collect();

        let title = options
            .title
            .clone()
            .or_else(|| self.default_title.map(str::to_string))
            .unwrap_or_else(|| name.as_str().to_string());

        let description = options
            .description
            .clone()
            .or_else(|| self.default_description.map(str::to_string))
            .unwrap_or_default();

        Ok(ResolvedOptions {
            name,
            category,
            title,
            description,
            flags,
        })
    }

    /// devDependencies switched on by the resolved flags, in declaration order.
    pub fn dev_dependencies_for(&self, options: &ResolvedOptions) -> Vec<(String, String)> {
        self.flag_dependencies
            .iter()
            .filter(|fd| options.flag(fd.flag))
            .flat_map(|fd| fd.dev_dependencies.iter())
            .map(|(pkg, version)| (pkg.to_string(), version.to_string()))
            .collect()
    }
}
