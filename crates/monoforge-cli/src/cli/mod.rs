//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name     = "monoforge",
    bin_name = "monoforge",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Workspace generators for Nx-style monorepos",
    long_about = "Monoforge creates applications and libraries inside a monorepo, \
                  places them under <projects-dir>/<category>/<name> and repairs \
                  every configuration path that the move breaks.",
    after_help = "EXAMPLES:\n\
        \x20 monoforge generate counter-app clicks\n\
        \x20 monoforge generate utils-lib widget --category shared --enable includeStorybook\n\
        \x20 monoforge generate todo-app tasks --dry-run\n\
        \x20 monoforge list",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a generator against the workspace.
    #[command(
        visible_alias = "g",
        about = "Generate a project",
        after_help = "EXAMPLES:\n\
            \x20 monoforge generate counter-app clicks --title \"Click me\"\n\
            \x20 monoforge g utils-lib strings --category tools --disable includeTests\n\
            \x20 monoforge g todo-app tasks --enable enablePriority --skip-install"
    )]
    Generate(GenerateArgs),

    /// List available generators.
    #[command(visible_alias = "ls", about = "List generators")]
    List(ListArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 monoforge init          # user config directory\n\
            \x20 monoforge init --local  # .monoforge.toml in the current directory"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 monoforge completions bash > ~/.local/share/bash-completion/completions/monoforge\n\
            \x20 monoforge completions zsh  > ~/.zfunc/_monoforge"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 monoforge config get workspace.projects_dir\n\
            \x20 monoforge config list\n\
            \x20 monoforge config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Generator id, e.g. `counter-app`. See `monoforge list`.
    #[arg(value_name = "GENERATOR")]
    pub generator: String,

    /// Project name; becomes the directory name under its category.
    #[arg(value_name = "NAME")]
    pub name: String,

    #[arg(
        short = 'k',
        long = "category",
        value_name = "CATEGORY",
        help = "Category directory (apps, libs, tools, experiments, shared)"
    )]
    pub category: Option<String>,

    #[arg(short = 't', long = "title", value_name = "TITLE", help = "Display title")]
    pub title: Option<String>,

    #[arg(
        short = 'd',
        long = "description",
        value_name = "TEXT",
        help = "Project description"
    )]
    pub description: Option<String>,

    /// Repeatable.
    #[arg(long = "enable", value_name = "FLAG", help = "Turn a generator flag on")]
    pub enable: Vec<String>,

    /// Repeatable.
    #[arg(long = "disable", value_name = "FLAG", help = "Turn a generator flag off")]
    pub disable: Vec<String>,

    #[arg(long = "dry-run", help = "Show the staged operations without writing")]
    pub dry_run: bool,

    #[arg(long = "skip-install", help = "Do not run the package manager afterwards")]
    pub skip_install: bool,

    #[arg(long = "skip-format", help = "Do not normalise generated files")]
    pub skip_format: bool,

    #[arg(
        short = 'w',
        long = "workspace",
        value_name = "DIR",
        help = "Workspace root (default: current directory)"
    )]
    pub workspace: Option<PathBuf>,

    #[arg(
        long = "templates",
        value_name = "DIR",
        help = "Directory of template sets overriding the built-in ones"
    )]
    pub templates: Option<PathBuf>,

    #[arg(short = 'y', long = "yes", help = "Skip the confirmation prompt")]
    pub yes: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "table",
        help = "Listing style"
    )]
    pub format: ListFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    /// Ids only, one per line.
    List,
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(long = "force", help = "Overwrite an existing config file")]
    pub force: bool,

    #[arg(long = "local", help = "Write .monoforge.toml in the current directory")]
    pub local: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, value_name = "SHELL")]
    pub shell: clap_complete::Shell,
}

// ── config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value, e.g. `workspace.projects_dir`.
    Get { key: String },
    /// Print the effective configuration as TOML.
    List,
    /// Print the default config file location.
    Path,
}
