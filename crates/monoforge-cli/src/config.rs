//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `MONOFORGE_*` environment variables, `__` between section and key
//!    (`MONOFORGE_WORKSPACE__PROJECTS_DIR=packages`)
//! 3. `--config FILE`, else `.monoforge.toml` in the current directory,
//!    else the user config file
//! 4. Built-in defaults

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use monoforge_core::{application::WorkspaceLayout, domain::RelativePath};

use crate::error::{CliError, CliResult};

/// Name of the per-workspace config file.
pub const LOCAL_CONFIG_FILE: &str = ".monoforge.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub workspace: WorkspaceConfig,
    pub generate: GenerateConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Parent directory of every category.
    pub projects_dir: String,
    /// Category that e2e companions move into.
    pub e2e_category: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        let layout = WorkspaceLayout::default();
        Self {
            projects_dir: layout.projects_dir.to_string(),
            e2e_category: layout.e2e_category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub skip_install: bool,
    pub skip_format: bool,
    pub templates_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append logs to this file in addition to stderr.
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Layer defaults, the config file and the environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let defaults = Config::try_from(&Self::default()).map_err(config_error("defaults"))?;
        let mut builder = Config::builder().add_source(defaults);

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::ConfigError {
                        message: format!("config file not found: {}", path.display()),
                        source: None,
                    });
                }
                builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
            }
            None => {
                let local = PathBuf::from(LOCAL_CONFIG_FILE);
                let path = if local.is_file() { local } else { Self::config_path() };
                debug!(path = %path.display(), "config file candidate");
                builder = builder.add_source(
                    File::from(path.as_path()).format(FileFormat::Toml).required(false),
                );
            }
        }

        builder
            .add_source(
                Environment::with_prefix("MONOFORGE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error("load"))?
            .try_deserialize()
            .map_err(config_error("parse"))
    }

    /// Path to the user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.monoforge.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "monoforge", "monoforge")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Layout for the generator service.
    pub fn layout(&self) -> CliResult<WorkspaceLayout> {
        let projects_dir = RelativePath::try_new(&self.workspace.projects_dir).map_err(|e| {
            CliError::ConfigError {
                message: format!("workspace.projects_dir: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        if projects_dir.is_root() || self.workspace.e2e_category.trim().is_empty() {
            return Err(CliError::ConfigError {
                message: "workspace.projects_dir and workspace.e2e_category must not be empty".into(),
                source: None,
            });
        }
        Ok(WorkspaceLayout {
            projects_dir,
            e2e_category: self.workspace.e2e_category.clone(),
        })
    }

    /// Look up a dotted key, e.g. `generate.skip_install`.
    pub fn get(&self, key: &str) -> CliResult<String> {
        let value = toml::Value::try_from(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })?;

        let found = key
            .split('.')
            .try_fold(&value, |node, part| node.get(part))
            .ok_or_else(|| CliError::ConfigError {
                message: format!("Unknown config key: '{key}'"),
                source: None,
            })?;

        Ok(match found {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

fn config_error(stage: &'static str) -> impl Fn(config::ConfigError) -> CliError {
    move |e| CliError::ConfigError {
        message: format!("Failed to {stage} configuration: {e}"),
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_standard_layout() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.workspace.projects_dir, "micro-repos");
        assert_eq!(cfg.workspace.e2e_category, "e2e");
        assert_eq!(cfg.layout().unwrap(), WorkspaceLayout::default());
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("monoforge.toml");
        fs::write(
            &path,
            "[workspace]\nprojects_dir = \"packages\"\n\n[generate]\nskip_install = true\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.workspace.projects_dir, "packages");
        assert_eq!(cfg.workspace.e2e_category, "e2e");
        assert!(cfg.generate.skip_install);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load(Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CliError::ConfigError { .. }));
    }

    #[test]
    fn get_walks_dotted_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("workspace.projects_dir").unwrap(), "micro-repos");
        assert_eq!(cfg.get("generate.skip_format").unwrap(), "false");
        assert!(matches!(cfg.get("does.not.exist"), Err(CliError::ConfigError { .. })));
    }

    #[test]
    fn escaping_projects_dir_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.workspace.projects_dir = "../outside".into();
        assert!(cfg.layout().is_err());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
