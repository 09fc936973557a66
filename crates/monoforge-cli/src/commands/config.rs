//! `monoforge config` - inspect the effective configuration.

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            // Printed even in quiet mode so scripts can capture it.
            println!("{}", config.get(&key)?);
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
            } else {
                output.header("Current configuration:")?;
                output.print(&render_toml(&config)?)?;
            }
        }

        ConfigCommands::Path => {
            println!("{}", AppConfig::config_path().display());
        }
    }

    Ok(())
}

pub(crate) fn render_toml(config: &AppConfig) -> CliResult<String> {
    toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })
}
