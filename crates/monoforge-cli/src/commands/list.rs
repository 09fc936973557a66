//! Implementation of the `monoforge list` command.

use monoforge_adapters::{BuiltinCatalog, NxSkeleton};
use monoforge_core::application::{GeneratorInfo, GeneratorService};

use crate::{
    cli::{ListArgs, ListFormat},
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, output: OutputManager) -> CliResult<()> {
    let service = GeneratorService::new(Box::new(NxSkeleton), Box::new(BuiltinCatalog::new()));
    let generators = service.list_generators();

    match args.format {
        ListFormat::Table => {
            output.header("Available generators:")?;
            for line in table_rows(&generators) {
                output.print(&line)?;
            }
        }
        // Bypasses quiet: JSON must stay parseable in pipes.
        ListFormat::Json => output.json(&generators)?,
        ListFormat::List => {
            for g in &generators {
                println!("{}", g.id);
            }
        }
    }

    Ok(())
}

fn table_rows(generators: &[GeneratorInfo]) -> Vec<String> {
    let width = generators.iter().map(|g| g.id.len()).max().unwrap_or(0);
    generators
        .iter()
        .flat_map(|g| {
            let mut rows = vec![format!(
                "  {:<width$}  {} ({}, default category: {})",
                g.id, g.summary, g.kind, g.default_category
            )];
            if !g.flags.is_empty() {
                rows.push(format!("  {:<width$}  flags: {}", "", g.flags.join(", ")));
            }
            rows
        })
        .collect()
}
