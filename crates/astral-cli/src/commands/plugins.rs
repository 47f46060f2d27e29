//! Plugin listing command.

use anyhow::Result;
use astral_plugins::PluginRegistry;
use serde::Serialize;

use crate::output::{self, Format};
use crate::OutputFormat;

#[derive(Serialize)]
struct PluginListEntry {
    name: String,
    label: String,
    description: String,
    parameters: Vec<String>,
}

/// Run the plugins command: list the built-in plugins and their
/// parameters. No snapshot is needed, the registry is fixed.
pub fn run(format: OutputFormat, quiet: bool) -> Result<()> {
    let registry = PluginRegistry::with_builtins();
    let entries: Vec<PluginListEntry> = registry
        .names()
        .iter()
        .filter_map(|name| registry.get(name).ok())
        .map(|plugin| PluginListEntry {
            name: plugin.name().to_string(),
            label: plugin.label().to_string(),
            description: plugin.description().to_string(),
            parameters: plugin
                .parameters()
                .iter()
                .map(|d| format!("{} ({})", d.name(), d.param_type().name()))
                .collect(),
        })
        .collect();

    match format.into() {
        Format::Json => output::print_json(&entries, quiet)?,
        Format::Table => {
            if quiet {
                return Ok(());
            }
            let mut table = output::create_table();
            output::add_header(&mut table, &["Plugin", "Label", "Parameters"]);
            for entry in &entries {
                table.add_row(vec![
                    entry.name.clone(),
                    entry.label.clone(),
                    entry.parameters.join("\n"),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
