//! Plugin execution command.

use std::path::Path;

use anyhow::{bail, Context, Result};
use astral_common::types::Value;
use astral_engine::AstralDB;
use astral_plugins::{ParameterDef, ParameterType, Parameters};
use serde::Serialize;

use crate::output::{self, Format};
use crate::OutputFormat;

#[derive(Serialize)]
struct RunOutput {
    plugin: String,
    elements_created: usize,
    elements_modified: usize,
    duration_ms: u128,
    message: String,
}

/// Run the run command.
pub fn run(
    algorithm: &str,
    snapshot: &Path,
    raw_params: &[String],
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let db = AstralDB::open(snapshot)
        .with_context(|| format!("opening {}", snapshot.display()))?;

    let plugin = db.plugins().get(algorithm)?;
    let params = parse_params(raw_params, plugin.parameters())?;

    let outcome = db.run_plugin(algorithm, params)?;
    db.save(snapshot)
        .with_context(|| format!("saving {}", snapshot.display()))?;

    let duration_ms = db
        .report_manager()
        .latest_for(db.graph_id())
        .map_or(0, |r| r.duration().as_millis());
    let result = RunOutput {
        plugin: algorithm.to_string(),
        elements_created: outcome.elements_created,
        elements_modified: outcome.elements_modified,
        duration_ms,
        message: outcome.message,
    };

    match format.into() {
        Format::Json => output::print_json(&result, quiet)?,
        Format::Table => {
            let items = vec![
                ("Plugin", result.plugin.clone()),
                ("Elements Created", result.elements_created.to_string()),
                ("Elements Modified", result.elements_modified.to_string()),
                ("Duration", format!("{} ms", result.duration_ms)),
            ];
            output::print_key_value_table(&items, quiet);
            output::success(&result.message, quiet);
        }
    }
    Ok(())
}

/// Turns NAME=VALUE overrides into a parameter bag, parsing each value
/// according to the plugin's declared type. Names the plugin does not
/// declare pass through as strings so validation can suggest a fix.
fn parse_params(raw: &[String], defs: &[ParameterDef]) -> Result<Parameters> {
    let mut params = Parameters::new();
    for entry in raw {
        let Some((name, text)) = entry.split_once('=') else {
            bail!("expected NAME=VALUE, got '{entry}'");
        };
        let value = match defs.iter().find(|d| d.name() == name) {
            Some(def) => parse_value(name, text, def.param_type())?,
            None => Value::String(text.into()),
        };
        params.set(name, value);
    }
    Ok(params)
}

fn parse_value(name: &str, text: &str, param_type: ParameterType) -> Result<Value> {
    let value = match param_type {
        ParameterType::Boolean => text
            .parse::<bool>()
            .map(Value::Bool)
            .with_context(|| format!("parameter '{name}' expects true or false"))?,
        ParameterType::Integer => text
            .parse::<i64>()
            .map(Value::Int64)
            .with_context(|| format!("parameter '{name}' expects an integer"))?,
        ParameterType::Float => text
            .parse::<f64>()
            .map(Value::Float64)
            .with_context(|| format!("parameter '{name}' expects a number"))?,
        ParameterType::String => Value::String(text.into()),
    };
    Ok(value)
}
