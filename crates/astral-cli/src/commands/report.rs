//! Plugin run history command.

use std::path::Path;

use anyhow::{Context, Result};
use astral_engine::AstralDB;
use astral_plugins::report::ReportOutcome;
use serde::Serialize;

use crate::output::{self, Format};
use crate::OutputFormat;

#[derive(Serialize)]
struct ReportRow {
    plugin: String,
    duration_ms: u128,
    outcome: String,
    detail: String,
}

fn describe(outcome: &ReportOutcome) -> (String, String) {
    match outcome {
        ReportOutcome::Success {
            message,
            elements_created,
            elements_modified,
        } => (
            "success".to_string(),
            format!("{message} ({elements_created} created, {elements_modified} modified)"),
        ),
        ReportOutcome::Failed(reason) => ("failed".to_string(), reason.clone()),
        ReportOutcome::Cancelled => ("cancelled".to_string(), String::new()),
    }
}

/// Run the report command. History is kept per open graph, so this shows
/// runs recorded against the snapshot in the current session.
pub fn run(snapshot: &Path, format: OutputFormat, quiet: bool) -> Result<()> {
    let db = AstralDB::open(snapshot)
        .with_context(|| format!("opening {}", snapshot.display()))?;

    let rows: Vec<ReportRow> = db
        .graph_report()
        .iter()
        .map(|report| {
            let (outcome, detail) = describe(report.outcome());
            ReportRow {
                plugin: report.plugin_name().to_string(),
                duration_ms: report.duration().as_millis(),
                outcome,
                detail,
            }
        })
        .collect();

    match format.into() {
        Format::Json => output::print_json(&rows, quiet)?,
        Format::Table => {
            if rows.is_empty() {
                output::status("no plugin runs recorded", quiet);
                return Ok(());
            }
            if !quiet {
                let mut table = output::create_table();
                output::add_header(&mut table, &["Plugin", "Duration", "Outcome", "Detail"]);
                for row in &rows {
                    table.add_row(vec![
                        row.plugin.clone(),
                        format!("{} ms", row.duration_ms),
                        row.outcome.clone(),
                        row.detail.clone(),
                    ]);
                }
                println!("{table}");
            }
        }
    }
    Ok(())
}
