//! Attribute search command.

use std::path::Path;

use anyhow::{Context, Result};
use astral_common::types::ElementType;
use astral_engine::AstralDB;
use astral_plugins::find::FindCriteria;
use serde::Serialize;

use crate::output::{self, Format};
use crate::OutputFormat;

#[derive(Serialize)]
struct FindRow {
    element: &'static str,
    id: u64,
    attribute: String,
    value: String,
}

/// Run the find command.
#[allow(clippy::too_many_arguments)]
pub fn run(
    snapshot: &Path,
    text: &str,
    attribute: Option<&str>,
    regex: bool,
    ignore_case: bool,
    transactions: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let db = AstralDB::open(snapshot)
        .with_context(|| format!("opening {}", snapshot.display()))?;

    let element_type = if transactions {
        ElementType::Transaction
    } else {
        ElementType::Vertex
    };
    let criteria = FindCriteria {
        element_type,
        attribute: attribute.map(str::to_string),
        pattern: text.to_string(),
        regex,
        ignore_case,
        exact: false,
    };

    let results = db.find(&criteria)?;
    let rows: Vec<FindRow> = results
        .results()
        .iter()
        .map(|r| FindRow {
            element: if transactions { "transaction" } else { "vertex" },
            id: r.element.raw_id(),
            attribute: r.attribute.to_string(),
            value: r.value.clone(),
        })
        .collect();

    match format.into() {
        Format::Json => output::print_json(&rows, quiet)?,
        Format::Table => {
            if rows.is_empty() {
                output::status("no matches", quiet);
                return Ok(());
            }
            if !quiet {
                let mut table = output::create_table();
                output::add_header(&mut table, &["Element", "Id", "Attribute", "Value"]);
                for row in &rows {
                    table.add_row(vec![
                        row.element.to_string(),
                        row.id.to_string(),
                        row.attribute.clone(),
                        row.value.clone(),
                    ]);
                }
                println!("{table}");
            }
            output::status(&format!("{} match(es)", rows.len()), quiet);
        }
    }
    Ok(())
}
