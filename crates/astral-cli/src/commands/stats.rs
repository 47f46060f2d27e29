//! Snapshot statistics command.

use std::path::Path;

use anyhow::{Context, Result};
use astral_common::types::ElementType;
use astral_engine::AstralDB;
use serde::Serialize;

use crate::output::{self, Format};
use crate::OutputFormat;

#[derive(Serialize)]
struct StatsOutput {
    schema: String,
    schema_version: u32,
    vertices: usize,
    transactions: usize,
    graph_attributes: usize,
    vertex_attributes: usize,
    transaction_attributes: usize,
    plugins: usize,
}

/// Run the stats command.
pub fn run(snapshot: &Path, format: OutputFormat, quiet: bool) -> Result<()> {
    let db = AstralDB::open(snapshot)
        .with_context(|| format!("opening {}", snapshot.display()))?;
    let store = db.store();

    let result = StatsOutput {
        schema: db.schema().factory_name().to_string(),
        schema_version: db.schema().version(),
        vertices: store.vertex_count(),
        transactions: store.transaction_count(),
        graph_attributes: store.attributes(ElementType::Graph).len(),
        vertex_attributes: store.attributes(ElementType::Vertex).len(),
        transaction_attributes: store.attributes(ElementType::Transaction).len(),
        plugins: db.plugins().len(),
    };

    match format.into() {
        Format::Json => output::print_json(&result, quiet)?,
        Format::Table => {
            let items = vec![
                ("Schema", result.schema.clone()),
                ("Schema Version", result.schema_version.to_string()),
                ("Vertices", result.vertices.to_string()),
                ("Transactions", result.transactions.to_string()),
                ("Graph Attributes", result.graph_attributes.to_string()),
                ("Vertex Attributes", result.vertex_attributes.to_string()),
                (
                    "Transaction Attributes",
                    result.transaction_attributes.to_string(),
                ),
                ("Plugins", result.plugins.to_string()),
            ];
            output::print_key_value_table(&items, quiet);
        }
    }
    Ok(())
}
