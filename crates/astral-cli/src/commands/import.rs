//! Graph file import command.

use std::path::Path;

use anyhow::{Context, Result};
use astral_engine::AstralDB;
use serde::Serialize;

use crate::output::{self, Format};
use crate::OutputFormat;

#[derive(Serialize)]
struct ImportOutput {
    vertices_created: usize,
    transactions_created: usize,
    processing_errors: usize,
    values_skipped: usize,
}

/// Run the import command.
pub fn run(file: &Path, into: Option<&Path>, format: OutputFormat, quiet: bool) -> Result<()> {
    let db = match into {
        Some(snapshot) if snapshot.exists() => AstralDB::open(snapshot)
            .with_context(|| format!("opening {}", snapshot.display()))?,
        _ => AstralDB::new_in_memory()?,
    };

    let summary = db
        .import_file(file)
        .with_context(|| format!("importing {}", file.display()))?;

    if let Some(snapshot) = into {
        db.save(snapshot)
            .with_context(|| format!("saving {}", snapshot.display()))?;
    }

    let result = ImportOutput {
        vertices_created: summary.vertices_created,
        transactions_created: summary.transactions_created,
        processing_errors: summary.processing_errors,
        values_skipped: summary.values_skipped,
    };

    match format.into() {
        Format::Json => output::print_json(&result, quiet)?,
        Format::Table => {
            let items = vec![
                ("Vertices created", result.vertices_created.to_string()),
                (
                    "Transactions created",
                    result.transactions_created.to_string(),
                ),
                ("Processing errors", result.processing_errors.to_string()),
                ("Values skipped", result.values_skipped.to_string()),
            ];
            output::print_key_value_table(&items, quiet);
            match into {
                Some(snapshot) => output::success(
                    &format!("imported {} into {}", file.display(), snapshot.display()),
                    quiet,
                ),
                None => output::success(
                    &format!("parsed {} (pass --into to keep the result)", file.display()),
                    quiet,
                ),
            }
        }
    }
    Ok(())
}
