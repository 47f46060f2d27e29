//! Output formatting for CLI commands.

use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;

/// Output format selection.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
}

impl From<crate::OutputFormat> for Format {
    fn from(f: crate::OutputFormat) -> Self {
        match f {
            crate::OutputFormat::Table => Format::Table,
            crate::OutputFormat::Json => Format::Json,
        }
    }
}

/// Create a styled table with consistent formatting.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    table
}

/// Add a header row to a table.
pub fn add_header(table: &mut Table, headers: &[&str]) {
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(data: &T, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("{}", serde_json::to_string_pretty(data)?);
    }
    Ok(())
}

/// Print a key-value table (for info displays).
pub fn print_key_value_table(items: &[(&str, String)], quiet: bool) {
    if quiet {
        return;
    }
    let mut table = create_table();
    add_header(&mut table, &["Property", "Value"]);
    for (key, value) in items {
        table.add_row(vec![Cell::new(key).fg(Color::Green), Cell::new(value)]);
    }
    println!("{table}");
}

/// Print a status message (respects quiet mode).
pub fn status(msg: &str, quiet: bool) {
    if !quiet {
        println!("{msg}");
    }
}

/// Print a success message.
pub fn success(msg: &str, quiet: bool) {
    if !quiet {
        println!("✓ {msg}");
    }
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("✗ {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_header() {
        let mut table = create_table();
        add_header(&mut table, &["Plugin", "Outcome"]);
        let rendered = table.to_string();
        assert!(rendered.contains("Plugin"));
        assert!(rendered.contains("Outcome"));
    }

    #[test]
    fn test_table_with_rows() {
        let mut table = create_table();
        add_header(&mut table, &["Key", "Value"]);
        table.add_row(vec!["vertices", "12"]);
        let rendered = table.to_string();
        assert!(rendered.contains("vertices"));
        assert!(rendered.contains("12"));
    }
}
