//! Pajek (.net) import.
//!
//! Line-oriented: a `*Vertices N` section of `id "label" [x y]` lines,
//! then `*Edges` (undirected) and/or `*Arcs` (directed) sections of
//! `source destination [weight]` lines. Section markers are
//! case-insensitive; `%` starts a comment. Malformed lines are skipped
//! and counted.

use astral_common::types::AttrType;
use astral_common::Result;

use super::record_store::{keys, RecordStore};
use super::ImportProcessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Vertices,
    Edges { directed: bool },
    Unknown,
}

/// The Pajek processor.
pub struct PajekImportProcessor;

impl ImportProcessor for PajekImportProcessor {
    fn name(&self) -> &str {
        "pajek"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["net", "paj", "pajek"]
    }

    fn parse(&self, text: &str, records: &mut RecordStore) -> Result<usize> {
        records.declare_type(&format!("{}x", keys::SOURCE), AttrType::Float);
        records.declare_type(&format!("{}y", keys::SOURCE), AttrType::Float);
        records.declare_type(
            &format!("{}weight", keys::TRANSACTION),
            AttrType::Float,
        );

        let mut section = Section::None;
        let mut errors = 0usize;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            if let Some(marker) = line.strip_prefix('*') {
                let marker = marker
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_lowercase();
                section = match marker.as_str() {
                    "vertices" => Section::Vertices,
                    "edges" => Section::Edges { directed: false },
                    "arcs" => Section::Edges { directed: true },
                    _ => Section::Unknown,
                };
                continue;
            }
            match section {
                Section::Vertices => {
                    if commit_vertex(records, line)?.is_none() {
                        errors += 1;
                    }
                }
                Section::Edges { directed } => {
                    if commit_edge(records, line, directed)?.is_none() {
                        errors += 1;
                    }
                }
                Section::None | Section::Unknown => {}
            }
        }
        Ok(errors)
    }
}

fn commit_vertex(records: &mut RecordStore, line: &str) -> Result<Option<()>> {
    let (id, rest) = match line.split_once(char::is_whitespace) {
        Some((id, rest)) => (id, rest.trim()),
        None => (line, ""),
    };
    if id.parse::<u64>().is_err() {
        return Ok(None);
    }

    let (label, rest) = take_label(rest);
    records.add();
    records.set(keys::SOURCE_IDENTIFIER, id)?;
    if let Some(label) = label {
        records.set(&format!("{}label", keys::SOURCE), label)?;
    }
    let coords: Vec<&str> = rest.split_whitespace().collect();
    if coords.len() >= 2 {
        records.set(&format!("{}x", keys::SOURCE), coords[0])?;
        records.set(&format!("{}y", keys::SOURCE), coords[1])?;
    }
    Ok(Some(()))
}

fn commit_edge(records: &mut RecordStore, line: &str, directed: bool) -> Result<Option<()>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2
        || fields[0].parse::<u64>().is_err()
        || fields[1].parse::<u64>().is_err()
    {
        return Ok(None);
    }
    records.add();
    records.set(keys::SOURCE_IDENTIFIER, fields[0])?;
    records.set(keys::DESTINATION_IDENTIFIER, fields[1])?;
    records.set(keys::TRANSACTION_DIRECTED, directed.to_string())?;
    if let Some(weight) = fields.get(2) {
        records.set(&format!("{}weight", keys::TRANSACTION), *weight)?;
    }
    Ok(Some(()))
}

/// Splits a quoted label off the front of a vertex line remainder.
fn take_label(rest: &str) -> (Option<String>, &str) {
    if let Some(after) = rest.strip_prefix('"') {
        if let Some(end) = after.find('"') {
            return (Some(after[..end].to_string()), after[end + 1..].trim_start());
        }
    }
    if rest.is_empty() {
        (None, rest)
    } else {
        match rest.split_once(char::is_whitespace) {
            Some((label, tail)) => (Some(label.to_string()), tail.trim_start()),
            None => (Some(rest.to_string()), ""),
        }
    }
}
