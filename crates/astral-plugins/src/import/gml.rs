//! GML import.
//!
//! GML is a nested `key value` format: a top-level `graph [ ... ]` block
//! holding `node [ id ... ]` and `edge [ source ... target ... ]` blocks.
//! Scalar entries inside nodes and edges become attributes. A graph-level
//! `directed 1` marks every edge directed; the default is undirected.

use astral_common::{Error, Result};

use super::record_store::{keys, RecordStore};
use super::ImportProcessor;

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Word(String),
}

#[derive(Debug)]
enum GmlValue {
    Scalar(String),
    List(Vec<(String, GmlValue)>),
}

/// The GML processor.
pub struct GmlImportProcessor;

impl ImportProcessor for GmlImportProcessor {
    fn name(&self) -> &str {
        "gml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gml"]
    }

    fn parse(&self, text: &str, records: &mut RecordStore) -> Result<usize> {
        let tokens = tokenize(text)?;
        let mut pos = 0;
        let entries = parse_entries(&tokens, &mut pos)?;
        if pos != tokens.len() {
            return Err(Error::Import("malformed GML: unbalanced brackets".to_string()));
        }

        let graph = entries
            .iter()
            .find_map(|(key, value)| match (key.as_str(), value) {
                ("graph", GmlValue::List(list)) => Some(list),
                _ => None,
            })
            .ok_or_else(|| Error::Import("malformed GML: no graph block".to_string()))?;

        let directed = graph
            .iter()
            .any(|(key, value)| matches!((key.as_str(), value), ("directed", GmlValue::Scalar(s)) if s == "1"));

        let mut errors = 0usize;
        for (key, value) in graph {
            match (key.as_str(), value) {
                ("node", GmlValue::List(fields)) => {
                    errors += commit_node(records, fields)?;
                }
                ("edge", GmlValue::List(fields)) => {
                    errors += commit_edge(records, fields, directed)?;
                }
                _ => {}
            }
        }
        Ok(errors)
    }
}

fn commit_node(records: &mut RecordStore, fields: &[(String, GmlValue)]) -> Result<usize> {
    let Some(id) = scalar(fields, "id") else {
        return Ok(1);
    };
    records.add();
    records.set(keys::SOURCE_IDENTIFIER, id)?;
    for (key, value) in fields {
        if key != "id" {
            if let GmlValue::Scalar(s) = value {
                records.set(&format!("{}{key}", keys::SOURCE), s.clone())?;
            }
        }
    }
    Ok(0)
}

fn commit_edge(
    records: &mut RecordStore,
    fields: &[(String, GmlValue)],
    directed: bool,
) -> Result<usize> {
    let (Some(source), Some(target)) = (scalar(fields, "source"), scalar(fields, "target"))
    else {
        return Ok(1);
    };
    records.add();
    records.set(keys::SOURCE_IDENTIFIER, source)?;
    records.set(keys::DESTINATION_IDENTIFIER, target)?;
    records.set(keys::TRANSACTION_DIRECTED, directed.to_string())?;
    for (key, value) in fields {
        if key != "source" && key != "target" {
            if let GmlValue::Scalar(s) = value {
                records.set(&format!("{}{key}", keys::TRANSACTION), s.clone())?;
            }
        }
    }
    Ok(0)
}

fn scalar<'a>(fields: &'a [(String, GmlValue)], name: &str) -> Option<&'a str> {
    fields.iter().find_map(|(key, value)| match value {
        GmlValue::Scalar(s) if key == name => Some(s.as_str()),
        _ => None,
    })
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '#' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '[' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ']' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                s.push(escaped);
                            }
                        }
                        _ => s.push(c),
                    }
                }
                if !closed {
                    return Err(Error::Import("malformed GML: unterminated string".to_string()));
                }
                tokens.push(Token::Word(s));
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '[' || c == ']' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }
    Ok(tokens)
}

fn parse_entries(tokens: &[Token], pos: &mut usize) -> Result<Vec<(String, GmlValue)>> {
    let mut entries = Vec::new();
    while *pos < tokens.len() {
        match &tokens[*pos] {
            Token::Close => break,
            Token::Word(key) => {
                let key = key.clone();
                *pos += 1;
                match tokens.get(*pos) {
                    Some(Token::Open) => {
                        *pos += 1;
                        let nested = parse_entries(tokens, pos)?;
                        match tokens.get(*pos) {
                            Some(Token::Close) => *pos += 1,
                            _ => {
                                return Err(Error::Import(
                                    "malformed GML: missing closing bracket".to_string(),
                                ))
                            }
                        }
                        entries.push((key, GmlValue::List(nested)));
                    }
                    Some(Token::Word(value)) => {
                        entries.push((key, GmlValue::Scalar(value.clone())));
                        *pos += 1;
                    }
                    _ => {
                        return Err(Error::Import(format!(
                            "malformed GML: key '{key}' has no value"
                        )))
                    }
                }
            }
            Token::Open => {
                return Err(Error::Import("malformed GML: unexpected bracket".to_string()))
            }
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::analytic_store;
    use super::super::import_str;
    use super::*;

    const SAMPLE: &str = r#"
# A small friendship graph
graph [
  directed 1
  node [
    id 1
    label "Alice"
  ]
  node [
    id 2
    label "Bob \"the builder\""
  ]
  edge [
    source 1
    target 2
    weight 2.5
  ]
]
"#;

    #[test]
    fn test_parse_fills_records() {
        let mut records = RecordStore::new();
        let errors = GmlImportProcessor.parse(SAMPLE, &mut records).unwrap();
        assert_eq!(errors, 0);
        assert_eq!(records.len(), 3);

        assert_eq!(records.get(0, keys::SOURCE_IDENTIFIER), Some("1"));
        assert_eq!(records.get(0, "source.label"), Some("Alice"));
        // Escaped quotes are unescaped.
        assert_eq!(records.get(1, "source.label"), Some("Bob \"the builder\""));

        assert_eq!(records.get(2, keys::SOURCE_IDENTIFIER), Some("1"));
        assert_eq!(records.get(2, keys::DESTINATION_IDENTIFIER), Some("2"));
        assert_eq!(records.get(2, keys::TRANSACTION_DIRECTED), Some("true"));
        assert_eq!(records.get(2, "transaction.weight"), Some("2.5"));
    }

    #[test]
    fn test_undirected_by_default() {
        let gml = "graph [ node [ id 1 ] node [ id 2 ] edge [ source 1 target 2 ] ]";
        let mut records = RecordStore::new();
        GmlImportProcessor.parse(gml, &mut records).unwrap();
        assert_eq!(records.get(2, keys::TRANSACTION_DIRECTED), Some("false"));
    }

    #[test]
    fn test_broken_blocks_are_counted() {
        let gml = "graph [ node [ label \"no id\" ] edge [ source 1 ] ]";
        let mut records = RecordStore::new();
        let errors = GmlImportProcessor.parse(gml, &mut records).unwrap();
        assert_eq!(errors, 2);
        assert!(records.is_empty());
    }

    #[test]
    fn test_structural_errors_are_fatal() {
        let mut records = RecordStore::new();
        assert!(GmlImportProcessor
            .parse("graph [ node [ id 1 ]", &mut records)
            .is_err());
        assert!(GmlImportProcessor.parse("directed 1", &mut records).is_err());
    }

    #[test]
    fn test_end_to_end_import() {
        let (store, schema) = analytic_store();
        let summary = import_str(&GmlImportProcessor, SAMPLE, &store, &schema).unwrap();
        assert_eq!(summary.vertices_created, 2);
        assert_eq!(summary.transactions_created, 1);

        let t = store.transaction_ids()[0];
        assert!(store.transaction(t).unwrap().is_directed());
    }
}
