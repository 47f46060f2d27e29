//! GraphML import.
//!
//! Pull-parses GraphML with quick-xml: `<key>` declarations carry the
//! attribute name, type, target (node or edge), and an optional
//! `<default>`; `<graph edgedefault>` decides whether edges without their
//! own `directed` attribute are directed. Nodes without an id and edges
//! without both endpoints are skipped and counted; an edge without an id
//! gets a generated one.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use astral_common::types::AttrType;
use astral_common::utils::hash::FxHashMap;
use astral_common::{Error, Result};

use super::record_store::{keys, RecordStore};
use super::ImportProcessor;

/// Which elements a `<key>` applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyTarget {
    Node,
    Edge,
    All,
}

#[derive(Debug)]
struct KeyDef {
    attr_name: String,
    attr_type: AttrType,
    target: KeyTarget,
    default: Option<String>,
}

#[derive(Debug, Default)]
struct PendingNode {
    id: Option<String>,
    data: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct PendingEdge {
    id: Option<String>,
    source: Option<String>,
    target: Option<String>,
    directed: Option<bool>,
    data: Vec<(String, String)>,
}

/// The GraphML processor.
pub struct GraphMlImportProcessor;

impl ImportProcessor for GraphMlImportProcessor {
    fn name(&self) -> &str {
        "graphml"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["graphml"]
    }

    fn parse(&self, text: &str, records: &mut RecordStore) -> Result<usize> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut key_defs: FxHashMap<String, KeyDef> = FxHashMap::default();
        let mut current_key: Option<String> = None;
        let mut in_default = false;
        let mut node: Option<PendingNode> = None;
        let mut edge: Option<PendingEdge> = None;
        let mut data_key: Option<String> = None;
        let mut text_buf = String::new();
        let mut edge_default_directed = true;
        let mut generated_edge_ids = 0usize;
        let mut errors = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::Import(format!("malformed GraphML: {e}")))?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let empty = matches!(event, Event::Empty(_));
                    match e.name().as_ref() {
                        b"key" => {
                            let id = attr(e, "id")?;
                            let def = KeyDef {
                                attr_name: attr(e, "attr.name")?
                                    .or_else(|| id.clone())
                                    .unwrap_or_default(),
                                attr_type: map_type(attr(e, "attr.type")?.as_deref()),
                                target: match attr(e, "for")?.as_deref() {
                                    Some("node") => KeyTarget::Node,
                                    Some("edge") => KeyTarget::Edge,
                                    _ => KeyTarget::All,
                                },
                                default: None,
                            };
                            if let Some(id) = id {
                                declare(records, &def);
                                if empty {
                                    key_defs.insert(id, def);
                                } else {
                                    current_key = Some(id.clone());
                                    key_defs.insert(id, def);
                                }
                            }
                        }
                        b"default" if current_key.is_some() => {
                            in_default = true;
                            text_buf.clear();
                        }
                        b"graph" => {
                            if attr(e, "edgedefault")?.as_deref() == Some("undirected") {
                                edge_default_directed = false;
                            }
                        }
                        b"node" => {
                            let pending = PendingNode {
                                id: attr(e, "id")?,
                                data: Vec::new(),
                            };
                            if empty {
                                errors += commit_node(records, &key_defs, pending)?;
                            } else {
                                node = Some(pending);
                            }
                        }
                        b"edge" => {
                            let pending = PendingEdge {
                                id: attr(e, "id")?,
                                source: attr(e, "source")?,
                                target: attr(e, "target")?,
                                directed: attr(e, "directed")?
                                    .as_deref()
                                    .map(|d| d != "false"),
                                data: Vec::new(),
                            };
                            if empty {
                                errors += commit_edge(
                                    records,
                                    &key_defs,
                                    pending,
                                    edge_default_directed,
                                    &mut generated_edge_ids,
                                )?;
                            } else {
                                edge = Some(pending);
                            }
                        }
                        b"data" if !empty => {
                            data_key = attr(e, "key")?;
                            text_buf.clear();
                        }
                        _ => {}
                    }
                }
                Event::Text(t) => {
                    if in_default || data_key.is_some() {
                        text_buf.push_str(
                            &t.unescape()
                                .map_err(|e| Error::Import(format!("malformed GraphML: {e}")))?,
                        );
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"key" => current_key = None,
                    b"default" => {
                        if let Some(key) = current_key.as_ref() {
                            if let Some(def) = key_defs.get_mut(key) {
                                def.default = Some(text_buf.clone());
                            }
                        }
                        in_default = false;
                    }
                    b"data" => {
                        if let Some(key) = data_key.take() {
                            let value = text_buf.clone();
                            if let Some(n) = node.as_mut() {
                                n.data.push((key, value));
                            } else if let Some(ed) = edge.as_mut() {
                                ed.data.push((key, value));
                            }
                        }
                        text_buf.clear();
                    }
                    b"node" => {
                        if let Some(pending) = node.take() {
                            errors += commit_node(records, &key_defs, pending)?;
                        }
                    }
                    b"edge" => {
                        if let Some(pending) = edge.take() {
                            errors += commit_edge(
                                records,
                                &key_defs,
                                pending,
                                edge_default_directed,
                                &mut generated_edge_ids,
                            )?;
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(errors)
    }
}

/// Writes a parsed node as a record row. Returns 1 when the node had to
/// be skipped.
fn commit_node(
    records: &mut RecordStore,
    key_defs: &FxHashMap<String, KeyDef>,
    node: PendingNode,
) -> Result<usize> {
    let Some(id) = node.id else {
        return Ok(1);
    };
    records.add();
    records.set(keys::SOURCE_IDENTIFIER, id)?;
    for def in key_defs.values() {
        if def.target != KeyTarget::Edge {
            if let Some(default) = &def.default {
                records.set(&format!("{}{}", keys::SOURCE, def.attr_name), default.clone())?;
            }
        }
    }
    for (key, value) in node.data {
        if let Some(def) = key_defs.get(&key) {
            records.set(&format!("{}{}", keys::SOURCE, def.attr_name), value)?;
        }
    }
    Ok(0)
}

/// Writes a parsed edge as a record row. Returns 1 when the edge had to
/// be skipped.
fn commit_edge(
    records: &mut RecordStore,
    key_defs: &FxHashMap<String, KeyDef>,
    edge: PendingEdge,
    edge_default_directed: bool,
    generated_edge_ids: &mut usize,
) -> Result<usize> {
    let (Some(source), Some(target)) = (edge.source, edge.target) else {
        return Ok(1);
    };
    let id = edge.id.unwrap_or_else(|| {
        *generated_edge_ids += 1;
        format!("edge-{generated_edge_ids}")
    });
    let directed = edge.directed.unwrap_or(edge_default_directed);

    records.add();
    records.set(keys::SOURCE_IDENTIFIER, source)?;
    records.set(keys::DESTINATION_IDENTIFIER, target)?;
    records.set(keys::TRANSACTION_IDENTIFIER, id)?;
    records.set(keys::TRANSACTION_DIRECTED, directed.to_string())?;
    for def in key_defs.values() {
        if def.target != KeyTarget::Node {
            if let Some(default) = &def.default {
                records.set(
                    &format!("{}{}", keys::TRANSACTION, def.attr_name),
                    default.clone(),
                )?;
            }
        }
    }
    for (key, value) in edge.data {
        if let Some(def) = key_defs.get(&key) {
            records.set(&format!("{}{}", keys::TRANSACTION, def.attr_name), value)?;
        }
    }
    Ok(0)
}

fn declare(records: &mut RecordStore, def: &KeyDef) {
    if def.target != KeyTarget::Edge {
        records.declare_type(&format!("{}{}", keys::SOURCE, def.attr_name), def.attr_type);
        records.declare_type(
            &format!("{}{}", keys::DESTINATION, def.attr_name),
            def.attr_type,
        );
    }
    if def.target != KeyTarget::Node {
        records.declare_type(
            &format!("{}{}", keys::TRANSACTION, def.attr_name),
            def.attr_type,
        );
    }
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    e.try_get_attribute(name)
        .map_err(|err| Error::Import(format!("malformed GraphML attribute: {err}")))?
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .map_err(|err| Error::Import(format!("malformed GraphML attribute: {err}")))
        })
        .transpose()
}

fn map_type(raw: Option<&str>) -> AttrType {
    match raw {
        Some("boolean") => AttrType::Boolean,
        Some("int" | "long") => AttrType::Integer,
        Some("float" | "double") => AttrType::Float,
        _ => AttrType::String,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::analytic_store;
    use super::super::{import_str, keys};
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d0" for="node" attr.name="color" attr.type="string">
    <default>yellow</default>
  </key>
  <key id="d1" for="edge" attr.name="weight" attr.type="double"/>
  <graph id="G" edgedefault="undirected">
    <node id="n0"/>
    <node id="n1">
      <data key="d0">green</data>
    </node>
    <node id="n2"/>
    <edge id="e0" source="n0" target="n1">
      <data key="d1">2.5</data>
    </edge>
    <edge source="n1" target="n2"/>
  </graph>
</graphml>"#;

    #[test]
    fn test_parse_fills_records() {
        let mut records = RecordStore::new();
        let errors = GraphMlImportProcessor.parse(SAMPLE, &mut records).unwrap();
        assert_eq!(errors, 0);
        // 3 node rows + 2 edge rows.
        assert_eq!(records.len(), 5);

        assert_eq!(records.get(0, keys::SOURCE_IDENTIFIER), Some("n0"));
        // Key default applies where no data overrides it.
        assert_eq!(records.get(0, "source.color"), Some("yellow"));
        assert_eq!(records.get(1, "source.color"), Some("green"));

        assert_eq!(records.get(3, keys::SOURCE_IDENTIFIER), Some("n0"));
        assert_eq!(records.get(3, keys::DESTINATION_IDENTIFIER), Some("n1"));
        assert_eq!(records.get(3, keys::TRANSACTION_IDENTIFIER), Some("e0"));
        assert_eq!(records.get(3, "transaction.weight"), Some("2.5"));
        // edgedefault="undirected".
        assert_eq!(records.get(3, keys::TRANSACTION_DIRECTED), Some("false"));
        assert_eq!(records.declared_type("transaction.weight"), Some(AttrType::Float));
    }

    #[test]
    fn test_missing_edge_id_is_generated() {
        let mut records = RecordStore::new();
        GraphMlImportProcessor.parse(SAMPLE, &mut records).unwrap();
        assert_eq!(records.get(4, keys::TRANSACTION_IDENTIFIER), Some("edge-1"));
    }

    #[test]
    fn test_broken_elements_are_counted_and_skipped() {
        let xml = r#"<graphml><graph edgedefault="directed">
            <node/>
            <node id="a"/>
            <node id="b"/>
            <edge source="a"/>
            <edge source="a" target="b"/>
        </graph></graphml>"#;
        let mut records = RecordStore::new();
        let errors = GraphMlImportProcessor.parse(xml, &mut records).unwrap();
        assert_eq!(errors, 2);
        assert_eq!(records.len(), 3);
        assert_eq!(records.get(2, keys::TRANSACTION_DIRECTED), Some("true"));
    }

    #[test]
    fn test_unclosed_xml_is_fatal() {
        let mut records = RecordStore::new();
        assert!(GraphMlImportProcessor
            .parse("<graphml><graph>", &mut records)
            .is_err());
    }

    #[test]
    fn test_end_to_end_import() {
        let (store, schema) = analytic_store();
        let summary = import_str(&GraphMlImportProcessor, SAMPLE, &store, &schema).unwrap();

        assert_eq!(summary.vertices_created, 3);
        assert_eq!(summary.transactions_created, 2);
        assert_eq!(store.vertex_count(), 3);

        let t = store.transaction_ids()[0];
        assert!(!store.transaction(t).unwrap().is_directed());
        let weight = store
            .attribute_id(astral_common::types::ElementType::Transaction, "weight")
            .unwrap();
        assert_eq!(
            store.transaction_value(weight, t).unwrap(),
            astral_common::types::Value::Float64(2.5)
        );
    }
}
