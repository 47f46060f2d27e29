//! Finding and replacing attribute values.
//!
//! A [`FindCriteria`] compiles down to a regex (plain text is escaped
//! first) and runs over every vertex or transaction, matching the textual
//! rendering of one attribute. Results support wrap-around navigation and
//! can drive the selection. Replacement rewrites matching portions of
//! string attributes in place.

use arcstr::ArcStr;
use regex::{Regex, RegexBuilder};

use astral_common::types::{AttrType, ElementType, TransactionId, Value, VertexId};
use astral_common::{Error, Result};
use astral_core::graph::AttributeDef;
use astral_core::schema::attrs;
use astral_core::GraphStore;

/// A vertex or transaction a find matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef {
    Vertex(VertexId),
    Transaction(TransactionId),
}

impl ElementRef {
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Vertex(_) => ElementType::Vertex,
            Self::Transaction(_) => ElementType::Transaction,
        }
    }

    #[must_use]
    pub const fn raw_id(&self) -> u64 {
        match self {
            Self::Vertex(v) => v.as_u64(),
            Self::Transaction(t) => t.as_u64(),
        }
    }
}

/// What to look for and where.
#[derive(Debug, Clone)]
pub struct FindCriteria {
    /// Search vertices or transactions.
    pub element_type: ElementType,
    /// Attribute whose values are matched. `None` scans every
    /// string-typed attribute of the element type.
    pub attribute: Option<String>,
    /// Text or regex pattern.
    pub pattern: String,
    /// Treat the pattern as a regex instead of literal text.
    pub regex: bool,
    /// Match regardless of case.
    pub ignore_case: bool,
    /// The whole value must match, not just a substring.
    pub exact: bool,
}

impl FindCriteria {
    /// Literal, case-insensitive substring search over one attribute.
    #[must_use]
    pub fn text(element_type: ElementType, attribute: &str, pattern: &str) -> Self {
        Self {
            element_type,
            attribute: Some(attribute.to_string()),
            pattern: pattern.to_string(),
            regex: false,
            ignore_case: true,
            exact: false,
        }
    }

    /// Literal, case-insensitive substring search over every string
    /// attribute of the element type.
    #[must_use]
    pub fn any_attribute(element_type: ElementType, pattern: &str) -> Self {
        Self {
            attribute: None,
            ..Self::text(element_type, "", pattern)
        }
    }

    fn compile(&self) -> Result<Regex> {
        let mut pattern = if self.regex {
            self.pattern.clone()
        } else {
            regex::escape(&self.pattern)
        };
        if self.exact {
            pattern = format!("^(?:{pattern})$");
        }
        RegexBuilder::new(&pattern)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|e| Error::Pattern(e.to_string()))
    }
}

/// One matched element.
#[derive(Debug, Clone)]
pub struct FindResult {
    /// The matched element.
    pub element: ElementRef,
    /// The attribute that matched.
    pub attribute: ArcStr,
    /// The full attribute value at match time.
    pub value: String,
}

/// How found elements change the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Select exactly the found elements, deselecting everything else.
    Replace,
    /// Add the found elements to the selection.
    Add,
    /// Remove the found elements from the selection.
    Remove,
}

/// Matched elements in id order, with a wrap-around cursor.
#[derive(Debug)]
pub struct FindResultsList {
    element_type: ElementType,
    results: Vec<FindResult>,
    cursor: Option<usize>,
}

impl FindResultsList {
    #[must_use]
    pub fn results(&self) -> &[FindResult] {
        &self.results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The result the cursor is on, if navigation has started.
    #[must_use]
    pub fn current(&self) -> Option<&FindResult> {
        self.cursor.and_then(|i| self.results.get(i))
    }

    /// Advances to the next result, wrapping past the end. Returns `None`
    /// only when the list is empty.
    pub fn next(&mut self) -> Option<&FindResult> {
        if self.results.is_empty() {
            return None;
        }
        let next = match self.cursor {
            Some(i) => (i + 1) % self.results.len(),
            None => 0,
        };
        self.cursor = Some(next);
        self.results.get(next)
    }

    /// Steps back to the previous result, wrapping before the start.
    /// Returns `None` only when the list is empty.
    pub fn previous(&mut self) -> Option<&FindResult> {
        if self.results.is_empty() {
            return None;
        }
        let previous = match self.cursor {
            Some(0) | None => self.results.len() - 1,
            Some(i) => i - 1,
        };
        self.cursor = Some(previous);
        self.results.get(previous)
    }

    /// Applies the results to the selection.
    pub fn apply_selection(&self, store: &GraphStore, mode: SelectionMode) -> Result<usize> {
        let selected = store.require_attribute(self.element_type, attrs::SELECTED)?;
        if mode == SelectionMode::Replace {
            match self.element_type {
                ElementType::Vertex => store.set_all_vertices(selected, Value::Bool(false))?,
                ElementType::Transaction => {
                    store.set_all_transactions(selected, Value::Bool(false))?;
                }
                ElementType::Graph => {}
            }
        }
        let value = Value::Bool(mode != SelectionMode::Remove);
        for result in &self.results {
            match result.element {
                ElementRef::Vertex(v) => store.set_vertex_value(selected, v, value.clone())?,
                ElementRef::Transaction(t) => {
                    store.set_transaction_value(selected, t, value.clone())?;
                }
            }
        }
        Ok(self.results.len())
    }
}

/// Runs a find over the store.
///
/// Results come back in element-id order, each matching attribute its own
/// entry. Null values never match; other values match against their
/// textual rendering, so an integer attribute can be searched for "42".
pub fn find(store: &GraphStore, criteria: &FindCriteria) -> Result<FindResultsList> {
    let (defs, regex) = prepare(store, criteria)?;
    let mut results = Vec::new();
    for element in elements(store, criteria.element_type)? {
        for def in &defs {
            let value = read(store, def.id(), element)?;
            if let Some(text) = render(&value) {
                if regex.is_match(&text) {
                    results.push(FindResult {
                        element,
                        attribute: ArcStr::from(def.name()),
                        value: text,
                    });
                }
            }
        }
    }
    Ok(FindResultsList {
        element_type: criteria.element_type,
        results,
        cursor: None,
    })
}

/// Replaces matching portions of string attribute values.
///
/// Returns how many elements were changed. The pattern may capture groups
/// and the replacement may reference them (`$1`). A named attribute must
/// be string-typed; without one, every string attribute is rewritten.
pub fn replace(store: &GraphStore, criteria: &FindCriteria, replacement: &str) -> Result<usize> {
    let (defs, regex) = prepare(store, criteria)?;
    if let (Some(name), Some(def)) = (&criteria.attribute, defs.first()) {
        if def.attr_type() != AttrType::String {
            return Err(Error::Pattern(format!(
                "replace requires a string attribute, '{name}' holds {} values",
                def.attr_type().name()
            )));
        }
    }

    let mut changed = 0;
    for element in elements(store, criteria.element_type)? {
        let mut touched = false;
        for def in &defs {
            if def.attr_type() != AttrType::String {
                continue;
            }
            if let Value::String(s) = read(store, def.id(), element)? {
                let replaced = regex.replace_all(&s, replacement);
                if replaced != s.as_str() {
                    write(store, def.id(), element, Value::String(replaced.into()))?;
                    touched = true;
                }
            }
        }
        if touched {
            changed += 1;
        }
    }
    Ok(changed)
}

/// Resolves the attributes a criteria covers: the named one, or every
/// string-typed attribute of the element type.
fn prepare(store: &GraphStore, criteria: &FindCriteria) -> Result<(Vec<AttributeDef>, Regex)> {
    if criteria.element_type == ElementType::Graph {
        return Err(Error::Pattern(
            "find operates on vertices or transactions".to_string(),
        ));
    }
    let defs = match &criteria.attribute {
        Some(name) => {
            let attr = store.require_attribute(criteria.element_type, name)?;
            let def = store
                .attribute_def(attr)
                .ok_or_else(|| Error::Attribute(format!("unknown attribute '{name}'")))?;
            vec![def]
        }
        None => store
            .attributes(criteria.element_type)
            .into_iter()
            .filter(|def| def.attr_type() == AttrType::String)
            .collect(),
    };
    let regex = criteria.compile()?;
    Ok((defs, regex))
}

fn elements(store: &GraphStore, element_type: ElementType) -> Result<Vec<ElementRef>> {
    Ok(match element_type {
        ElementType::Vertex => store
            .vertex_ids()
            .into_iter()
            .map(ElementRef::Vertex)
            .collect(),
        ElementType::Transaction => store
            .transaction_ids()
            .into_iter()
            .map(ElementRef::Transaction)
            .collect(),
        ElementType::Graph => {
            return Err(Error::Pattern(
                "find operates on vertices or transactions".to_string(),
            ))
        }
    })
}

fn read(store: &GraphStore, attr: astral_core::AttributeId, element: ElementRef) -> Result<Value> {
    match element {
        ElementRef::Vertex(v) => store.vertex_value(attr, v),
        ElementRef::Transaction(t) => store.transaction_value(attr, t),
    }
}

fn write(
    store: &GraphStore,
    attr: astral_core::AttributeId,
    element: ElementRef,
    value: Value,
) -> Result<()> {
    match element {
        ElementRef::Vertex(v) => store.set_vertex_value(attr, v, value),
        ElementRef::Transaction(t) => store.set_transaction_value(attr, t, value),
    }
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astral_core::schema::AnalyticSchemaFactory;
    use astral_core::SchemaFactory;

    fn store_with_names(names: &[&str]) -> (GraphStore, Vec<VertexId>) {
        let store = GraphStore::new();
        AnalyticSchemaFactory
            .create_schema()
            .new_graph(&store)
            .unwrap();
        let attr = store
            .attribute_id(ElementType::Vertex, attrs::IDENTIFIER)
            .unwrap();
        let vs = names
            .iter()
            .map(|name| {
                let v = store.add_vertex();
                store
                    .set_vertex_value(attr, v, Value::String((*name).into()))
                    .unwrap();
                v
            })
            .collect();
        (store, vs)
    }

    #[test]
    fn test_text_find_is_substring_and_case_insensitive() {
        let (store, vs) = store_with_names(&["Alice Jones", "Bob Smith", "alice cooper"]);
        let criteria = FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, "alice");
        let results = find(&store, &criteria).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.results()[0].element, ElementRef::Vertex(vs[0]));
    }

    #[test]
    fn test_exact_match() {
        let (store, _vs) = store_with_names(&["alice", "alice jones"]);
        let criteria = FindCriteria {
            exact: true,
            ..FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, "alice")
        };
        let results = find(&store, &criteria).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_regex_find() {
        let (store, _vs) = store_with_names(&["user-17", "user-9", "admin-3"]);
        let criteria = FindCriteria {
            regex: true,
            ..FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, r"^user-\d+$")
        };
        assert_eq!(find(&store, &criteria).unwrap().len(), 2);
    }

    #[test]
    fn test_any_attribute_scans_all_string_attributes() {
        let (store, vs) = store_with_names(&["alice", "bob"]);
        let source = store
            .attribute_id(ElementType::Vertex, attrs::SOURCE)
            .unwrap();
        store
            .set_vertex_value(source, vs[1], Value::String("alice's import".into()))
            .unwrap();

        let criteria = FindCriteria::any_attribute(ElementType::Vertex, "alice");
        let results = find(&store, &criteria).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.results()[0].attribute, attrs::IDENTIFIER);
        assert_eq!(results.results()[1].attribute, attrs::SOURCE);

        // Replacement over all string attributes touches both vertices.
        let changed = replace(&store, &criteria, "carol").unwrap();
        assert_eq!(changed, 2);
        assert_eq!(
            store.vertex_value(source, vs[1]).unwrap(),
            Value::String("carol's import".into())
        );
    }

    #[test]
    fn test_bad_regex_is_an_error() {
        let (store, _vs) = store_with_names(&["alice"]);
        let criteria = FindCriteria {
            regex: true,
            ..FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, "(unclosed")
        };
        assert!(matches!(find(&store, &criteria), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let (store, vs) = store_with_names(&["a1", "a2", "a3"]);
        let criteria = FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, "a");
        let mut results = find(&store, &criteria).unwrap();

        assert!(results.current().is_none());
        assert_eq!(results.next().unwrap().element, ElementRef::Vertex(vs[0]));
        assert_eq!(results.next().unwrap().element, ElementRef::Vertex(vs[1]));
        assert_eq!(results.next().unwrap().element, ElementRef::Vertex(vs[2]));
        // Wraps to the first.
        assert_eq!(results.next().unwrap().element, ElementRef::Vertex(vs[0]));
        // And back around.
        assert_eq!(results.previous().unwrap().element, ElementRef::Vertex(vs[2]));
    }

    #[test]
    fn test_empty_results_navigate_to_none() {
        let (store, _vs) = store_with_names(&["alice"]);
        let criteria = FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, "zzz");
        let mut results = find(&store, &criteria).unwrap();
        assert!(results.is_empty());
        assert!(results.next().is_none());
        assert!(results.previous().is_none());
    }

    #[test]
    fn test_selection_modes() {
        let (store, vs) = store_with_names(&["alice", "bob", "alina"]);
        let selected = store
            .attribute_id(ElementType::Vertex, attrs::SELECTED)
            .unwrap();
        store
            .set_vertex_value(selected, vs[1], Value::Bool(true))
            .unwrap();

        let criteria = FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, "al");
        let results = find(&store, &criteria).unwrap();

        results.apply_selection(&store, SelectionMode::Replace).unwrap();
        assert_eq!(store.vertex_value(selected, vs[0]).unwrap(), Value::Bool(true));
        assert_eq!(store.vertex_value(selected, vs[1]).unwrap(), Value::Bool(false));
        assert_eq!(store.vertex_value(selected, vs[2]).unwrap(), Value::Bool(true));

        results.apply_selection(&store, SelectionMode::Remove).unwrap();
        assert_eq!(store.vertex_value(selected, vs[0]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_replace_rewrites_matches() {
        let (store, vs) = store_with_names(&["alice@example.com", "bob@example.com", "carol"]);
        let criteria = FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, "@example.com");
        let changed = replace(&store, &criteria, "@astral.test").unwrap();
        assert_eq!(changed, 2);

        let attr = store
            .attribute_id(ElementType::Vertex, attrs::IDENTIFIER)
            .unwrap();
        assert_eq!(
            store.vertex_value(attr, vs[0]).unwrap(),
            Value::String("alice@astral.test".into())
        );
        assert_eq!(
            store.vertex_value(attr, vs[2]).unwrap(),
            Value::String("carol".into())
        );
    }

    #[test]
    fn test_replace_with_capture_groups() {
        let (store, vs) = store_with_names(&["Jones, Alice"]);
        let criteria = FindCriteria {
            regex: true,
            ignore_case: false,
            ..FindCriteria::text(ElementType::Vertex, attrs::IDENTIFIER, r"^(\w+), (\w+)$")
        };
        replace(&store, &criteria, "$2 $1").unwrap();

        let attr = store
            .attribute_id(ElementType::Vertex, attrs::IDENTIFIER)
            .unwrap();
        assert_eq!(
            store.vertex_value(attr, vs[0]).unwrap(),
            Value::String("Alice Jones".into())
        );
    }

    #[test]
    fn test_replace_requires_string_attribute() {
        let (store, _vs) = store_with_names(&["alice"]);
        let criteria = FindCriteria::text(ElementType::Vertex, attrs::WEIGHT, "1");
        assert!(replace(&store, &criteria, "2").is_err());
    }
}
