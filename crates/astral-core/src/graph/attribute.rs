//! The attribute registry.
//!
//! Every attribute a graph element can carry is declared up front: which
//! element kind it applies to, its name, its value type, and the default
//! value an element reads before anything is written. Declarations come
//! from schema concepts or from import processors discovering columns.

use arcstr::ArcStr;
use astral_common::types::{AttrType, ElementType, Value};
use astral_common::utils::hash::FxHashMap;
use astral_common::utils::strings::{find_similar, format_suggestion};
use astral_common::{Error, Result};

/// Identifies a registered attribute within one graph.
///
/// Ids are dense and never reused, so they index directly into the
/// registry's definition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(u32);

impl AttributeId {
    #[must_use]
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// A registered attribute definition.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    id: AttributeId,
    element_type: ElementType,
    name: ArcStr,
    attr_type: AttrType,
    description: ArcStr,
    default: Value,
}

impl AttributeDef {
    #[must_use]
    pub const fn id(&self) -> AttributeId {
        self.id
    }

    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.element_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn attr_type(&self) -> AttrType {
        self.attr_type
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The value an element reads while nothing has been written.
    #[must_use]
    pub const fn default(&self) -> &Value {
        &self.default
    }
}

/// All attribute definitions for one graph, indexed by id and by
/// (element type, name).
#[derive(Debug, Default)]
pub struct AttributeRegistry {
    defs: Vec<AttributeDef>,
    by_name: FxHashMap<(ElementType, ArcStr), AttributeId>,
}

impl AttributeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an attribute, or returns the existing id when an identical
    /// declaration is already present.
    ///
    /// Re-declaring a name with a different value type is an error; schema
    /// migrations go through [`retype`](Self::retype) instead.
    pub fn register(
        &mut self,
        element_type: ElementType,
        name: &str,
        attr_type: AttrType,
        description: &str,
        default: Value,
    ) -> Result<AttributeId> {
        if let Some(&id) = self.by_name.get(&(element_type, ArcStr::from(name))) {
            let existing = &self.defs[id.as_u32() as usize];
            if existing.attr_type == attr_type {
                return Ok(id);
            }
            return Err(Error::Attribute(format!(
                "{element_type} attribute '{name}' is already registered as {}",
                existing.attr_type.name()
            )));
        }
        if !attr_type.accepts(&default) {
            return Err(Error::Attribute(format!(
                "default for {element_type} attribute '{name}' is not a {}",
                attr_type.name()
            )));
        }

        let id = AttributeId::new(u32::try_from(self.defs.len()).map_err(|_| {
            Error::Attribute("attribute registry is full".to_string())
        })?);
        let name = ArcStr::from(name);
        self.defs.push(AttributeDef {
            id,
            element_type,
            name: name.clone(),
            attr_type,
            description: ArcStr::from(description),
            default,
        });
        self.by_name.insert((element_type, name), id);
        Ok(id)
    }

    /// Looks up an attribute id by element type and name.
    #[must_use]
    pub fn lookup(&self, element_type: ElementType, name: &str) -> Option<AttributeId> {
        self.by_name.get(&(element_type, ArcStr::from(name))).copied()
    }

    /// Like [`lookup`](Self::lookup), but produces an error with a spelling
    /// suggestion when the attribute is unknown.
    pub fn require(&self, element_type: ElementType, name: &str) -> Result<AttributeId> {
        self.lookup(element_type, name).ok_or_else(|| {
            let known: Vec<&str> = self
                .defs
                .iter()
                .filter(|d| d.element_type == element_type)
                .map(AttributeDef::name)
                .collect();
            let mut msg = format!("unknown {element_type} attribute '{name}'");
            if let Some(suggestion) = find_similar(name, &known) {
                msg.push_str(". ");
                msg.push_str(&format_suggestion(suggestion));
            }
            Error::Attribute(msg)
        })
    }

    /// Returns the definition for an id.
    #[must_use]
    pub fn def(&self, id: AttributeId) -> Option<&AttributeDef> {
        self.defs.get(id.as_u32() as usize)
    }

    /// All definitions for one element type, in registration order.
    #[must_use]
    pub fn defs_for(&self, element_type: ElementType) -> Vec<AttributeDef> {
        self.defs
            .iter()
            .filter(|d| d.element_type == element_type)
            .cloned()
            .collect()
    }

    /// Every definition, in registration order.
    #[must_use]
    pub fn all(&self) -> &[AttributeDef] {
        &self.defs
    }

    /// Renames an attribute. The id is unchanged.
    pub fn rename(&mut self, id: AttributeId, new_name: &str) -> Result<()> {
        let (element_type, old_name) = match self.defs.get(id.as_u32() as usize) {
            Some(def) => (def.element_type, def.name.clone()),
            None => return Err(Error::Attribute(format!("unknown attribute id {}", id.as_u32()))),
        };
        let new_key = (element_type, ArcStr::from(new_name));
        if self.by_name.contains_key(&new_key) {
            return Err(Error::Attribute(format!(
                "{element_type} attribute '{new_name}' already exists"
            )));
        }
        self.by_name.remove(&(element_type, old_name));
        self.by_name.insert(new_key, id);
        self.defs[id.as_u32() as usize].name = ArcStr::from(new_name);
        Ok(())
    }

    /// Changes an attribute's value type, converting its default.
    ///
    /// The caller is responsible for converting stored values; the store
    /// does this in the same operation.
    pub fn retype(&mut self, id: AttributeId, new_type: AttrType) -> Result<()> {
        let def = self
            .defs
            .get_mut(id.as_u32() as usize)
            .ok_or_else(|| Error::Attribute(format!("unknown attribute id {}", id.as_u32())))?;
        def.default = def.default.convert_to(new_type).unwrap_or(Value::Null);
        def.attr_type = new_type;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut reg = AttributeRegistry::new();
        let id = reg
            .register(
                ElementType::Vertex,
                "weight",
                AttrType::Float,
                "Vertex weight",
                Value::Float64(1.0),
            )
            .unwrap();

        assert_eq!(reg.lookup(ElementType::Vertex, "weight"), Some(id));
        assert_eq!(reg.lookup(ElementType::Transaction, "weight"), None);

        let def = reg.def(id).unwrap();
        assert_eq!(def.name(), "weight");
        assert_eq!(def.attr_type(), AttrType::Float);
        assert_eq!(def.default(), &Value::Float64(1.0));
    }

    #[test]
    fn test_register_is_idempotent_for_same_type() {
        let mut reg = AttributeRegistry::new();
        let a = reg
            .register(ElementType::Vertex, "x", AttrType::Integer, "", Value::Int64(0))
            .unwrap();
        let b = reg
            .register(ElementType::Vertex, "x", AttrType::Integer, "", Value::Int64(0))
            .unwrap();
        assert_eq!(a, b);

        let conflict = reg.register(ElementType::Vertex, "x", AttrType::String, "", Value::Null);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_require_suggests_similar_names() {
        let mut reg = AttributeRegistry::new();
        reg.register(
            ElementType::Vertex,
            "identifier",
            AttrType::String,
            "",
            Value::Null,
        )
        .unwrap();

        let err = reg.require(ElementType::Vertex, "identifer").unwrap_err();
        assert!(err.to_string().contains("identifier"));
    }

    #[test]
    fn test_rename_and_retype() {
        let mut reg = AttributeRegistry::new();
        let id = reg
            .register(
                ElementType::Transaction,
                "Score",
                AttrType::String,
                "",
                Value::Null,
            )
            .unwrap();

        reg.rename(id, "similarity").unwrap();
        assert_eq!(reg.lookup(ElementType::Transaction, "Score"), None);
        assert_eq!(reg.lookup(ElementType::Transaction, "similarity"), Some(id));

        reg.retype(id, AttrType::Float).unwrap();
        assert_eq!(reg.def(id).unwrap().attr_type(), AttrType::Float);
    }

    #[test]
    fn test_rename_collision_rejected() {
        let mut reg = AttributeRegistry::new();
        let a = reg
            .register(ElementType::Vertex, "a", AttrType::Integer, "", Value::Int64(0))
            .unwrap();
        reg.register(ElementType::Vertex, "b", AttrType::Integer, "", Value::Int64(0))
            .unwrap();
        assert!(reg.rename(a, "b").is_err());
    }
}
