//! Schema factories and the factory registry.

use std::sync::Arc;

use arcstr::ArcStr;
use astral_common::utils::hash::FxHashMap;
use astral_common::{Error, Result};

use super::concept::SchemaConcept;
use super::concepts::{AnalyticConcept, BaseConcept};
use super::Schema;

/// Name of the built-in analytic factory.
pub const ANALYTIC_SCHEMA_NAME: &str = "astral.schema.analytic";

/// Current version of the analytic schema. Bump alongside a new update
/// provider in [`versioning`](super::versioning).
pub(crate) const ANALYTIC_SCHEMA_VERSION: u32 = 2;

/// Builds versioned schemas from a stack of concepts.
pub trait SchemaFactory: Send + Sync {
    /// Stable factory name, recorded in saved graphs.
    fn name(&self) -> &str;

    /// Human-readable label.
    fn label(&self) -> &str;

    /// Current schema version. Saved graphs with an older version go
    /// through the update provider chain on load.
    fn version(&self) -> u32;

    /// The concepts this factory stacks, base first.
    fn concepts(&self) -> Vec<Box<dyn SchemaConcept>>;

    /// Builds the merged schema.
    fn create_schema(&self) -> Schema {
        Schema::from_concepts(self.name(), self.version(), &self.concepts())
    }
}

/// The default factory: base attributes plus the analytic layer.
pub struct AnalyticSchemaFactory;

impl SchemaFactory for AnalyticSchemaFactory {
    fn name(&self) -> &str {
        ANALYTIC_SCHEMA_NAME
    }

    fn label(&self) -> &str {
        "Analytic Graph"
    }

    fn version(&self) -> u32 {
        ANALYTIC_SCHEMA_VERSION
    }

    fn concepts(&self) -> Vec<Box<dyn SchemaConcept>> {
        vec![Box::new(BaseConcept), Box::new(AnalyticConcept)]
    }
}

/// Registry of schema factories, keyed by name.
pub struct FactoryRegistry {
    factories: FxHashMap<ArcStr, Arc<dyn SchemaFactory>>,
    default: ArcStr,
}

impl FactoryRegistry {
    /// A registry holding the built-in analytic factory as default.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            factories: FxHashMap::default(),
            default: ArcStr::from(ANALYTIC_SCHEMA_NAME),
        };
        registry.register(Arc::new(AnalyticSchemaFactory));
        registry
    }

    /// Registers a factory. A factory with the same name is replaced.
    pub fn register(&mut self, factory: Arc<dyn SchemaFactory>) {
        self.factories
            .insert(ArcStr::from(factory.name()), factory);
    }

    /// Looks up a factory by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn SchemaFactory>> {
        self.factories
            .get(&ArcStr::from(name))
            .cloned()
            .ok_or_else(|| Error::Schema(format!("unknown schema factory '{name}'")))
    }

    /// The default factory.
    pub fn default_factory(&self) -> Result<Arc<dyn SchemaFactory>> {
        self.get(&self.default)
    }

    /// All registered factory names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<ArcStr> {
        let mut names: Vec<ArcStr> = self.factories.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = FactoryRegistry::with_builtins();
        let factory = registry.default_factory().unwrap();
        assert_eq!(factory.name(), ANALYTIC_SCHEMA_NAME);
        assert_eq!(factory.version(), ANALYTIC_SCHEMA_VERSION);
        assert!(registry.get("astral.schema.unknown").is_err());
    }

    #[test]
    fn test_create_schema_merges_concepts() {
        let schema = AnalyticSchemaFactory.create_schema();
        assert_eq!(schema.factory_name(), ANALYTIC_SCHEMA_NAME);
        assert_eq!(schema.version(), ANALYTIC_SCHEMA_VERSION);
        assert!(schema
            .transaction_types()
            .iter()
            .any(|t| t.as_str() == "similarity"));
    }
}
