//! Schema version migration.
//!
//! Saved graphs record the factory name and version they were written
//! under. On load, the update provider chain walks the graph forward one
//! version at a time until it reaches the current factory version. A gap
//! in the chain is an error; the load is abandoned rather than applied
//! half-way.

use astral_common::types::{AttrType, ElementType};
use astral_common::{Error, Result};

use crate::graph::GraphStore;
use crate::schema::attrs;
use crate::schema::factory::ANALYTIC_SCHEMA_NAME;

/// Migrates a graph from one schema version to the next.
pub trait UpdateProvider: Send + Sync {
    /// Factory whose graphs this provider migrates.
    fn schema_name(&self) -> &str;

    /// Version this provider upgrades from.
    fn from_version(&self) -> u32;

    /// Version this provider produces.
    fn to_version(&self) -> u32 {
        self.from_version() + 1
    }

    /// Applies the migration in place.
    fn update(&self, store: &GraphStore) -> Result<()>;
}

/// Holds every known update provider and runs chains of them.
pub struct UpdateRegistry {
    providers: Vec<Box<dyn UpdateProvider>>,
}

impl UpdateRegistry {
    /// A registry holding the built-in analytic providers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            providers: Vec::new(),
        };
        registry.register(Box::new(ScoreRenameUpdate));
        registry.register(Box::new(WeightRetypeUpdate));
        registry
    }

    /// Registers a provider.
    pub fn register(&mut self, provider: Box<dyn UpdateProvider>) {
        self.providers.push(provider);
    }

    /// Walks a graph from `from` up to `target`, one provider per step.
    ///
    /// Returns the version reached, which is always `target` on success.
    /// A missing step fails before anything past it is applied.
    pub fn update_to(
        &self,
        store: &GraphStore,
        schema_name: &str,
        from: u32,
        target: u32,
    ) -> Result<u32> {
        if from > target {
            return Err(Error::SchemaUpdate(format!(
                "graph was saved under {schema_name} version {from}, \
                 newer than the supported version {target}"
            )));
        }
        let mut version = from;
        while version < target {
            let provider = self
                .providers
                .iter()
                .find(|p| p.schema_name() == schema_name && p.from_version() == version)
                .ok_or_else(|| {
                    Error::SchemaUpdate(format!(
                        "no update path from {schema_name} version {version} to {target}"
                    ))
                })?;
            provider.update(store)?;
            version = provider.to_version();
        }
        Ok(version)
    }
}

impl Default for UpdateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// v0 -> v1: early graphs recorded similarity scores in a string
/// transaction attribute named "Score". Renames it and makes it a float.
struct ScoreRenameUpdate;

impl UpdateProvider for ScoreRenameUpdate {
    fn schema_name(&self) -> &str {
        ANALYTIC_SCHEMA_NAME
    }

    fn from_version(&self) -> u32 {
        0
    }

    fn update(&self, store: &GraphStore) -> Result<()> {
        if let Some(id) = store.attribute_id(ElementType::Transaction, "Score") {
            store.rename_attribute(id, attrs::SIMILARITY)?;
            store.retype_attribute(id, AttrType::Float)?;
        }
        Ok(())
    }
}

/// v1 -> v2: weights used to be integers. Widens them to floats.
struct WeightRetypeUpdate;

impl UpdateProvider for WeightRetypeUpdate {
    fn schema_name(&self) -> &str {
        ANALYTIC_SCHEMA_NAME
    }

    fn from_version(&self) -> u32 {
        1
    }

    fn update(&self, store: &GraphStore) -> Result<()> {
        for element_type in [ElementType::Vertex, ElementType::Transaction] {
            if let Some(id) = store.attribute_id(element_type, attrs::WEIGHT) {
                let integer = store
                    .attribute_def(id)
                    .map_or(false, |def| def.attr_type() == AttrType::Integer);
                if integer {
                    store.retype_attribute(id, AttrType::Float)?;
                }
            }
        }
        Ok(())
    }
}
