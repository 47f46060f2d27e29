//! The plugin registry.

use std::sync::Arc;

use arcstr::ArcStr;
use dashmap::DashMap;

use astral_common::utils::strings::{find_similar, format_suggestion};
use astral_common::{Error, Result};

use crate::similarity::{
    AdamicAdarPlugin, CosineSimilarityPlugin, DiceSimilarityPlugin, JaccardSimilarityPlugin,
    LevenshteinPlugin, ResourceAllocationPlugin,
};
use crate::traits::GraphPlugin;

/// Registry of available plugins, keyed by name. Lookup is concurrent;
/// registration usually happens once at startup.
pub struct PluginRegistry {
    plugins: DashMap<ArcStr, Arc<dyn GraphPlugin>>,
}

impl PluginRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: DashMap::new(),
        }
    }

    /// A registry holding every built-in plugin.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(JaccardSimilarityPlugin));
        registry.register(Arc::new(DiceSimilarityPlugin));
        registry.register(Arc::new(CosineSimilarityPlugin));
        registry.register(Arc::new(AdamicAdarPlugin));
        registry.register(Arc::new(ResourceAllocationPlugin));
        registry.register(Arc::new(LevenshteinPlugin));
        registry
    }

    /// Registers a plugin. A plugin with the same name is replaced.
    pub fn register(&self, plugin: Arc<dyn GraphPlugin>) {
        self.plugins.insert(ArcStr::from(plugin.name()), plugin);
    }

    /// Looks up a plugin, suggesting a close name when unknown.
    pub fn get(&self, name: &str) -> Result<Arc<dyn GraphPlugin>> {
        if let Some(plugin) = self.plugins.get(&ArcStr::from(name)) {
            return Ok(Arc::clone(plugin.value()));
        }
        let known = self.names();
        let mut msg = format!("unknown plugin '{name}'");
        if let Some(suggestion) = find_similar(name, &known) {
            msg.push_str(". ");
            msg.push_str(&format_suggestion(suggestion));
        }
        Err(Error::Plugin(msg))
    }

    /// All registered plugin names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<ArcStr> {
        let mut names: Vec<ArcStr> = self.plugins.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let registry = PluginRegistry::with_builtins();
        assert_eq!(registry.len(), 6);
        assert!(registry.get("similarity.jaccard").is_ok());
        assert!(registry.get("similarity.levenshtein").is_ok());
    }

    #[test]
    fn test_unknown_plugin_gets_a_suggestion() {
        let registry = PluginRegistry::with_builtins();
        let err = registry.get("similarity.jacard").unwrap_err();
        assert!(err.to_string().contains("similarity.jaccard"));
    }
}
