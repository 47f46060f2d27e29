//! The database handle.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use tracing::{info, warn};

use astral_common::types::{GraphId, TransactionId, VertexId};
use astral_common::Result;
use astral_core::schema::versioning::UpdateRegistry;
use astral_core::schema::AnalyticSchemaFactory;
use astral_core::{snapshot, GraphStore, Schema, SchemaFactory};
use astral_plugins::find::{self, FindCriteria, FindResultsList};
use astral_plugins::import::{self, ImportSummary};
use astral_plugins::report::{PluginReport, ReportManager, ReportOutcome};
use astral_plugins::{Interaction, NullInteraction, Parameters, PluginOutcome, PluginRegistry};

use crate::config::Config;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// An in-process graph database: one store, one schema, the built-in
/// plugins, and the run report history.
pub struct AstralDB {
    graph_id: GraphId,
    store: GraphStore,
    schema: Schema,
    factory: Arc<dyn SchemaFactory>,
    plugins: PluginRegistry,
    updates: UpdateRegistry,
    reports: ReportManager,
}

impl AstralDB {
    /// Opens an empty in-memory graph under the analytic schema.
    pub fn new_in_memory() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Opens an empty graph with the given configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_schema(config, Arc::new(AnalyticSchemaFactory))
    }

    /// Opens an empty graph under a specific schema factory.
    pub fn with_schema(config: Config, factory: Arc<dyn SchemaFactory>) -> Result<Self> {
        config.validate()?;
        let store = GraphStore::with_config(config.store_config());
        let schema = factory.create_schema();
        schema.new_graph(&store)?;
        info!(schema = factory.name(), "opened in-memory graph");
        Ok(Self::assemble(
            store,
            schema,
            factory,
            ReportManager::with_limit(config.report_history),
        ))
    }

    /// Loads a saved graph, migrating it when it was written under an
    /// older schema version.
    pub fn open(path: &Path) -> Result<Self> {
        let factory: Arc<dyn SchemaFactory> = Arc::new(AnalyticSchemaFactory);
        let updates = UpdateRegistry::with_builtins();
        let store = snapshot::load(path, factory.as_ref(), &updates)?;
        info!(
            path = %path.display(),
            vertices = store.vertex_count(),
            transactions = store.transaction_count(),
            "opened graph"
        );
        let schema = factory.create_schema();
        Ok(Self::assemble(store, schema, factory, ReportManager::new()))
    }

    fn assemble(
        store: GraphStore,
        schema: Schema,
        factory: Arc<dyn SchemaFactory>,
        reports: ReportManager,
    ) -> Self {
        Self {
            graph_id: GraphId::new(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed)),
            store,
            schema,
            factory,
            plugins: PluginRegistry::with_builtins(),
            updates: UpdateRegistry::with_builtins(),
            reports,
        }
    }

    /// Saves the graph to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        snapshot::save(&self.store, &self.schema, path)?;
        info!(path = %path.display(), "saved graph");
        Ok(())
    }

    #[must_use]
    pub const fn graph_id(&self) -> GraphId {
        self.graph_id
    }

    #[must_use]
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn schema_factory(&self) -> &dyn SchemaFactory {
        self.factory.as_ref()
    }

    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    #[must_use]
    pub fn update_registry(&self) -> &UpdateRegistry {
        &self.updates
    }

    /// Adds a vertex and runs the schema's new-vertex hook.
    pub fn add_vertex(&self) -> Result<VertexId> {
        let v = self.store.add_vertex();
        self.schema.new_vertex(&self.store, v)?;
        Ok(v)
    }

    /// Adds a transaction and runs the schema's new-transaction hook.
    pub fn add_transaction(
        &self,
        source: VertexId,
        destination: VertexId,
        directed: bool,
    ) -> Result<TransactionId> {
        let t = self.store.add_transaction(source, destination, directed)?;
        self.schema.new_transaction(&self.store, t)?;
        Ok(t)
    }

    /// Runs a registered plugin by name, recording a report either way.
    pub fn run_plugin(&self, name: &str, params: Parameters) -> Result<PluginOutcome> {
        self.run_plugin_with(name, params, &mut NullInteraction)
    }

    /// Like [`run_plugin`](Self::run_plugin), with a caller-supplied
    /// interaction for progress and cancellation.
    pub fn run_plugin_with(
        &self,
        name: &str,
        mut params: Parameters,
        interaction: &mut dyn Interaction,
    ) -> Result<PluginOutcome> {
        let plugin = self.plugins.get(name)?;
        params.merge_defaults(plugin.parameters());
        params.validate(plugin.parameters())?;

        let started_at = SystemTime::now();
        let clock = Instant::now();
        let result = plugin.execute(&self.store, &self.schema, &params, interaction);
        let duration = clock.elapsed();

        let outcome = match &result {
            Ok(outcome) => {
                info!(
                    plugin = plugin.name(),
                    created = outcome.elements_created,
                    modified = outcome.elements_modified,
                    ?duration,
                    "plugin run complete"
                );
                ReportOutcome::Success {
                    message: outcome.message.clone(),
                    elements_created: outcome.elements_created,
                    elements_modified: outcome.elements_modified,
                }
            }
            Err(astral_common::Error::Cancelled) => {
                info!(plugin = plugin.name(), ?duration, "plugin run cancelled");
                ReportOutcome::Cancelled
            }
            Err(e) => {
                warn!(plugin = plugin.name(), error = %e, "plugin run failed");
                ReportOutcome::Failed(e.to_string())
            }
        };
        self.reports.record(
            self.graph_id,
            PluginReport::new(plugin.name(), started_at, duration, params.entries(), outcome),
        );
        result
    }

    /// Imports a graph file, dispatching on its extension, and merges it
    /// into this graph.
    pub fn import_file(&self, path: &Path) -> Result<ImportSummary> {
        let processor = import::processor_for_path(path)?;
        let text = std::fs::read_to_string(path)?;
        let summary = import::import_str(processor.as_ref(), &text, &self.store, &self.schema)?;
        info!(
            path = %path.display(),
            format = processor.name(),
            vertices = summary.vertices_created,
            transactions = summary.transactions_created,
            errors = summary.processing_errors,
            "imported graph file"
        );
        Ok(summary)
    }

    /// Runs a find over this graph.
    pub fn find(&self, criteria: &FindCriteria) -> Result<FindResultsList> {
        find::find(&self.store, criteria)
    }

    /// Runs a replace over this graph, returning how many elements
    /// changed.
    pub fn replace(&self, criteria: &FindCriteria, replacement: &str) -> Result<usize> {
        find::replace(&self.store, criteria, replacement)
    }

    /// This graph's plugin run history, oldest first.
    #[must_use]
    pub fn graph_report(&self) -> Vec<PluginReport> {
        self.reports.reports_for(self.graph_id)
    }

    #[must_use]
    pub fn report_manager(&self) -> &ReportManager {
        &self.reports
    }
}

impl std::fmt::Debug for AstralDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstralDB")
            .field("graph_id", &self.graph_id)
            .field("schema", &self.schema)
            .field("vertices", &self.store.vertex_count())
            .field("transactions", &self.store.transaction_count())
            .finish()
    }
}
