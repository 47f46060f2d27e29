//! The plugin trait and execution context.

use astral_core::{GraphStore, Schema};

use astral_common::Result;

use crate::params::{ParameterDef, Parameters};

/// What a plugin run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginOutcome {
    /// Elements the run created.
    pub elements_created: usize,
    /// Elements the run modified.
    pub elements_modified: usize,
    /// Human-readable summary.
    pub message: String,
}

impl PluginOutcome {
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Feedback channel from a running plugin to whoever launched it.
pub trait Interaction: Send {
    /// Reports progress out of a total amount of work.
    fn set_progress(&mut self, current: usize, total: usize);

    /// Reports what the plugin is currently doing.
    fn set_status(&mut self, status: &str);

    /// Polled by long-running plugins; a true return asks the plugin to
    /// stop at the next safe point.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// An interaction sink that ignores everything.
#[derive(Debug, Default)]
pub struct NullInteraction;

impl Interaction for NullInteraction {
    fn set_progress(&mut self, _current: usize, _total: usize) {}

    fn set_status(&mut self, _status: &str) {}
}

/// A named, parameterised operation on a graph.
pub trait GraphPlugin: Send + Sync + std::fmt::Debug {
    /// Stable plugin name, used for lookup and reports.
    fn name(&self) -> &str;

    /// Human-readable label.
    fn label(&self) -> &str;

    /// What the plugin does.
    fn description(&self) -> &str;

    /// The parameters this plugin accepts.
    fn parameters(&self) -> &[ParameterDef];

    /// Runs the plugin. `params` has already been validated and filled
    /// with defaults.
    fn execute(
        &self,
        store: &GraphStore,
        schema: &Schema,
        params: &Parameters,
        interaction: &mut dyn Interaction,
    ) -> Result<PluginOutcome>;
}
