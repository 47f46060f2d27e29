//! Run reports.
//!
//! Every plugin run leaves a report: which plugin, with which parameters,
//! how long it took, and whether it succeeded. Reports are kept per graph
//! with a bounded history, oldest dropped first.

use std::time::{Duration, SystemTime};

use arcstr::ArcStr;
use dashmap::DashMap;

use astral_common::types::{GraphId, Value};

/// How many reports each graph keeps unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 128;

/// How a plugin run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// The run completed.
    Success {
        message: String,
        elements_created: usize,
        elements_modified: usize,
    },
    /// The run failed with an error.
    Failed(String),
    /// The run was cancelled through its interaction.
    Cancelled,
}

impl ReportOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// One recorded plugin run.
#[derive(Debug, Clone)]
pub struct PluginReport {
    plugin_name: ArcStr,
    started_at: SystemTime,
    duration: Duration,
    parameters: Vec<(ArcStr, Value)>,
    outcome: ReportOutcome,
}

impl PluginReport {
    #[must_use]
    pub fn new(
        plugin_name: &str,
        started_at: SystemTime,
        duration: Duration,
        parameters: Vec<(ArcStr, Value)>,
        outcome: ReportOutcome,
    ) -> Self {
        Self {
            plugin_name: ArcStr::from(plugin_name),
            started_at,
            duration,
            parameters,
            outcome,
        }
    }

    #[must_use]
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    #[must_use]
    pub const fn started_at(&self) -> SystemTime {
        self.started_at
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Parameter values the run was launched with, sorted by name.
    #[must_use]
    pub fn parameters(&self) -> &[(ArcStr, Value)] {
        &self.parameters
    }

    #[must_use]
    pub const fn outcome(&self) -> &ReportOutcome {
        &self.outcome
    }
}

/// Bounded report history for one graph.
#[derive(Debug, Default)]
pub struct GraphReport {
    reports: Vec<PluginReport>,
}

impl GraphReport {
    fn record(&mut self, report: PluginReport, limit: usize) {
        if self.reports.len() == limit {
            self.reports.remove(0);
        }
        self.reports.push(report);
    }

    /// Reports in recording order, oldest first.
    #[must_use]
    pub fn reports(&self) -> &[PluginReport] {
        &self.reports
    }

    #[must_use]
    pub fn latest(&self) -> Option<&PluginReport> {
        self.reports.last()
    }
}

/// Keeps the report history of every open graph.
#[derive(Debug)]
pub struct ReportManager {
    graphs: DashMap<GraphId, GraphReport>,
    limit: usize,
}

impl ReportManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// A manager that keeps at most `limit` reports per graph.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            graphs: DashMap::new(),
            limit,
        }
    }

    /// Records a report against a graph.
    pub fn record(&self, graph: GraphId, report: PluginReport) {
        self.graphs
            .entry(graph)
            .or_default()
            .record(report, self.limit);
    }

    /// A copy of a graph's report history, oldest first.
    #[must_use]
    pub fn reports_for(&self, graph: GraphId) -> Vec<PluginReport> {
        self.graphs
            .get(&graph)
            .map(|g| g.reports().to_vec())
            .unwrap_or_default()
    }

    /// A copy of a graph's most recent report.
    #[must_use]
    pub fn latest_for(&self, graph: GraphId) -> Option<PluginReport> {
        self.graphs.get(&graph).and_then(|g| g.latest().cloned())
    }

    /// Drops a graph's history, typically when the graph is closed.
    pub fn forget(&self, graph: GraphId) {
        self.graphs.remove(&graph);
    }
}

impl Default for ReportManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str) -> PluginReport {
        PluginReport::new(
            name,
            SystemTime::now(),
            Duration::from_millis(5),
            Vec::new(),
            ReportOutcome::Success {
                message: "done".into(),
                elements_created: 0,
                elements_modified: 0,
            },
        )
    }

    #[test]
    fn test_record_and_read_back() {
        let manager = ReportManager::new();
        let graph = GraphId::new(1);

        manager.record(graph, report("similarity.jaccard"));
        manager.record(graph, report("similarity.dice"));

        let reports = manager.reports_for(graph);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].plugin_name(), "similarity.jaccard");
        assert_eq!(
            manager.latest_for(graph).unwrap().plugin_name(),
            "similarity.dice"
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let manager = ReportManager::with_limit(16);
        let graph = GraphId::new(1);
        for i in 0..26 {
            manager.record(graph, report(&format!("plugin.{i}")));
        }
        let reports = manager.reports_for(graph);
        assert_eq!(reports.len(), 16);
        // The oldest ten were dropped.
        assert_eq!(reports[0].plugin_name(), "plugin.10");
    }

    #[test]
    fn test_forget() {
        let manager = ReportManager::new();
        let graph = GraphId::new(1);
        manager.record(graph, report("similarity.cosine"));
        manager.forget(graph);
        assert!(manager.reports_for(graph).is_empty());
        assert!(manager.latest_for(graph).is_none());
    }
}
