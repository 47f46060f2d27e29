//! Resource allocation index.
//!
//! Sums `1 / degree(z)` over the common neighbours `z` of a pair. Like
//! Adamic-Adar but penalises hub neighbours linearly instead of
//! logarithmically.

use std::sync::OnceLock;

use astral_common::Result;
use astral_core::{GraphStore, Schema};

use super::{
    common_parameters, ensure_not_cancelled, neighbourhoods, outcome_message, score_pairs,
    write_scores, PairScore, SimilarityOptions,
};
use crate::params::{ParameterDef, Parameters};
use crate::traits::{GraphPlugin, Interaction, PluginOutcome};

/// Computes resource allocation scores for every qualifying vertex pair.
pub fn resource_allocation_scores(
    store: &GraphStore,
    options: &SimilarityOptions,
) -> Result<Vec<PairScore>> {
    let hoods = neighbourhoods(store, options)?;
    let sets = &hoods.sets;
    Ok(score_pairs(
        &hoods,
        options.minimum_common_features,
        |_, _, common| {
            common
                .iter()
                .filter_map(|z| {
                    let degree = sets.get(z).map_or(0, |s| s.len());
                    (degree > 0).then(|| 1.0 / degree as f64)
                })
                .sum()
        },
    ))
}

fn parameters() -> &'static [ParameterDef] {
    static PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();
    PARAMS.get_or_init(common_parameters)
}

/// The resource allocation plugin.
#[derive(Debug)]
pub struct ResourceAllocationPlugin;

impl GraphPlugin for ResourceAllocationPlugin {
    fn name(&self) -> &str {
        "similarity.resource_allocation"
    }

    fn label(&self) -> &str {
        "Resource Allocation Index"
    }

    fn description(&self) -> &str {
        "Scores vertex pairs by common neighbours, penalising hubs linearly"
    }

    fn parameters(&self) -> &[ParameterDef] {
        parameters()
    }

    fn execute(
        &self,
        store: &GraphStore,
        schema: &Schema,
        params: &Parameters,
        interaction: &mut dyn Interaction,
    ) -> Result<PluginOutcome> {
        let options = SimilarityOptions::from_params(params)?;
        interaction.set_status("scoring vertex pairs");
        let scores = resource_allocation_scores(store, &options)?;
        ensure_not_cancelled(interaction)?;
        interaction.set_status("writing similarity transactions");
        let (created, modified) = write_scores(store, schema, &scores)?;
        Ok(PluginOutcome {
            elements_created: created,
            elements_modified: modified,
            message: outcome_message(self.label(), scores.len(), created),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_graphs::shared_neighbour_graph;
    use super::*;

    #[test]
    fn test_score_sums_inverse_degrees() {
        // Each of the 3 shared neighbours has degree 2: score = 3 * 1/2.
        let (store, _schema, _a, _b) = shared_neighbour_graph(3, 0);
        let scores =
            resource_allocation_scores(&store, &SimilarityOptions::default()).unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores[0].score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_below_minimum_is_not_scored() {
        let (store, _schema, _a, _b) = shared_neighbour_graph(2, 0);
        let scores =
            resource_allocation_scores(&store, &SimilarityOptions::default()).unwrap();
        assert!(scores.is_empty());
    }
}
