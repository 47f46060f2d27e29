//! Adamic-Adar similarity.
//!
//! Sums `1 / ln(degree(z))` over the common neighbours `z` of a pair.
//! Rare shared neighbours contribute more than well-connected hubs.
//! Common neighbours of degree 0 or 1 are skipped, since their log
//! degree is undefined or zero.

use std::sync::OnceLock;

use astral_common::Result;
use astral_core::{GraphStore, Schema};

use super::{
    common_parameters, ensure_not_cancelled, neighbourhoods, outcome_message, score_pairs,
    write_scores, PairScore, SimilarityOptions,
};
use crate::params::{ParameterDef, Parameters};
use crate::traits::{GraphPlugin, Interaction, PluginOutcome};

/// Computes Adamic-Adar scores for every qualifying vertex pair.
pub fn adamic_adar_scores(
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
                    (degree > 1).then(|| 1.0 / (degree as f64).ln())
                })
                .sum()
        },
    ))
}

fn parameters() -> &'static [ParameterDef] {
    static PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();
    PARAMS.get_or_init(common_parameters)
}

/// The Adamic-Adar similarity plugin.
#[derive(Debug)]
pub struct AdamicAdarPlugin;

impl GraphPlugin for AdamicAdarPlugin {
    fn name(&self) -> &str {
        "similarity.adamic_adar"
    }

    fn label(&self) -> &str {
        "Adamic-Adar Index"
    }

    fn description(&self) -> &str {
        "Scores vertex pairs by their common neighbours, weighting rare neighbours higher"
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
        let scores = adamic_adar_scores(store, &options)?;
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
    use super::super::test_graphs::{analytic_store, shared_neighbour_graph};
    use super::*;

    #[test]
    fn test_shared_neighbour_degrees_weight_the_score() {
        // a and b share c; c also connects to two leaves, so degree(c) = 4.
        let (store, _schema) = analytic_store();
        let a = store.add_vertex();
        let b = store.add_vertex();
        let c = store.add_vertex();
        store.add_transaction(a, c, false).unwrap();
        store.add_transaction(b, c, false).unwrap();
        for _ in 0..2 {
            let leaf = store.add_vertex();
            store.add_transaction(c, leaf, false).unwrap();
        }

        let options = SimilarityOptions {
            minimum_common_features: 1,
            ..SimilarityOptions::default()
        };
        let scores = adamic_adar_scores(&store, &options).unwrap();
        let pair = scores
            .iter()
            .find(|p| p.source == a.min(b) && p.destination == a.max(b))
            .unwrap();
        assert!((pair.score - 1.0 / 4.0f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_degree_one_neighbours_are_skipped() {
        // Every shared neighbour has degree 2 here, so none are skipped;
        // with min_common 3 the pair still scores.
        let (store, _schema, _a, _b) = shared_neighbour_graph(3, 0);
        let scores = adamic_adar_scores(&store, &SimilarityOptions::default()).unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores[0].score - 3.0 / 2.0f64.ln()).abs() < 1e-9);
    }
}
