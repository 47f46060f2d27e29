//! Cosine similarity.
//!
//! Treats each vertex as a vector over its neighbours, weighted by the
//! number of qualifying transactions to each one, and scores a pair by
//! the cosine of the angle between the two vectors. Parallel transactions
//! therefore strengthen a feature where the set-based measures ignore
//! them.

use std::sync::OnceLock;

use astral_common::Result;
use astral_core::{GraphStore, Schema};

use super::{
    common_parameters, ensure_not_cancelled, outcome_message, weighted_neighbourhoods,
    write_scores, PairScore, SimilarityOptions,
};
use crate::params::{ParameterDef, Parameters};
use crate::traits::{GraphPlugin, Interaction, PluginOutcome};

/// Computes cosine scores for every qualifying vertex pair.
pub fn cosine_scores(store: &GraphStore, options: &SimilarityOptions) -> Result<Vec<PairScore>> {
    let (candidates, weights) = weighted_neighbourhoods(store, options)?;

    let mut out = Vec::new();
    for (i, &a) in candidates.iter().enumerate() {
        let Some(a_weights) = weights.get(&a) else {
            continue;
        };
        let a_norm: f64 = a_weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if a_norm == 0.0 {
            continue;
        }
        for &b in &candidates[i + 1..] {
            let Some(b_weights) = weights.get(&b) else {
                continue;
            };
            let mut dot = 0.0;
            let mut common = 0usize;
            for (neighbour, a_weight) in a_weights {
                if let Some(b_weight) = b_weights.get(neighbour) {
                    dot += a_weight * b_weight;
                    common += 1;
                }
            }
            if common < options.minimum_common_features {
                continue;
            }
            let b_norm: f64 = b_weights.values().map(|w| w * w).sum::<f64>().sqrt();
            if b_norm == 0.0 {
                continue;
            }
            let score = dot / (a_norm * b_norm);
            if score > 0.0 {
                out.push(PairScore {
                    source: a.min(b),
                    destination: a.max(b),
                    score,
                });
            }
        }
    }
    Ok(out)
}

fn parameters() -> &'static [ParameterDef] {
    static PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();
    PARAMS.get_or_init(common_parameters)
}

/// The cosine similarity plugin.
#[derive(Debug)]
pub struct CosineSimilarityPlugin;

impl GraphPlugin for CosineSimilarityPlugin {
    fn name(&self) -> &str {
        "similarity.cosine"
    }

    fn label(&self) -> &str {
        "Cosine Similarity"
    }

    fn description(&self) -> &str {
        "Scores vertex pairs as weighted neighbour vectors, counting parallel transactions"
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
        let scores = cosine_scores(store, &options)?;
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
    use super::super::test_graphs::analytic_store;
    use super::*;

    #[test]
    fn test_colinear_vectors_score_one() {
        // a connects to c twice, b once: same direction, different length.
        let (store, _schema) = analytic_store();
        let a = store.add_vertex();
        let b = store.add_vertex();
        let c = store.add_vertex();
        store.add_transaction(a, c, false).unwrap();
        store.add_transaction(a, c, false).unwrap();
        store.add_transaction(b, c, false).unwrap();

        let options = SimilarityOptions {
            minimum_common_features: 1,
            ..SimilarityOptions::default()
        };
        let scores = cosine_scores(&store, &options).unwrap();
        let pair = scores
            .iter()
            .find(|p| p.source == a.min(b) && p.destination == a.max(b))
            .unwrap();
        assert!((pair.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_half_overlap_scores_half() {
        // a: {c, d}, b: {c, e}, all weight 1: cos = 1 / (sqrt(2)*sqrt(2)).
        let (store, _schema) = analytic_store();
        let a = store.add_vertex();
        let b = store.add_vertex();
        let c = store.add_vertex();
        let d = store.add_vertex();
        let e = store.add_vertex();
        store.add_transaction(a, c, false).unwrap();
        store.add_transaction(a, d, false).unwrap();
        store.add_transaction(b, c, false).unwrap();
        store.add_transaction(b, e, false).unwrap();

        let options = SimilarityOptions {
            minimum_common_features: 1,
            ..SimilarityOptions::default()
        };
        let scores = cosine_scores(&store, &options).unwrap();
        let pair = scores
            .iter()
            .find(|p| p.source == a.min(b) && p.destination == a.max(b))
            .unwrap();
        assert!((pair.score - 0.5).abs() < 1e-9);
    }
}
