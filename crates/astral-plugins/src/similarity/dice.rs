//! Sorensen-Dice similarity.
//!
//! `2 * |A intersect B| / (|A| + |B|)`. Weighs shared neighbours more
//! generously than Jaccard for pairs with large neighbourhoods.

use std::sync::OnceLock;

use astral_common::Result;
use astral_core::{GraphStore, Schema};

use super::{
    common_parameters, ensure_not_cancelled, neighbourhoods, outcome_message, score_pairs,
    write_scores, PairScore, SimilarityOptions,
};
use crate::params::{ParameterDef, Parameters};
use crate::traits::{GraphPlugin, Interaction, PluginOutcome};

/// Computes Dice scores for every qualifying vertex pair.
pub fn dice_scores(store: &GraphStore, options: &SimilarityOptions) -> Result<Vec<PairScore>> {
    let hoods = neighbourhoods(store, options)?;
    Ok(score_pairs(
        &hoods,
        options.minimum_common_features,
        |a, b, common| {
            let total = a.len() + b.len();
            if total == 0 {
                0.0
            } else {
                2.0 * common.len() as f64 / total as f64
            }
        },
    ))
}

fn parameters() -> &'static [ParameterDef] {
    static PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();
    PARAMS.get_or_init(common_parameters)
}

/// The Sorensen-Dice similarity plugin.
#[derive(Debug)]
pub struct DiceSimilarityPlugin;

impl GraphPlugin for DiceSimilarityPlugin {
    fn name(&self) -> &str {
        "similarity.dice"
    }

    fn label(&self) -> &str {
        "Dice Similarity"
    }

    fn description(&self) -> &str {
        "Scores vertex pairs with the Sorensen-Dice coefficient of their neighbourhoods"
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
        let scores = dice_scores(store, &options)?;
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
    fn test_dice_exceeds_jaccard_on_partial_overlap() {
        // 3 shared, 1 extra on a: Dice = 6/7, Jaccard would be 3/4.
        let (store, _schema, _a, _b) = shared_neighbour_graph(3, 1);
        let scores = dice_scores(&store, &SimilarityOptions::default()).unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores[0].score - 6.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_neighbourhoods_score_one() {
        let (store, _schema, _a, _b) = shared_neighbour_graph(4, 0);
        let scores = dice_scores(&store, &SimilarityOptions::default()).unwrap();
        assert_eq!(scores[0].score, 1.0);
    }
}
