//! Jaccard similarity.
//!
//! Scores a vertex pair by the overlap of their neighbourhoods:
//! `|A intersect B| / |A union B|`. 1.0 means identical neighbourhoods.

use std::sync::OnceLock;

use astral_common::Result;
use astral_core::{GraphStore, Schema};

use super::{
    common_parameters, ensure_not_cancelled, neighbourhoods, outcome_message, score_pairs,
    write_scores, PairScore, SimilarityOptions,
};
use crate::params::{ParameterDef, Parameters};
use crate::traits::{GraphPlugin, Interaction, PluginOutcome};

/// Computes Jaccard scores for every qualifying vertex pair.
pub fn jaccard_scores(
    store: &GraphStore,
    options: &SimilarityOptions,
) -> Result<Vec<PairScore>> {
    let hoods = neighbourhoods(store, options)?;
    Ok(score_pairs(
        &hoods,
        options.minimum_common_features,
        |a, b, common| {
            let union = a.len() + b.len() - common.len();
            if union == 0 {
                0.0
            } else {
                common.len() as f64 / union as f64
            }
        },
    ))
}

fn parameters() -> &'static [ParameterDef] {
    static PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();
    PARAMS.get_or_init(common_parameters)
}

/// The Jaccard similarity plugin.
#[derive(Debug)]
pub struct JaccardSimilarityPlugin;

impl GraphPlugin for JaccardSimilarityPlugin {
    fn name(&self) -> &str {
        "similarity.jaccard"
    }

    fn label(&self) -> &str {
        "Jaccard Similarity"
    }

    fn description(&self) -> &str {
        "Scores vertex pairs by the proportion of neighbours they share"
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
        let scores = jaccard_scores(store, &options)?;
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
