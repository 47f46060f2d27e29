//! Similarity plugins.
//!
//! Each plugin scores vertex pairs by how alike their neighbourhoods are
//! (or their attribute values, for Levenshtein) and records the scores as
//! undirected transactions of type `"similarity"` carrying the score in
//! the `similarity` attribute. Re-running a plugin overwrites the score
//! on the existing similarity transaction instead of stacking new ones.
//!
//! Neighbourhoods never include the vertex itself, and transactions
//! written by earlier similarity runs are ignored, so repeated runs are
//! stable.

mod adamic_adar;
mod cosine;
mod dice;
mod jaccard;
mod levenshtein;
mod resource_allocation;

pub use adamic_adar::{adamic_adar_scores, AdamicAdarPlugin};
pub use cosine::{cosine_scores, CosineSimilarityPlugin};
pub use dice::{dice_scores, DiceSimilarityPlugin};
pub use jaccard::{jaccard_scores, JaccardSimilarityPlugin};
pub use levenshtein::{levenshtein_scores, LevenshteinPlugin};
pub use resource_allocation::{resource_allocation_scores, ResourceAllocationPlugin};

use astral_common::types::{ElementType, Value, VertexId};
use astral_common::utils::hash::{FxHashMap, FxHashSet};
use astral_common::{Error, Result};
use astral_core::schema::attrs;
use astral_core::{ConnectionMode, GraphStore, Schema};

use crate::params::{ParameterDef, ParameterType, Parameters};
use crate::traits::Interaction;

/// Below this many candidate vertices the parallel path is not worth the
/// fork-join overhead.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 512;

/// One scored vertex pair. `source < destination` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    pub source: VertexId,
    pub destination: VertexId,
    pub score: f64,
}

/// Options shared by the neighbourhood-based similarity plugins.
#[derive(Debug, Clone)]
pub struct SimilarityOptions {
    /// Count directed transactions into a vertex as features.
    pub include_incoming: bool,
    /// Count directed transactions out of a vertex as features.
    pub include_outgoing: bool,
    /// Count undirected transactions as features in both directions.
    pub undirected_bidirectional: bool,
    /// Pairs sharing fewer features than this are not scored. At least 1.
    pub minimum_common_features: usize,
    /// Score only pairs of selected vertices.
    pub selected_only: bool,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            include_incoming: true,
            include_outgoing: true,
            undirected_bidirectional: true,
            minimum_common_features: 3,
            selected_only: false,
        }
    }
}

impl SimilarityOptions {
    /// Reads the common options out of a validated parameter bag.
    pub fn from_params(params: &Parameters) -> Result<Self> {
        let minimum = params.integer("minimum_common_features")?;
        if minimum < 1 {
            return Err(Error::Parameter {
                name: "minimum_common_features".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            include_incoming: params.boolean("include_connections_in")?,
            include_outgoing: params.boolean("include_connections_out")?,
            undirected_bidirectional: params.boolean("treat_undirected_bidirectional")?,
            minimum_common_features: minimum as usize,
            selected_only: params.boolean("selected_only")?,
        })
    }

    fn connection_mode(&self) -> ConnectionMode {
        ConnectionMode {
            outgoing: self.include_outgoing,
            incoming: self.include_incoming,
            undirected: self.undirected_bidirectional,
        }
    }
}

/// The parameter set every neighbourhood-based plugin shares.
pub(crate) fn common_parameters() -> Vec<ParameterDef> {
    vec![
        ParameterDef::new(
            "include_connections_in",
            "Include incoming connections",
            ParameterType::Boolean,
            Value::Bool(true),
        )
        .description("Count directed transactions into a vertex as features"),
        ParameterDef::new(
            "include_connections_out",
            "Include outgoing connections",
            ParameterType::Boolean,
            Value::Bool(true),
        )
        .description("Count directed transactions out of a vertex as features"),
        ParameterDef::new(
            "treat_undirected_bidirectional",
            "Treat undirected bidirectionally",
            ParameterType::Boolean,
            Value::Bool(true),
        )
        .description("Count undirected transactions as features in both directions"),
        ParameterDef::new(
            "minimum_common_features",
            "Minimum common features",
            ParameterType::Integer,
            Value::Int64(3),
        )
        .description("Only score pairs sharing at least this many neighbours"),
        ParameterDef::new(
            "selected_only",
            "Selected only",
            ParameterType::Boolean,
            Value::Bool(false),
        )
        .description("Only score pairs of selected vertices"),
    ]
}

/// Candidate vertices and the feature set of every vertex.
///
/// Feature sets are built for all vertices so scorers can look up the
/// degree of a common neighbour even when it is not a candidate.
pub(crate) struct Neighbourhoods {
    pub candidates: Vec<VertexId>,
    pub sets: FxHashMap<VertexId, FxHashSet<VertexId>>,
}

pub(crate) fn neighbourhoods(
    store: &GraphStore,
    options: &SimilarityOptions,
) -> Result<Neighbourhoods> {
    let mode = options.connection_mode();
    let type_attr = store.require_attribute(ElementType::Transaction, attrs::TYPE)?;
    let all = store.vertex_ids();

    let mut sets: FxHashMap<VertexId, FxHashSet<VertexId>> = FxHashMap::default();
    for &v in &all {
        let mut set = FxHashSet::default();
        for (w, t) in store.adjacent(v, mode) {
            if w == v || is_similarity_transaction(store, type_attr, t)? {
                continue;
            }
            set.insert(w);
        }
        sets.insert(v, set);
    }

    let candidates = if options.selected_only {
        selected_vertices(store, &all)?
    } else {
        all
    };
    Ok(Neighbourhoods { candidates, sets })
}

/// Like [`neighbourhoods`], but each feature carries a weight: the number
/// of qualifying transactions to that neighbour.
pub(crate) fn weighted_neighbourhoods(
    store: &GraphStore,
    options: &SimilarityOptions,
) -> Result<(Vec<VertexId>, FxHashMap<VertexId, FxHashMap<VertexId, f64>>)> {
    let mode = options.connection_mode();
    let type_attr = store.require_attribute(ElementType::Transaction, attrs::TYPE)?;
    let all = store.vertex_ids();

    let mut weights: FxHashMap<VertexId, FxHashMap<VertexId, f64>> = FxHashMap::default();
    for &v in &all {
        let mut per_neighbour: FxHashMap<VertexId, f64> = FxHashMap::default();
        for (w, t) in store.adjacent(v, mode) {
            if w == v || is_similarity_transaction(store, type_attr, t)? {
                continue;
            }
            *per_neighbour.entry(w).or_insert(0.0) += 1.0;
        }
        weights.insert(v, per_neighbour);
    }

    let candidates = if options.selected_only {
        selected_vertices(store, &all)?
    } else {
        all
    };
    Ok((candidates, weights))
}

fn is_similarity_transaction(
    store: &GraphStore,
    type_attr: astral_core::AttributeId,
    t: astral_common::types::TransactionId,
) -> Result<bool> {
    Ok(store
        .transaction_value(type_attr, t)?
        .as_str()
        .map_or(false, |s| s == attrs::TYPE_SIMILARITY))
}

pub(crate) fn selected_vertices(store: &GraphStore, all: &[VertexId]) -> Result<Vec<VertexId>> {
    let selected = store.require_attribute(ElementType::Vertex, attrs::SELECTED)?;
    let mut out = Vec::new();
    for &v in all {
        if store.vertex_value(selected, v)? == Value::Bool(true) {
            out.push(v);
        }
    }
    Ok(out)
}

/// Scores every unordered candidate pair whose feature sets share at
/// least `minimum_common_features` elements. The scorer sees both sets
/// and the shared elements; pairs scoring zero are dropped.
pub(crate) fn score_pairs<F>(
    neighbourhoods: &Neighbourhoods,
    minimum_common_features: usize,
    scorer: F,
) -> Vec<PairScore>
where
    F: Fn(&FxHashSet<VertexId>, &FxHashSet<VertexId>, &[VertexId]) -> f64 + Sync,
{
    #[cfg(feature = "parallel")]
    if neighbourhoods.candidates.len() >= PARALLEL_THRESHOLD {
        return score_pairs_parallel(neighbourhoods, minimum_common_features, scorer);
    }
    let candidates = &neighbourhoods.candidates;
    let mut out = Vec::new();
    for (i, &a) in candidates.iter().enumerate() {
        for &b in &candidates[i + 1..] {
            if let Some(pair) =
                score_one_pair(neighbourhoods, a, b, minimum_common_features, &scorer)
            {
                out.push(pair);
            }
        }
    }
    out
}

#[cfg(feature = "parallel")]
fn score_pairs_parallel<F>(
    neighbourhoods: &Neighbourhoods,
    minimum_common_features: usize,
    scorer: F,
) -> Vec<PairScore>
where
    F: Fn(&FxHashSet<VertexId>, &FxHashSet<VertexId>, &[VertexId]) -> f64 + Sync,
{
    use rayon::prelude::*;

    let candidates = &neighbourhoods.candidates;
    candidates
        .par_iter()
        .enumerate()
        .flat_map_iter(|(i, &a)| {
            let scorer = &scorer;
            candidates[i + 1..].iter().filter_map(move |&b| {
                score_one_pair(neighbourhoods, a, b, minimum_common_features, scorer)
            })
        })
        .collect()
}

fn score_one_pair<F>(
    neighbourhoods: &Neighbourhoods,
    a: VertexId,
    b: VertexId,
    minimum_common_features: usize,
    scorer: &F,
) -> Option<PairScore>
where
    F: Fn(&FxHashSet<VertexId>, &FxHashSet<VertexId>, &[VertexId]) -> f64 + Sync,
{
    let a_set = neighbourhoods.sets.get(&a)?;
    let b_set = neighbourhoods.sets.get(&b)?;
    let common: Vec<VertexId> = a_set.intersection(b_set).copied().collect();
    if common.len() < minimum_common_features {
        return None;
    }
    let score = scorer(a_set, b_set, &common);
    (score > 0.0).then_some(PairScore {
        source: a.min(b),
        destination: a.max(b),
        score,
    })
}

/// Writes scores onto similarity transactions.
///
/// Each pair gets one undirected transaction of type `"similarity"`; an
/// existing one is reused and its score overwritten. Returns how many
/// transactions were created and how many updated.
pub(crate) fn write_scores(
    store: &GraphStore,
    schema: &Schema,
    scores: &[PairScore],
) -> Result<(usize, usize)> {
    let type_attr = store.require_attribute(ElementType::Transaction, attrs::TYPE)?;
    let score_attr = store.require_attribute(ElementType::Transaction, attrs::SIMILARITY)?;

    let mut created = 0;
    let mut modified = 0;
    for pair in scores {
        let existing = store
            .transactions_between(pair.source, pair.destination)
            .into_iter()
            .find(|&t| {
                store
                    .transaction_value(type_attr, t)
                    .ok()
                    .and_then(|v| v.as_str().map(|s| s == attrs::TYPE_SIMILARITY))
                    .unwrap_or(false)
            });
        let t = match existing {
            Some(t) => {
                modified += 1;
                t
            }
            None => {
                let t = store.add_transaction(pair.source, pair.destination, false)?;
                store.set_transaction_value(
                    type_attr,
                    t,
                    Value::String(attrs::TYPE_SIMILARITY.into()),
                )?;
                schema.new_transaction(store, t)?;
                created += 1;
                t
            }
        };
        store.set_transaction_value(score_attr, t, Value::Float64(pair.score))?;
        schema.complete_transaction(store, t)?;
    }
    Ok((created, modified))
}

pub(crate) fn outcome_message(label: &str, scored: usize, created: usize) -> String {
    format!("{label} scored {scored} vertex pairs ({created} new similarity transactions)")
}

/// Polled between execution phases; a cancelled interaction stops the
/// run before any further graph writes.
pub(crate) fn ensure_not_cancelled(interaction: &dyn Interaction) -> Result<()> {
    if interaction.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_graphs {
    use astral_core::schema::AnalyticSchemaFactory;
    use astral_core::SchemaFactory;

    use super::*;

    pub fn analytic_store() -> (GraphStore, Schema) {
        let store = GraphStore::new();
        let schema = AnalyticSchemaFactory.create_schema();
        schema.new_graph(&store).unwrap();
        (store, schema)
    }

    /// Two hub vertices sharing `shared` neighbours, plus `extra_a`
    /// neighbours only on the first hub.
    pub fn shared_neighbour_graph(
        shared: usize,
        extra_a: usize,
    ) -> (GraphStore, Schema, VertexId, VertexId) {
        let (store, schema) = analytic_store();
        let a = store.add_vertex();
        let b = store.add_vertex();
        for _ in 0..shared {
            let n = store.add_vertex();
            store.add_transaction(a, n, false).unwrap();
            store.add_transaction(b, n, false).unwrap();
        }
        for _ in 0..extra_a {
            let n = store.add_vertex();
            store.add_transaction(a, n, false).unwrap();
        }
        (store, schema, a, b)
    }

    pub fn select(store: &GraphStore, vs: &[VertexId]) {
        let selected = store
            .attribute_id(ElementType::Vertex, attrs::SELECTED)
            .unwrap();
        for &v in vs {
            store.set_vertex_value(selected, v, Value::Bool(true)).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_graphs::*;
    use super::*;

    #[test]
    fn test_neighbourhoods_exclude_loops_and_similarity() {
        let (store, schema) = analytic_store();
        let a = store.add_vertex();
        let b = store.add_vertex();
        let c = store.add_vertex();
        store.add_transaction(a, b, false).unwrap();
        store.add_transaction(a, a, false).unwrap();

        // A similarity transaction from an earlier run must not count.
        let t = store.add_transaction(a, c, false).unwrap();
        let type_attr = store
            .attribute_id(ElementType::Transaction, attrs::TYPE)
            .unwrap();
        store
            .set_transaction_value(type_attr, t, Value::String(attrs::TYPE_SIMILARITY.into()))
            .unwrap();
        schema.complete_graph(&store).unwrap();

        let hoods = neighbourhoods(&store, &SimilarityOptions::default()).unwrap();
        let a_set = &hoods.sets[&a];
        assert!(a_set.contains(&b));
        assert!(!a_set.contains(&a));
        assert!(!a_set.contains(&c));
    }

    #[test]
    fn test_minimum_common_features_gates_pairs() {
        let (store, _schema, _a, _b) = shared_neighbour_graph(2, 0);
        let hoods = neighbourhoods(&store, &SimilarityOptions::default()).unwrap();

        let scores = score_pairs(&hoods, 3, |_, _, common| common.len() as f64);
        assert!(scores.is_empty());

        let scores = score_pairs(&hoods, 2, |_, _, common| common.len() as f64);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 2.0);
    }

    #[test]
    fn test_selected_only_restricts_candidates() {
        let (store, _schema, a, b) = shared_neighbour_graph(3, 0);
        select(&store, &[a]);

        let options = SimilarityOptions {
            selected_only: true,
            ..SimilarityOptions::default()
        };
        let hoods = neighbourhoods(&store, &options).unwrap();
        assert_eq!(hoods.candidates, vec![a]);
        assert!(!hoods.candidates.contains(&b));
    }

    #[test]
    fn test_write_scores_reuses_existing_transaction() {
        let (store, schema, a, b) = shared_neighbour_graph(3, 0);
        let scores = vec![PairScore {
            source: a,
            destination: b,
            score: 0.5,
        }];

        let (created, modified) = write_scores(&store, &schema, &scores).unwrap();
        assert_eq!((created, modified), (1, 0));
        let before = store.transaction_count();

        let rescored = vec![PairScore {
            source: a,
            destination: b,
            score: 0.75,
        }];
        let (created, modified) = write_scores(&store, &schema, &rescored).unwrap();
        assert_eq!((created, modified), (0, 1));
        assert_eq!(store.transaction_count(), before);

        let score_attr = store
            .attribute_id(ElementType::Transaction, attrs::SIMILARITY)
            .unwrap();
        let t = store
            .transactions_between(a, b)
            .into_iter()
            .last()
            .unwrap();
        assert_eq!(
            store.transaction_value(score_attr, t).unwrap(),
            Value::Float64(0.75)
        );
    }

    #[test]
    fn test_options_from_params_validates_minimum() {
        let mut params = Parameters::new();
        params.merge_defaults(&common_parameters());
        params.set("minimum_common_features", 0i64);
        assert!(SimilarityOptions::from_params(&params).is_err());
    }
}
