//! Levenshtein similarity.
//!
//! Unlike the neighbourhood measures, this one compares a string
//! attribute (the identifier by default) and links vertices whose values
//! are within a configured edit distance. The distance itself is written
//! as the score, so 0.0 means identical values.

use std::sync::OnceLock;

use astral_common::types::{ElementType, Value, VertexId};
use astral_common::utils::strings::levenshtein_distance;
use astral_common::{Error, Result};
use astral_core::{GraphStore, Schema};

use super::{ensure_not_cancelled, outcome_message, selected_vertices, write_scores, PairScore};
use crate::params::{ParameterDef, ParameterType, Parameters};
use crate::traits::{GraphPlugin, Interaction, PluginOutcome};

/// Options for the Levenshtein comparison.
#[derive(Debug, Clone)]
pub struct LevenshteinOptions {
    /// Vertex attribute whose values are compared.
    pub attribute: String,
    /// Pairs further apart than this are not linked.
    pub max_distance: usize,
    /// Lowercase both values before comparing.
    pub case_insensitive: bool,
    /// Compare only selected vertices.
    pub selected_only: bool,
}

impl Default for LevenshteinOptions {
    fn default() -> Self {
        Self {
            attribute: "identifier".to_string(),
            max_distance: 1,
            case_insensitive: true,
            selected_only: false,
        }
    }
}

impl LevenshteinOptions {
    pub fn from_params(params: &Parameters) -> Result<Self> {
        let max_distance = params.integer("max_distance")?;
        if max_distance < 0 {
            return Err(Error::Parameter {
                name: "max_distance".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        Ok(Self {
            attribute: params.string("attribute")?.to_string(),
            max_distance: max_distance as usize,
            case_insensitive: params.boolean("case_insensitive")?,
            selected_only: params.boolean("selected_only")?,
        })
    }
}

/// Scores vertex pairs by the edit distance of an attribute value.
/// Vertices with a null or empty value are skipped.
pub fn levenshtein_scores(
    store: &GraphStore,
    options: &LevenshteinOptions,
) -> Result<Vec<PairScore>> {
    let attr = store.require_attribute(ElementType::Vertex, &options.attribute)?;
    let all = store.vertex_ids();
    let candidates = if options.selected_only {
        selected_vertices(store, &all)?
    } else {
        all
    };

    let mut values: Vec<(VertexId, String, usize)> = Vec::with_capacity(candidates.len());
    for v in candidates {
        if let Value::String(s) = store.vertex_value(attr, v)? {
            if !s.is_empty() {
                let text = if options.case_insensitive {
                    s.to_lowercase()
                } else {
                    s.to_string()
                };
                let chars = text.chars().count();
                values.push((v, text, chars));
            }
        }
    }

    let mut out = Vec::new();
    for (i, (a, a_text, a_chars)) in values.iter().enumerate() {
        for (b, b_text, b_chars) in &values[i + 1..] {
            // Length difference is a lower bound on the distance.
            if a_chars.abs_diff(*b_chars) > options.max_distance {
                continue;
            }
            let distance = levenshtein_distance(a_text, b_text);
            if distance <= options.max_distance {
                out.push(PairScore {
                    source: *a.min(b),
                    destination: *a.max(b),
                    score: distance as f64,
                });
            }
        }
    }
    Ok(out)
}

fn parameters() -> &'static [ParameterDef] {
    static PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();
    PARAMS.get_or_init(|| {
        vec![
            ParameterDef::new(
                "attribute",
                "Attribute",
                ParameterType::String,
                Value::String("identifier".into()),
            )
            .description("Vertex attribute whose values are compared"),
            ParameterDef::new(
                "max_distance",
                "Maximum distance",
                ParameterType::Integer,
                Value::Int64(1),
            )
            .description("Only link vertices within this edit distance"),
            ParameterDef::new(
                "case_insensitive",
                "Case insensitive",
                ParameterType::Boolean,
                Value::Bool(true),
            )
            .description("Lowercase both values before comparing"),
            ParameterDef::new(
                "selected_only",
                "Selected only",
                ParameterType::Boolean,
                Value::Bool(false),
            )
            .description("Only compare selected vertices"),
        ]
    })
}

/// The Levenshtein similarity plugin.
#[derive(Debug)]
pub struct LevenshteinPlugin;

impl GraphPlugin for LevenshteinPlugin {
    fn name(&self) -> &str {
        "similarity.levenshtein"
    }

    fn label(&self) -> &str {
        "Levenshtein Distance"
    }

    fn description(&self) -> &str {
        "Links vertices whose attribute values are within an edit distance of each other"
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
        let options = LevenshteinOptions::from_params(params)?;
        interaction.set_status("comparing attribute values");
        let scores = levenshtein_scores(store, &options)?;
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
    use astral_core::schema::attrs;

    fn named_vertices(names: &[&str]) -> (GraphStore, Schema, Vec<VertexId>) {
        let (store, schema) = analytic_store();
        let attr = store
            .attribute_id(ElementType::Vertex, attrs::IDENTIFIER)
            .unwrap();
        let vs = names
            .iter()
            .map(|name| {
                let v = store.add_vertex();
                store
                    .set_vertex_value(attr, v, Value::String((*name).into()))
                    .unwrap();
                v
            })
            .collect();
        (store, schema, vs)
    }

    #[test]
    fn test_near_duplicates_are_linked() {
        let (store, _schema, vs) = named_vertices(&["alice", "alicia", "allice", "bob"]);
        let options = LevenshteinOptions {
            max_distance: 2,
            ..LevenshteinOptions::default()
        };
        let scores = levenshtein_scores(&store, &options).unwrap();

        // alice-allice distance 1, alice-alicia distance 2; bob matches nothing.
        assert!(scores
            .iter()
            .any(|p| p.source == vs[0].min(vs[2]) && p.score == 1.0));
        assert!(scores
            .iter()
            .any(|p| p.source == vs[0].min(vs[1]) && p.score == 2.0));
        assert!(!scores.iter().any(|p| p.source == vs[3] || p.destination == vs[3]));
    }

    #[test]
    fn test_case_sensitivity() {
        let (store, _schema, _vs) = named_vertices(&["Alice", "alice"]);

        let insensitive = levenshtein_scores(
            &store,
            &LevenshteinOptions {
                max_distance: 0,
                ..LevenshteinOptions::default()
            },
        )
        .unwrap();
        assert_eq!(insensitive.len(), 1);
        assert_eq!(insensitive[0].score, 0.0);

        let sensitive = levenshtein_scores(
            &store,
            &LevenshteinOptions {
                max_distance: 0,
                case_insensitive: false,
                ..LevenshteinOptions::default()
            },
        )
        .unwrap();
        assert!(sensitive.is_empty());
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let (store, _schema, _vs) = named_vertices(&["alice", ""]);
        let v = store.add_vertex(); // identifier stays null
        let _ = v;
        let scores =
            levenshtein_scores(&store, &LevenshteinOptions::default()).unwrap();
        assert!(scores.is_empty());
    }
}
