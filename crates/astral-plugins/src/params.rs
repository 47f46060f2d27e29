//! Plugin parameter declarations and bags.

use arcstr::ArcStr;
use astral_common::types::Value;
use astral_common::utils::hash::FxHashMap;
use astral_common::utils::strings::{find_similar, format_suggestion};
use astral_common::{Error, Result};

/// The value type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    Boolean,
    Integer,
    Float,
    String,
}

impl ParameterType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
        }
    }

    const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Boolean, Value::Bool(_))
                | (Self::Integer, Value::Int64(_))
                | (Self::Float, Value::Float64(_) | Value::Int64(_))
                | (Self::String, Value::String(_))
        )
    }
}

/// One declared parameter of a plugin.
#[derive(Debug, Clone)]
pub struct ParameterDef {
    name: ArcStr,
    label: ArcStr,
    description: ArcStr,
    param_type: ParameterType,
    default: Value,
}

impl ParameterDef {
    #[must_use]
    pub fn new(name: &str, label: &str, param_type: ParameterType, default: Value) -> Self {
        Self {
            name: ArcStr::from(name),
            label: ArcStr::from(label),
            description: ArcStr::new(),
            param_type,
            default,
        }
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = ArcStr::from(description);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn describe(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn param_type(&self) -> ParameterType {
        self.param_type
    }

    #[must_use]
    pub const fn default(&self) -> &Value {
        &self.default
    }
}

/// A bag of parameter values passed to a plugin run.
///
/// Callers set what they want to override, then the runner merges the
/// plugin's declared defaults and validates the result.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    values: FxHashMap<ArcStr, Value>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous one.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(ArcStr::from(name), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(&ArcStr::from(name))
    }

    /// Fills in declared defaults for every parameter not already set.
    pub fn merge_defaults(&mut self, defs: &[ParameterDef]) {
        for def in defs {
            self.values
                .entry(def.name.clone())
                .or_insert_with(|| def.default.clone());
        }
    }

    /// Rejects unknown parameter names and type mismatches.
    pub fn validate(&self, defs: &[ParameterDef]) -> Result<()> {
        for (name, value) in &self.values {
            let Some(def) = defs.iter().find(|d| d.name == *name) else {
                let known: Vec<&str> = defs.iter().map(ParameterDef::name).collect();
                let mut reason = "unknown parameter".to_string();
                if let Some(suggestion) = find_similar(name, &known) {
                    reason.push_str(". ");
                    reason.push_str(&format_suggestion(suggestion));
                }
                return Err(Error::Parameter {
                    name: name.to_string(),
                    reason,
                });
            };
            if !def.param_type.accepts(value) {
                return Err(Error::Parameter {
                    name: name.to_string(),
                    reason: format!(
                        "expected a {} value, got {}",
                        def.param_type.name(),
                        value.type_name()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            Some(Value::Bool(b)) => Ok(*b),
            other => Err(type_error(name, "boolean", other)),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(Value::Int64(i)) => Ok(*i),
            other => Err(type_error(name, "integer", other)),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        match self.get(name) {
            Some(Value::Float64(f)) => Ok(*f),
            Some(Value::Int64(i)) => Ok(*i as f64),
            other => Err(type_error(name, "float", other)),
        }
    }

    pub fn string(&self, name: &str) -> Result<ArcStr> {
        match self.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(type_error(name, "string", other)),
        }
    }

    /// The set values, sorted by name. Used when recording a run report.
    #[must_use]
    pub fn entries(&self) -> Vec<(ArcStr, Value)> {
        let mut entries: Vec<(ArcStr, Value)> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

fn type_error(name: &str, expected: &str, got: Option<&Value>) -> Error {
    Error::Parameter {
        name: name.to_string(),
        reason: match got {
            Some(v) => format!("expected a {expected} value, got {}", v.type_name()),
            None => format!("missing {expected} value"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs() -> Vec<ParameterDef> {
        vec![
            ParameterDef::new(
                "selected_only",
                "Selected only",
                ParameterType::Boolean,
                Value::Bool(false),
            ),
            ParameterDef::new(
                "minimum_common_features",
                "Minimum common features",
                ParameterType::Integer,
                Value::Int64(3),
            ),
        ]
    }

    #[test]
    fn test_defaults_fill_missing_values() {
        let mut params = Parameters::new();
        params.set("selected_only", true);
        params.merge_defaults(&defs());

        assert!(params.boolean("selected_only").unwrap());
        assert_eq!(params.integer("minimum_common_features").unwrap(), 3);
    }

    #[test]
    fn test_unknown_name_gets_a_suggestion() {
        let mut params = Parameters::new();
        params.set("selected_onyl", true);
        let err = params.validate(&defs()).unwrap_err();
        assert!(err.to_string().contains("selected_only"));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut params = Parameters::new();
        params.set("minimum_common_features", "three");
        assert!(params.validate(&defs()).is_err());
    }

    #[test]
    fn test_integer_widens_to_float() {
        let mut params = Parameters::new();
        params.set("max_distance", 2i64);
        assert_eq!(params.float("max_distance").unwrap(), 2.0);
    }
}
