//! Engine configuration.

use astral_common::{Error, Result};
use astral_core::StoreConfig;

/// Configuration for an [`AstralDB`](crate::AstralDB).
#[derive(Debug, Clone)]
pub struct Config {
    /// Maintain the reverse adjacency index. Costs memory, makes incoming
    /// neighbour queries O(degree) instead of a transaction scan.
    pub backward_edges: bool,
    /// Initial capacity of the vertex set.
    pub initial_vertex_capacity: usize,
    /// Initial capacity of the transaction table.
    pub initial_transaction_capacity: usize,
    /// How many plugin run reports each graph keeps.
    pub report_history: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backward_edges: true,
            initial_vertex_capacity: 1024,
            initial_transaction_capacity: 4096,
            report_history: astral_plugins::report::DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Checks the configuration for nonsense values.
    pub fn validate(&self) -> Result<()> {
        if self.initial_vertex_capacity == 0 {
            return Err(Error::Config(
                "initial_vertex_capacity must be greater than zero".to_string(),
            ));
        }
        if self.initial_transaction_capacity == 0 {
            return Err(Error::Config(
                "initial_transaction_capacity must be greater than zero".to_string(),
            ));
        }
        if self.report_history == 0 {
            return Err(Error::Config(
                "report_history must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn store_config(&self) -> StoreConfig {
        StoreConfig {
            backward_edges: self.backward_edges,
            initial_vertex_capacity: self.initial_vertex_capacity,
            initial_transaction_capacity: self.initial_transaction_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacities_rejected() {
        let config = Config {
            initial_vertex_capacity: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            initial_transaction_capacity: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            report_history: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
