use super::traits::ConfigSection;
use crate::error::RiskError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Allowed distance of the weight total from 1.0
    pub weight_tolerance: f64,
    pub initial_value: f64,
    /// Named allocations compared side by side, strategy -> asset -> weight
    pub strategies: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            weight_tolerance: 1e-6,
            initial_value: 100_000.0,
            strategies: BTreeMap::new(),
        }
    }
}

impl ConfigSection for PortfolioConfig {
    fn section_name() -> &'static str {
        "portfolio"
    }

    fn validate(&self) -> Result<(), RiskError> {
        if !(self.weight_tolerance >= 0.0) || self.weight_tolerance >= 1.0 {
            return Err(RiskError::Configuration(
                "Weight tolerance must be in [0, 1)".to_string()
            ));
        }
        if !(self.initial_value > 0.0) || !self.initial_value.is_finite() {
            return Err(RiskError::Configuration(
                "Initial portfolio value must be positive".to_string()
            ));
        }
        for (name, weights) in &self.strategies {
            if weights.is_empty() {
                return Err(RiskError::Configuration(format!(
                    "Strategy '{}' has no weights",
                    name
                )));
            }
        }
        Ok(())
    }
}
