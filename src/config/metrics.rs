use super::traits::ConfigSection;
use crate::error::RiskError;
use crate::types::ReturnKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Annual risk-free rate, de-annualized per period
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
    pub confidence: f64,
    pub rolling_window: usize,
    pub return_kind: ReturnKind,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            periods_per_year: 252.0,
            confidence: 0.95,
            rolling_window: 252,
            return_kind: ReturnKind::Simple,
        }
    }
}

impl ConfigSection for MetricsConfig {
    fn section_name() -> &'static str {
        "metrics"
    }

    fn validate(&self) -> Result<(), RiskError> {
        if !self.risk_free_rate.is_finite() {
            return Err(RiskError::Configuration(
                "Risk-free rate must be finite".to_string()
            ));
        }
        if !(self.periods_per_year > 0.0) || !self.periods_per_year.is_finite() {
            return Err(RiskError::Configuration(
                "Periods per year must be positive".to_string()
            ));
        }
        if self.confidence <= 0.0 || self.confidence >= 1.0 {
            return Err(RiskError::Configuration(
                "Confidence must be between 0 and 1".to_string()
            ));
        }
        if self.rolling_window < 2 {
            return Err(RiskError::Configuration(
                "Rolling window must cover at least 2 observations".to_string()
            ));
        }
        Ok(())
    }
}
