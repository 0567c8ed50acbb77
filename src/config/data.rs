use super::traits::ConfigSection;
use crate::error::RiskError;
use serde::{Deserialize, Serialize};

/// What to do with cells missing from the downloaded price table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingDataPolicy {
    /// Carry the last known price forward; leading gaps drop their rows
    #[default]
    ForwardFill,
    /// Drop every date on which any asset is missing
    DropRows,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Date column name; detected from common aliases when unset
    pub date_column: Option<String>,
    /// Suffix removed from ticker columns, e.g. ".SA"
    pub ticker_suffix: Option<String>,
    pub missing: MissingDataPolicy,
    pub min_observations: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            date_column: None,
            ticker_suffix: None,
            missing: MissingDataPolicy::ForwardFill,
            min_observations: 2,
        }
    }
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<(), RiskError> {
        if self.min_observations < 2 {
            return Err(RiskError::Configuration(
                "At least 2 observations are needed to form returns".to_string()
            ));
        }
        Ok(())
    }
}

/// Layout of a daily risk-free factor file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateFileConfig {
    pub separator: char,
    pub skip_rows: usize,
    /// Substring identifying the date column
    pub date_column_hint: String,
    /// Substring identifying the daily factor column
    pub factor_column_hint: String,
    pub decimal_comma: bool,
}

impl Default for RateFileConfig {
    fn default() -> Self {
        Self {
            separator: ',',
            skip_rows: 0,
            date_column_hint: "date".to_string(),
            factor_column_hint: "factor".to_string(),
            decimal_comma: false,
        }
    }
}

impl RateFileConfig {
    /// Layout of the DI PRE/OVER export: tab separated with a metadata preamble
    pub fn di_pre_over() -> Self {
        Self {
            separator: '\t',
            skip_rows: 38,
            date_column_hint: "Data".to_string(),
            factor_column_hint: "Fator".to_string(),
            decimal_comma: true,
        }
    }
}

impl ConfigSection for RateFileConfig {
    fn section_name() -> &'static str {
        "rates"
    }

    fn validate(&self) -> Result<(), RiskError> {
        if !self.separator.is_ascii() {
            return Err(RiskError::Configuration(
                "Rate file separator must be ASCII".to_string()
            ));
        }
        if self.date_column_hint.is_empty() || self.factor_column_hint.is_empty() {
            return Err(RiskError::Configuration(
                "Rate file column hints must not be empty".to_string()
            ));
        }
        Ok(())
    }
}
