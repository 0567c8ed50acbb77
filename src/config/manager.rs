use super::{
    data::{DataConfig, RateFileConfig},
    export::ExportConfig,
    metrics::MetricsConfig,
    portfolio::PortfolioConfig,
    traits::ConfigSection,
};
use crate::error::RiskError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `RISKPANEL__METRICS__CONFIDENCE=0.99`
pub const ENV_PREFIX: &str = "RISKPANEL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub rates: RateFileConfig,
    pub metrics: MetricsConfig,
    pub portfolio: PortfolioConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), RiskError> {
        self.data.validate()?;
        self.rates.validate()?;
        self.metrics.validate()?;
        self.portfolio.validate()?;
        self.export.validate()?;
        Ok(())
    }

    /// Load a config file layered with `RISKPANEL__*` environment overrides.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RiskError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, RiskError> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|e| RiskError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RiskError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| RiskError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| RiskError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}
