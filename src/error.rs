use thiserror::Error;

use crate::types::{Metric, UndefinedReason};

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Insufficient data for {context}: need {required} observations, found {found}")]
    InsufficientData {
        context: String,
        required: usize,
        found: usize,
    },

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Metric {metric} is undefined: {reason}")]
    UndefinedMetric {
        metric: Metric,
        reason: UndefinedReason,
    },

    #[error("Invalid price panel: {0}")]
    InvalidPanel(String),

    #[error("Misaligned series: {0}")]
    Misaligned(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, RiskError>;
