// src/engines/metrics/summary.rs
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};
use crate::types::{Metric, MetricSet, MetricValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetrics {
    pub asset: String,
    pub metrics: MetricSet,
}

/// Assets × nine metrics, produced once per engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    rows: Vec<AssetMetrics>,
}

impl MetricsSummary {
    pub fn new(rows: Vec<AssetMetrics>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AssetMetrics] {
        &self.rows
    }

    pub fn assets(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.asset.as_str()).collect()
    }

    pub fn metrics(&self, asset: &str) -> Option<&MetricSet> {
        self.rows
            .iter()
            .find(|r| r.asset == asset)
            .map(|r| &r.metrics)
    }

    pub fn get(&self, asset: &str, metric: Metric) -> Option<MetricValue> {
        self.metrics(asset).map(|m| m.get(metric))
    }

    /// (asset, metric) pairs that could not be computed
    pub fn undefined_cells(&self) -> Vec<(String, Metric)> {
        self.rows
            .iter()
            .flat_map(|r| {
                r.metrics
                    .undefined()
                    .into_iter()
                    .map(move |m| (r.asset.clone(), m))
            })
            .collect()
    }

    /// One row per asset, one column per metric; undefined cells are null.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(Metric::COUNT + 1);
        columns.push(Column::new("asset".into(), self.assets()));

        for metric in Metric::ALL {
            let values: Vec<Option<f64>> = self
                .rows
                .iter()
                .map(|r| r.metrics.get(metric).value())
                .collect();
            columns.push(Column::new(metric.as_str().into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

const DATE_COLUMN: &str = "date";

/// One metric evaluated on a sliding window for every asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingMetric {
    pub metric: Metric,
    pub window: usize,
    pub dates: Vec<NaiveDate>,
    pub series: Vec<(String, Vec<MetricValue>)>,
}

impl RollingMetric {
    pub fn series(&self, asset: &str) -> Option<&[MetricValue]> {
        self.series
            .iter()
            .find(|(name, _)| name == asset)
            .map(|(_, values)| values.as_slice())
    }

    /// Most recent value per asset
    pub fn latest(&self) -> Vec<(&str, MetricValue)> {
        self.series
            .iter()
            .filter_map(|(name, values)| values.last().map(|v| (name.as_str(), *v)))
            .collect()
    }

    /// Dates down the first column, one column per asset.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        if self.series.iter().any(|(name, _)| name == DATE_COLUMN) {
            return Err(RiskError::InvalidPanel(format!(
                "asset name '{}' clashes with the date column",
                DATE_COLUMN
            )));
        }

        let mut columns = Vec::with_capacity(self.series.len() + 1);
        let dates: Vec<String> = self.dates.iter().map(|d| d.to_string()).collect();
        columns.push(Column::new(DATE_COLUMN.into(), dates));

        for (name, values) in &self.series {
            let values: Vec<Option<f64>> = values.iter().map(|v| v.value()).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }
}
