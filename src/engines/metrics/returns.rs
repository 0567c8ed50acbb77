// src/engines/metrics/returns.rs
use serde::Serialize;

use super::stats;
use crate::data::{PricePanel, ReturnPanel};
use crate::error::{Result, RiskError};
use crate::types::{MetricValue, ReturnKind, UndefinedReason};

/// Period returns of a single price series; needs at least two prices.
pub fn series_returns(prices: &[f64], kind: ReturnKind) -> Result<Vec<f64>> {
    if prices.len() < 2 {
        return Err(RiskError::InsufficientData {
            context: "price series".to_string(),
            required: 2,
            found: prices.len(),
        });
    }
    Ok(prices
        .windows(2)
        .map(|w| match kind {
            ReturnKind::Simple => w[1] / w[0] - 1.0,
            ReturnKind::Log => (w[1] / w[0]).ln(),
        })
        .collect())
}

/// Derive the return panel; every asset must have at least two prices.
pub fn compute_returns(prices: &PricePanel, kind: ReturnKind) -> Result<ReturnPanel> {
    if prices.len() < 2 {
        let asset = prices.asset_names().first().map(|s| s.to_string()).unwrap_or_default();
        return Err(RiskError::InsufficientData {
            context: format!("asset '{}'", asset),
            required: 2,
            found: prices.len(),
        });
    }

    let columns = prices
        .assets()
        .iter()
        .map(|asset| {
            let returns = series_returns(asset.values(), kind)?;
            Ok((asset.name().to_string(), returns))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReturnPanel::new(kind, prices.dates()[1..].to_vec(), columns))
}

/// Rebuild a price path from its first price and its returns.
pub fn reconstruct_prices(first_price: f64, returns: &[f64], kind: ReturnKind) -> Vec<f64> {
    let mut prices = Vec::with_capacity(returns.len() + 1);
    prices.push(first_price);

    let mut current = first_price;
    for &r in returns {
        current *= match kind {
            ReturnKind::Simple => 1.0 + r,
            ReturnKind::Log => r.exp(),
        };
        prices.push(current);
    }
    prices
}

/// Pairwise Pearson correlation of the assets in a return panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub assets: Vec<String>,
    pub values: Vec<Vec<MetricValue>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<MetricValue> {
        let i = self.assets.iter().position(|x| x == a)?;
        let j = self.assets.iter().position(|x| x == b)?;
        Some(self.values[i][j])
    }
}

pub fn correlation_matrix(returns: &ReturnPanel) -> CorrelationMatrix {
    let assets = returns.assets();
    let values = assets
        .iter()
        .map(|a| {
            assets
                .iter()
                .map(|b| match stats::correlation(a.values(), b.values()) {
                    Some(c) => MetricValue::from_f64(c),
                    None if a.values().len() < 2 => {
                        MetricValue::Undefined(UndefinedReason::TooFewObservations)
                    }
                    None => MetricValue::Undefined(UndefinedReason::ZeroVariance),
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        assets: returns.asset_names().iter().map(|s| s.to_string()).collect(),
        values,
    }
}
