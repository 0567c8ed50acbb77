use serde::{Deserialize, Serialize};
use polars::prelude::*;
use std::collections::BTreeMap;

use crate::{
    config::{ConfigSection, MetricsConfig, PortfolioConfig},
    data::{PricePanel, ReturnPanel},
    engines::metrics::{returns, risk, stats, RiskMetricsEngine},
    error::{Result, RiskError},
    types::{MetricSet, MetricValue, ReturnKind},
};

/// Validated allocation: finite weights summing to 1 within tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    entries: Vec<(String, f64)>,
}

impl Weights {
    pub fn new<I, S>(entries: I, tolerance: f64) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let entries: Vec<(String, f64)> = entries
            .into_iter()
            .map(|(asset, w)| (asset.into(), w))
            .collect();

        if entries.is_empty() {
            return Err(RiskError::InvalidWeights("no weights given".to_string()));
        }
        for (i, (asset, w)) in entries.iter().enumerate() {
            if !w.is_finite() {
                return Err(RiskError::InvalidWeights(format!(
                    "weight for {} is not finite",
                    asset
                )));
            }
            if entries[..i].iter().any(|(other, _)| other == asset) {
                return Err(RiskError::InvalidWeights(format!(
                    "{} weighted twice",
                    asset
                )));
            }
        }

        let total: f64 = entries.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > tolerance {
            return Err(RiskError::InvalidWeights(format!(
                "weights sum to {:.6}, expected 1.0",
                total
            )));
        }

        Ok(Self { entries })
    }

    /// 1/n for each asset
    pub fn equal(assets: &[&str]) -> Result<Self> {
        let n = assets.len() as f64;
        Self::new(assets.iter().map(|a| (a.to_string(), 1.0 / n)), 1e-9)
    }

    /// Weight of `asset`, zero when it is not part of the allocation
    pub fn get(&self, asset: &str) -> f64 {
        self.entries
            .iter()
            .find(|(name, _)| name == asset)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(a, w)| (a.as_str(), *w))
    }
}

/// Summary statistics of one weighted portfolio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStatistics {
    pub total_return: MetricValue,
    pub annualized_return: MetricValue,
    pub annualized_volatility: MetricValue,
    pub sharpe_ratio: MetricValue,
    pub max_drawdown: MetricValue,
    pub skewness: MetricValue,
    pub kurtosis: MetricValue,
    pub value_at_risk: MetricValue,
    pub conditional_value_at_risk: MetricValue,
}

impl PortfolioStatistics {
    pub const COLUMNS: [&'static str; 9] = [
        "total_return",
        "annualized_return",
        "annualized_volatility",
        "sharpe_ratio",
        "max_drawdown",
        "skewness",
        "kurtosis",
        "var",
        "cvar",
    ];

    /// Values in `COLUMNS` order
    pub fn values(&self) -> [MetricValue; 9] {
        [
            self.total_return,
            self.annualized_return,
            self.annualized_volatility,
            self.sharpe_ratio,
            self.max_drawdown,
            self.skewness,
            self.kurtosis,
            self.value_at_risk,
            self.conditional_value_at_risk,
        ]
    }
}

/// Strategy name × portfolio statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub rows: Vec<(String, PortfolioStatistics)>,
}

impl StrategyComparison {
    pub fn get(&self, strategy: &str) -> Option<&PortfolioStatistics> {
        self.rows
            .iter()
            .find(|(name, _)| name == strategy)
            .map(|(_, stats)| stats)
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(PortfolioStatistics::COLUMNS.len() + 1);
        let names: Vec<&str> = self.rows.iter().map(|(name, _)| name.as_str()).collect();
        columns.push(Column::new("strategy".into(), names));

        for (i, column) in PortfolioStatistics::COLUMNS.iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows
                .iter()
                .map(|(_, stats)| stats.values()[i].value())
                .collect();
            columns.push(Column::new((*column).into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Weighted combinations of the assets of one price panel.
///
/// Portfolio returns are always built from simple returns; log returns do
/// not aggregate linearly across assets.
pub struct PortfolioAnalyzer {
    returns: ReturnPanel,
    engine: RiskMetricsEngine,
    config: PortfolioConfig,
}

impl PortfolioAnalyzer {
    pub fn new(prices: &PricePanel, metrics: MetricsConfig, config: PortfolioConfig) -> Result<Self> {
        config.validate()?;

        let returns = returns::compute_returns(prices, ReturnKind::Simple)?;
        let engine = RiskMetricsEngine::new(MetricsConfig {
            return_kind: ReturnKind::Simple,
            ..metrics
        })?;

        Ok(Self { returns, engine, config })
    }

    pub fn assets(&self) -> Vec<&str> {
        self.returns.asset_names()
    }

    /// Validate raw weights against this panel and the configured tolerance.
    pub fn weights(&self, raw: &BTreeMap<String, f64>) -> Result<Weights> {
        let weights = Weights::new(
            raw.iter().map(|(a, w)| (a.clone(), *w)),
            self.config.weight_tolerance,
        )?;
        self.check_assets(&weights)?;
        Ok(weights)
    }

    pub fn equal_weights(&self) -> Result<Weights> {
        Weights::equal(&self.assets())
    }

    /// Weighted sum of asset returns per day
    pub fn portfolio_returns(&self, weights: &Weights) -> Result<Vec<f64>> {
        self.check_assets(weights)?;

        let mut combined = vec![0.0; self.returns.len()];
        for asset in self.returns.assets() {
            let w = weights.get(asset.name());
            if w == 0.0 {
                continue;
            }
            for (total, r) in combined.iter_mut().zip(asset.values()) {
                *total += w * r;
            }
        }
        Ok(combined)
    }

    /// Value path starting at the configured initial value
    pub fn portfolio_value(&self, weights: &Weights) -> Result<Vec<f64>> {
        let returns = self.portfolio_returns(weights)?;
        Ok(returns::reconstruct_prices(
            self.config.initial_value,
            &returns,
            ReturnKind::Simple,
        ))
    }

    /// The nine engine metrics for the portfolio series
    pub fn metrics(&self, weights: &Weights) -> Result<MetricSet> {
        let returns = self.portfolio_returns(weights)?;
        let values = returns::reconstruct_prices(self.config.initial_value, &returns, ReturnKind::Simple);
        self.engine.metric_set(&values, &returns, None)
    }

    pub fn statistics(&self, weights: &Weights) -> Result<PortfolioStatistics> {
        let returns = self.portfolio_returns(weights)?;
        let values = returns::reconstruct_prices(self.config.initial_value, &returns, ReturnKind::Simple);
        let c = self.engine.config();

        let total_return = match values.last() {
            Some(last) if !returns.is_empty() => MetricValue::from_f64(last / self.config.initial_value - 1.0),
            _ => MetricValue::from(None::<f64>),
        };

        Ok(PortfolioStatistics {
            total_return,
            annualized_return: stats::mean(&returns)
                .map(|m| m * c.periods_per_year)
                .into(),
            annualized_volatility: risk::volatility(&returns, c.periods_per_year),
            sharpe_ratio: risk::sharpe_ratio(&returns, c.risk_free_rate, c.periods_per_year),
            max_drawdown: risk::max_drawdown(&values),
            skewness: stats::skewness(&returns).into(),
            kurtosis: stats::excess_kurtosis(&returns).into(),
            value_at_risk: risk::value_at_risk(&returns, c.confidence),
            conditional_value_at_risk: risk::conditional_value_at_risk(&returns, c.confidence),
        })
    }

    /// Statistics for every named allocation. Any invalid allocation fails
    /// the whole comparison.
    pub fn compare_strategies(
        &self,
        strategies: &BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Result<StrategyComparison> {
        let validated = strategies
            .iter()
            .map(|(name, raw)| {
                self.weights(raw)
                    .map(|w| (name.clone(), w))
                    .map_err(|e| match e {
                        RiskError::InvalidWeights(msg) => {
                            RiskError::InvalidWeights(format!("strategy '{}': {}", name, msg))
                        }
                        other => other,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(validated.len());
        for (name, weights) in validated {
            log::debug!("Evaluating strategy {}", name);
            rows.push((name, self.statistics(&weights)?));
        }

        log::info!("Compared {} portfolio strategies", rows.len());
        Ok(StrategyComparison { rows })
    }

    /// Compare the configured strategies, or the sample set when none are configured
    pub fn compare_configured(&self) -> Result<StrategyComparison> {
        if self.config.strategies.is_empty() {
            self.compare_strategies(&sample_strategies(&self.assets()))
        } else {
            self.compare_strategies(&self.config.strategies)
        }
    }

    fn check_assets(&self, weights: &Weights) -> Result<()> {
        for (asset, _) in weights.iter() {
            if self.returns.returns(asset).is_none() {
                return Err(RiskError::InvalidWeights(format!(
                    "unknown asset '{}'",
                    asset
                )));
            }
        }
        Ok(())
    }
}

/// Reference allocations: equal weight for any universe, plus conservative,
/// aggressive and defensive tilts when there are exactly five assets
/// (two cyclicals, two banks, one staple, in that order).
pub fn sample_strategies(assets: &[&str]) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut strategies = BTreeMap::new();
    if assets.is_empty() {
        return strategies;
    }

    let n = assets.len() as f64;
    strategies.insert(
        "Equal Weight".to_string(),
        assets.iter().map(|a| (a.to_string(), 1.0 / n)).collect(),
    );

    if assets.len() == 5 {
        let tilts: [(&str, [f64; 5]); 3] = [
            ("Conservative", [0.15, 0.15, 0.30, 0.30, 0.10]),
            ("Aggressive", [0.35, 0.35, 0.10, 0.10, 0.10]),
            ("Defensive", [0.10, 0.10, 0.25, 0.25, 0.30]),
        ];
        for (name, weights) in tilts {
            strategies.insert(
                name.to_string(),
                assets.iter().map(|a| a.to_string()).zip(weights).collect(),
            );
        }
    }

    strategies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_must_sum_to_one() {
        let result = Weights::new([("A", 0.5), ("B", 0.4)], 1e-6);
        assert!(matches!(result, Err(RiskError::InvalidWeights(_))));

        let weights = Weights::new([("A", 0.5), ("B", 0.5)], 1e-6).unwrap();
        assert_eq!(weights.get("B"), 0.5);
        assert_eq!(weights.get("C"), 0.0);
    }

    #[test]
    fn test_weights_reject_empty_and_duplicates() {
        assert!(Weights::new(Vec::<(String, f64)>::new(), 1e-6).is_err());
        assert!(Weights::new([("A", 0.5), ("A", 0.5)], 1e-6).is_err());
        assert!(Weights::new([("A", f64::NAN), ("B", 1.0)], 1e-6).is_err());
    }

    #[test]
    fn test_sample_strategies_sum_to_one() {
        let assets = ["PETR4", "VALE3", "ITUB4", "BBDC4", "ABEV3"];
        let strategies = sample_strategies(&assets);
        assert_eq!(strategies.len(), 4);
        for (name, weights) in &strategies {
            let total: f64 = weights.values().sum();
            assert!((total - 1.0).abs() < 1e-9, "{} sums to {}", name, total);
        }
        assert_eq!(strategies["Defensive"]["ABEV3"], 0.30);

        assert_eq!(sample_strategies(&["A", "B"]).len(), 1);
    }
}
