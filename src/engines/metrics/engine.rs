// src/engines/metrics/engine.rs
use rayon::prelude::*;

use super::{
    returns, risk,
    rolling::{rolling_apply, rolling_prices, rolling_ranges},
    summary::{AssetMetrics, MetricsSummary, RollingMetric},
};
use crate::config::{ConfigSection, MetricsConfig};
use crate::data::{PricePanel, ReturnPanel, RiskFreeRate};
use crate::error::Result;
use crate::types::{Metric, MetricSet, MetricValue, UndefinedReason};

/// Computes the nine statistics for every asset of a price panel.
pub struct RiskMetricsEngine {
    config: MetricsConfig,
}

impl RiskMetricsEngine {
    pub fn new(config: MetricsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn compute_returns(&self, prices: &PricePanel) -> Result<ReturnPanel> {
        returns::compute_returns(prices, self.config.return_kind)
    }

    /// Evaluate one metric for one series.
    ///
    /// `prices` and `returns` describe the same days (`returns` one shorter);
    /// `rates` are per-period risk-free rates aligned with `returns`, and
    /// replace the configured constant rate when present.
    pub fn compute(
        &self,
        metric: Metric,
        prices: &[f64],
        returns: &[f64],
        rates: Option<&[f64]>,
    ) -> Result<MetricValue> {
        let c = &self.config;
        let value = match metric {
            Metric::Sharpe => match rates {
                Some(rates) => risk::sharpe_ratio_with_rates(returns, rates, c.periods_per_year)?,
                None => risk::sharpe_ratio(returns, c.risk_free_rate, c.periods_per_year),
            },
            Metric::Sortino => match rates {
                Some(rates) => risk::sortino_ratio_with_rates(returns, rates, c.periods_per_year)?,
                None => risk::sortino_ratio(returns, c.risk_free_rate, c.periods_per_year),
            },
            Metric::Volatility => risk::volatility(returns, c.periods_per_year),
            Metric::MaxDrawdown => risk::max_drawdown(prices),
            Metric::ValueAtRisk => risk::value_at_risk(returns, c.confidence),
            Metric::ConditionalValueAtRisk => risk::conditional_value_at_risk(returns, c.confidence),
            // reported annualized, like volatility
            Metric::SemiDeviation => {
                risk::semi_deviation(returns).map(|d| d * c.periods_per_year.sqrt())
            }
            Metric::UlcerIndex => risk::ulcer_index(prices),
            Metric::MeanAbsoluteDeviation => risk::mean_absolute_deviation(returns),
        };
        Ok(value)
    }

    /// All nine metrics for one series
    pub fn metric_set(
        &self,
        prices: &[f64],
        returns: &[f64],
        rates: Option<&[f64]>,
    ) -> Result<MetricSet> {
        let mut values = [MetricValue::Undefined(UndefinedReason::EmptySeries); Metric::COUNT];
        for (slot, metric) in values.iter_mut().zip(Metric::ALL) {
            *slot = self.compute(metric, prices, returns, rates)?;
        }
        Ok(MetricSet::new(values))
    }

    /// Summary table using the configured constant risk-free rate
    pub fn summarize(&self, prices: &PricePanel) -> Result<MetricsSummary> {
        self.summarize_with(prices, &RiskFreeRate::Annual(self.config.risk_free_rate))
    }

    pub fn summarize_with(
        &self,
        prices: &PricePanel,
        risk_free: &RiskFreeRate,
    ) -> Result<MetricsSummary> {
        let returns = self.compute_returns(prices)?;
        let engine = self.with_risk_free(risk_free);
        let rates = Self::aligned_rates(&returns, risk_free)?;

        log::info!(
            "Calculating risk metrics for {} assets over {} returns",
            prices.num_assets(),
            returns.len()
        );

        let rows = prices
            .assets()
            .par_iter()
            .zip(returns.assets().par_iter())
            .map(|(price_series, return_series)| {
                let metrics = engine.metric_set(
                    price_series.values(),
                    return_series.values(),
                    rates.as_deref(),
                )?;
                log::debug!("Metrics for {}: {:?}", price_series.name(), metrics);
                Ok(AssetMetrics {
                    asset: price_series.name().to_string(),
                    metrics,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let summary = MetricsSummary::new(rows);
        for (asset, metric) in summary.undefined_cells() {
            log::warn!("{} is undefined for {}", metric.ui_name(), asset);
        }
        Ok(summary)
    }

    /// Rolling values of one metric for every asset on the return date axis
    pub fn rolling(&self, prices: &PricePanel, metric: Metric) -> Result<RollingMetric> {
        self.rolling_with(prices, metric, &RiskFreeRate::Annual(self.config.risk_free_rate))
    }

    pub fn rolling_with(
        &self,
        prices: &PricePanel,
        metric: Metric,
        risk_free: &RiskFreeRate,
    ) -> Result<RollingMetric> {
        let returns = self.compute_returns(prices)?;
        let engine = self.with_risk_free(risk_free);
        let rates = Self::aligned_rates(&returns, risk_free)?;
        let window = self.config.rolling_window;

        let series = prices
            .assets()
            .par_iter()
            .zip(returns.assets().par_iter())
            .map(|(price_series, return_series)| {
                let p = price_series.values();
                let r = return_series.values();
                // slices stay aligned, so compute only fails on bad input checked above
                let eval = |prices: &[f64], returns: &[f64], rates: Option<&[f64]>| {
                    engine
                        .compute(metric, prices, returns, rates)
                        .unwrap_or_else(|e| {
                            log::warn!("Rolling {} failed: {}", metric, e);
                            MetricValue::Undefined(UndefinedReason::InvalidParameter)
                        })
                };
                let values = match rates.as_deref() {
                    _ if metric.uses_prices() => rolling_prices(p, window, |w| eval(w, &[], None)),
                    None => rolling_apply(r, window, |w| eval(&[], w, None)),
                    Some(all) => rolling_ranges(r.len(), window, |range| {
                        eval(&[], &r[range.clone()], Some(&all[range]))
                    }),
                };
                (price_series.name().to_string(), values)
            })
            .collect();

        Ok(RollingMetric {
            metric,
            window,
            dates: returns.dates().to_vec(),
            series,
        })
    }

    fn with_risk_free(&self, risk_free: &RiskFreeRate) -> Self {
        let mut config = self.config.clone();
        if let RiskFreeRate::Annual(rate) = risk_free {
            config.risk_free_rate = *rate;
        }
        Self { config }
    }

    fn aligned_rates(returns: &ReturnPanel, risk_free: &RiskFreeRate) -> Result<Option<Vec<f64>>> {
        match risk_free {
            RiskFreeRate::Annual(_) => Ok(None),
            RiskFreeRate::Daily(series) => series.align_to(returns.dates()).map(Some),
        }
    }
}
