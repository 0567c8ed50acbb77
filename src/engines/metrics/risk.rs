// src/engines/metrics/risk.rs
//! The nine per-series reductions.
//!
//! Every function is pure and total: inputs that do not support the
//! statistic produce `MetricValue::Undefined` with a reason instead of NaN,
//! infinity, or a panic. Return-based functions take period returns, the
//! drawdown family takes prices.

use super::stats;
use crate::error::{Result, RiskError};
use crate::types::{MetricValue, UndefinedReason};

/// Standard deviations below this are treated as zero. Constant-growth
/// series leave rounding noise around 1e-17 that would otherwise blow up
/// the ratios.
///
/// The cut-off is absolute, in return units per period. A money-market
/// series moving by 1e-7 a day is still far above it.
pub const ZERO_TOLERANCE: f64 = 1e-12;

fn guard(values: &[f64], min_len: usize) -> Option<MetricValue> {
    if values.is_empty() {
        return Some(MetricValue::Undefined(UndefinedReason::EmptySeries));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Some(MetricValue::Undefined(UndefinedReason::NonFinite));
    }
    if values.len() < min_len {
        return Some(MetricValue::Undefined(UndefinedReason::TooFewObservations));
    }
    None
}

fn guard_prices(prices: &[f64]) -> Option<MetricValue> {
    if let Some(undefined) = guard(prices, 1) {
        return Some(undefined);
    }
    if prices.iter().any(|&p| p <= 0.0) {
        return Some(MetricValue::Undefined(UndefinedReason::InvalidParameter));
    }
    None
}

fn check_rates(returns: &[f64], daily_rates: &[f64]) -> Result<()> {
    if returns.len() != daily_rates.len() {
        return Err(RiskError::Misaligned(format!(
            "{} returns against {} risk-free rates",
            returns.len(),
            daily_rates.len()
        )));
    }
    Ok(())
}

fn downside(returns: &[f64]) -> Vec<f64> {
    returns.iter().copied().filter(|&r| r < 0.0).collect()
}

/// Sample deviation of the strictly negative returns
fn downside_deviation(returns: &[f64]) -> std::result::Result<f64, UndefinedReason> {
    let losses = downside(returns);
    match losses.len() {
        0 => Err(UndefinedReason::NoDownside),
        1 => Err(UndefinedReason::TooFewObservations),
        _ => match stats::sample_std_dev(&losses) {
            Some(d) if d >= ZERO_TOLERANCE => Ok(d),
            _ => Err(UndefinedReason::ZeroVariance),
        },
    }
}

/// Annualized Sharpe ratio against a constant annual risk-free rate.
///
/// Undefined with `ZeroVariance` when the sample deviation is below the
/// absolute [`ZERO_TOLERANCE`].
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> MetricValue {
    if let Some(undefined) = guard(returns, 2) {
        return undefined;
    }
    let rf_period = risk_free_rate / periods_per_year;
    let (Some(mean), Some(std)) = (stats::mean(returns), stats::sample_std_dev(returns)) else {
        return MetricValue::Undefined(UndefinedReason::TooFewObservations);
    };
    if std < ZERO_TOLERANCE {
        return MetricValue::Undefined(UndefinedReason::ZeroVariance);
    }
    MetricValue::from_f64(periods_per_year.sqrt() * (mean - rf_period) / std)
}

/// Sharpe ratio against a per-period rate series aligned with `returns`.
///
/// Mean and deviation are both taken over the excess series.
pub fn sharpe_ratio_with_rates(
    returns: &[f64],
    daily_rates: &[f64],
    periods_per_year: f64,
) -> Result<MetricValue> {
    check_rates(returns, daily_rates)?;
    let excess: Vec<f64> = returns.iter().zip(daily_rates).map(|(r, rf)| r - rf).collect();
    Ok(sharpe_ratio(&excess, 0.0, periods_per_year))
}

/// Sharpe with the deviation of negative returns as denominator.
///
/// A downside deviation below the absolute [`ZERO_TOLERANCE`] is
/// `ZeroVariance`.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> MetricValue {
    if let Some(undefined) = guard(returns, 2) {
        return undefined;
    }
    let rf_period = risk_free_rate / periods_per_year;
    let Some(mean) = stats::mean(returns) else {
        return MetricValue::Undefined(UndefinedReason::EmptySeries);
    };
    match downside_deviation(returns) {
        Ok(dd) => MetricValue::from_f64(periods_per_year.sqrt() * (mean - rf_period) / dd),
        Err(reason) => MetricValue::Undefined(reason),
    }
}

/// Sortino against a per-period rate series. Downside is still judged on the
/// raw returns.
pub fn sortino_ratio_with_rates(
    returns: &[f64],
    daily_rates: &[f64],
    periods_per_year: f64,
) -> Result<MetricValue> {
    check_rates(returns, daily_rates)?;
    if let Some(undefined) = guard(returns, 2) {
        return Ok(undefined);
    }
    let excess: Vec<f64> = returns.iter().zip(daily_rates).map(|(r, rf)| r - rf).collect();
    let Some(mean_excess) = stats::mean(&excess) else {
        return Ok(MetricValue::Undefined(UndefinedReason::EmptySeries));
    };
    Ok(match downside_deviation(returns) {
        Ok(dd) => MetricValue::from_f64(periods_per_year.sqrt() * mean_excess / dd),
        Err(reason) => MetricValue::Undefined(reason),
    })
}

/// Annualized sample standard deviation.
pub fn volatility(returns: &[f64], periods_per_year: f64) -> MetricValue {
    if let Some(undefined) = guard(returns, 2) {
        return undefined;
    }
    stats::sample_std_dev(returns)
        .map(|std| std * periods_per_year.sqrt())
        .into()
}

/// Fractional distance of every price below its running peak (values ≤ 0).
pub fn drawdown_series(prices: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    prices
        .iter()
        .map(|&price| {
            if price > peak {
                peak = price;
            }
            (price - peak) / peak
        })
        .collect()
}

/// Deepest drawdown over the series, as a non-positive fraction.
pub fn max_drawdown(prices: &[f64]) -> MetricValue {
    if let Some(undefined) = guard_prices(prices) {
        return undefined;
    }
    let deepest = drawdown_series(prices)
        .into_iter()
        .fold(0.0_f64, f64::min);
    MetricValue::from_f64(deepest)
}

/// Historical VaR: the `1 - confidence` quantile of returns.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> MetricValue {
    if !(confidence > 0.0 && confidence < 1.0) {
        return MetricValue::Undefined(UndefinedReason::InvalidParameter);
    }
    if let Some(undefined) = guard(returns, 1) {
        return undefined;
    }
    stats::quantile(returns, 1.0 - confidence).into()
}

/// Expected shortfall: mean of the returns at or below VaR.
pub fn conditional_value_at_risk(returns: &[f64], confidence: f64) -> MetricValue {
    let var = match value_at_risk(returns, confidence) {
        MetricValue::Defined(v) => v,
        undefined => return undefined,
    };
    let tail: Vec<f64> = returns.iter().copied().filter(|&r| r <= var).collect();
    // averaging ties can round a hair above the threshold
    stats::mean(&tail).map(|m| m.min(var)).into()
}

/// Sample deviation of the strictly negative returns (per period).
pub fn semi_deviation(returns: &[f64]) -> MetricValue {
    if let Some(undefined) = guard(returns, 1) {
        return undefined;
    }
    let losses = downside(returns);
    match losses.len() {
        0 => MetricValue::Undefined(UndefinedReason::NoDownside),
        _ => stats::sample_std_dev(&losses).into(),
    }
}

/// Root mean square of the drawdown series.
pub fn ulcer_index(prices: &[f64]) -> MetricValue {
    if let Some(undefined) = guard_prices(prices) {
        return undefined;
    }
    let squares: Vec<f64> = drawdown_series(prices).iter().map(|d| d * d).collect();
    stats::mean(&squares).map(f64::sqrt).into()
}

/// Mean absolute deviation of returns from their mean.
pub fn mean_absolute_deviation(returns: &[f64]) -> MetricValue {
    if let Some(undefined) = guard(returns, 1) {
        return undefined;
    }
    let Some(mean) = stats::mean(returns) else {
        return MetricValue::Undefined(UndefinedReason::EmptySeries);
    };
    let deviations: Vec<f64> = returns.iter().map(|r| (r - mean).abs()).collect();
    stats::mean(&deviations).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICES: [f64; 4] = [100.0, 110.0, 99.0, 121.0];

    fn approx(value: MetricValue, expected: f64) {
        let v = value.value().unwrap_or_else(|| panic!("expected a number, got {:?}", value));
        assert!((v - expected).abs() < 1e-9, "{} != {}", v, expected);
    }

    #[test]
    fn test_max_drawdown_scenario() {
        approx(max_drawdown(&PRICES), -0.10);
        let dd = drawdown_series(&PRICES);
        assert_eq!(dd[0], 0.0);
        assert!((dd[2] + 0.10).abs() < 1e-12);
        assert_eq!(dd[3], 0.0);
    }

    #[test]
    fn test_drawdown_counts_first_price_as_peak() {
        approx(max_drawdown(&[100.0, 90.0, 95.0]), -0.10);
    }

    #[test]
    fn test_ulcer_index_scenario() {
        // drawdowns 0, 0, -0.1, 0
        approx(ulcer_index(&PRICES), (0.01f64 / 4.0).sqrt());
    }

    #[test]
    fn test_sharpe_known_value() {
        let returns = [0.01, -0.02, 0.03];
        let mean = 0.02 / 3.0;
        let std = stats::sample_std_dev(&returns).unwrap();
        approx(sharpe_ratio(&returns, 0.0, 252.0), 252f64.sqrt() * mean / std);

        let rf = 0.0252;
        approx(
            sharpe_ratio(&returns, rf, 252.0),
            252f64.sqrt() * (mean - 0.0001) / std,
        );
    }

    #[test]
    fn test_sharpe_zero_variance_is_undefined() {
        assert_eq!(
            sharpe_ratio(&[0.01, 0.01, 0.01], 0.0, 252.0),
            MetricValue::Undefined(UndefinedReason::ZeroVariance)
        );
        assert_eq!(
            sharpe_ratio(&[], 0.0, 252.0),
            MetricValue::Undefined(UndefinedReason::EmptySeries)
        );
    }

    #[test]
    fn test_sortino_without_losses_is_undefined() {
        assert_eq!(
            sortino_ratio(&[0.01, 0.0, 0.02], 0.0, 252.0),
            MetricValue::Undefined(UndefinedReason::NoDownside)
        );
        assert_eq!(
            sortino_ratio(&[0.01, -0.01, 0.02], 0.0, 252.0),
            MetricValue::Undefined(UndefinedReason::TooFewObservations)
        );
    }

    #[test]
    fn test_sortino_known_value() {
        let returns = [0.02, -0.01, 0.03, -0.03];
        let mean = 0.01 / 4.0;
        let dd = stats::sample_std_dev(&[-0.01, -0.03]).unwrap();
        approx(sortino_ratio(&returns, 0.0, 252.0), 252f64.sqrt() * mean / dd);
    }

    #[test]
    fn test_rate_series_must_align() {
        let result = sharpe_ratio_with_rates(&[0.01, 0.02], &[0.0], 252.0);
        assert!(matches!(result, Err(RiskError::Misaligned(_))));
    }

    #[test]
    fn test_zero_rates_match_constant_version() {
        let returns = [0.01, -0.02, 0.015, -0.005, 0.0];
        let rates = [0.0; 5];
        assert_eq!(
            sharpe_ratio_with_rates(&returns, &rates, 252.0).unwrap(),
            sharpe_ratio(&returns, 0.0, 252.0)
        );
        assert_eq!(
            sortino_ratio_with_rates(&returns, &rates, 252.0).unwrap(),
            sortino_ratio(&returns, 0.0, 252.0)
        );
    }

    #[test]
    fn test_var_and_cvar() {
        let returns = [-0.05, -0.02, 0.0, 0.01, 0.03];
        // q = 0.05 over 5 points: -0.05 + 0.2 * 0.03
        approx(value_at_risk(&returns, 0.95), -0.044);
        approx(conditional_value_at_risk(&returns, 0.95), -0.05);
        assert_eq!(
            value_at_risk(&returns, 1.5),
            MetricValue::Undefined(UndefinedReason::InvalidParameter)
        );
    }

    #[test]
    fn test_semi_deviation_and_mad() {
        let returns = [0.02, -0.01, 0.03, -0.03];
        approx(semi_deviation(&returns), stats::sample_std_dev(&[-0.01, -0.03]).unwrap());
        // mean 0.0025, deviations 0.0175, 0.0125, 0.0275, 0.0325
        approx(mean_absolute_deviation(&returns), 0.0225);
        assert_eq!(
            semi_deviation(&[0.01, 0.02]),
            MetricValue::Undefined(UndefinedReason::NoDownside)
        );
    }

    #[test]
    fn test_non_finite_input_is_flagged() {
        assert_eq!(
            volatility(&[0.01, f64::NAN], 252.0),
            MetricValue::Undefined(UndefinedReason::NonFinite)
        );
    }

    #[test]
    fn test_low_volatility_series_stays_defined() {
        // a cash-like series: 2 bp a day with sub-micro noise
        let returns: Vec<f64> = (0..252)
            .map(|i| 0.0002 + if i % 2 == 0 { 1e-7 } else { -1e-7 })
            .collect();
        let mut with_losses = returns.clone();
        with_losses[10] = -1e-6;
        with_losses[20] = -2e-6;

        let sharpe = sharpe_ratio(&returns, 0.0, 252.0);
        assert!(sharpe.value().unwrap() > 0.0);
        assert!(sortino_ratio(&with_losses, 0.0, 252.0).is_defined());
    }
}
