use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RiskError};

/// The nine per-asset statistics reported in a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sharpe,
    Sortino,
    Volatility,
    MaxDrawdown,
    ValueAtRisk,
    ConditionalValueAtRisk,
    SemiDeviation,
    UlcerIndex,
    MeanAbsoluteDeviation,
}

impl Metric {
    pub const COUNT: usize = 9;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Sharpe,
        Metric::Sortino,
        Metric::Volatility,
        Metric::MaxDrawdown,
        Metric::ValueAtRisk,
        Metric::ConditionalValueAtRisk,
        Metric::SemiDeviation,
        Metric::UlcerIndex,
        Metric::MeanAbsoluteDeviation,
    ];

    /// Column name used in exported tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sharpe => "sharpe",
            Self::Sortino => "sortino",
            Self::Volatility => "volatility",
            Self::MaxDrawdown => "max_drawdown",
            Self::ValueAtRisk => "var",
            Self::ConditionalValueAtRisk => "cvar",
            Self::SemiDeviation => "semidev",
            Self::UlcerIndex => "ulcer",
            Self::MeanAbsoluteDeviation => "mad",
        }
    }

    pub fn ui_name(&self) -> &'static str {
        match self {
            Self::Sharpe => "Sharpe Ratio",
            Self::Sortino => "Sortino Ratio",
            Self::Volatility => "Annualized Volatility",
            Self::MaxDrawdown => "Maximum Drawdown",
            Self::ValueAtRisk => "Value at Risk",
            Self::ConditionalValueAtRisk => "Conditional Value at Risk",
            Self::SemiDeviation => "Semi-Deviation",
            Self::UlcerIndex => "Ulcer Index",
            Self::MeanAbsoluteDeviation => "Mean Absolute Deviation",
        }
    }

    /// Whether the statistic reduces the price series rather than the returns
    pub fn uses_prices(&self) -> bool {
        matches!(self, Self::MaxDrawdown | Self::UlcerIndex)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a statistic could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndefinedReason {
    EmptySeries,
    TooFewObservations,
    ZeroVariance,
    NoDownside,
    InsufficientWindow,
    InvalidParameter,
    NonFinite,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptySeries => "empty series",
            Self::TooFewObservations => "too few observations",
            Self::ZeroVariance => "zero variance",
            Self::NoDownside => "no downside observations",
            Self::InsufficientWindow => "window not yet full",
            Self::InvalidParameter => "parameter out of range",
            Self::NonFinite => "non-finite result",
        };
        f.write_str(text)
    }
}

/// A computed statistic or an explicit marker that it is not computable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl MetricValue {
    /// Wraps a raw result, flagging NaN and infinities instead of passing them on.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Self::Defined(value)
        } else {
            Self::Undefined(UndefinedReason::NonFinite)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(*v),
            Self::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }

    pub fn map<F: FnOnce(f64) -> f64>(self, f: F) -> Self {
        match self {
            Self::Defined(v) => Self::from_f64(f(v)),
            undefined => undefined,
        }
    }

    /// Turns the sentinel into a hard error for callers that need a number.
    pub fn require(self, metric: Metric) -> Result<f64> {
        match self {
            Self::Defined(v) => Ok(v),
            Self::Undefined(reason) => Err(RiskError::UndefinedMetric { metric, reason }),
        }
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => Self::from_f64(v),
            None => Self::Undefined(UndefinedReason::TooFewObservations),
        }
    }
}

/// All nine statistics for one series; every slot is always populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    values: [MetricValue; Metric::COUNT],
}

impl MetricSet {
    pub fn new(values: [MetricValue; Metric::COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, metric: Metric) -> MetricValue {
        self.values[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, MetricValue)> + '_ {
        Metric::ALL.iter().map(move |&m| (m, self.get(m)))
    }

    pub fn undefined(&self) -> Vec<Metric> {
        self.iter()
            .filter(|(_, v)| !v.is_defined())
            .map(|(m, _)| m)
            .collect()
    }
}

/// How daily returns are derived from consecutive prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReturnKind {
    #[default]
    Simple,
    Log,
}
