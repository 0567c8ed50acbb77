use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::connectors::DataValidator;
use crate::error::{Result, RiskError};

/// Daily risk-free rates keyed by date, e.g. the Brazilian DI overnight rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    dates: Vec<NaiveDate>,
    daily: Vec<f64>,
}

impl RateSeries {
    pub fn new(dates: Vec<NaiveDate>, daily: Vec<f64>) -> Result<Self> {
        DataValidator::validate_dates(&dates)?;
        if dates.len() != daily.len() {
            return Err(RiskError::Misaligned(format!(
                "{} rates for {} dates",
                daily.len(),
                dates.len()
            )));
        }
        if let Some(i) = daily.iter().position(|r| !r.is_finite() || *r <= -1.0) {
            return Err(RiskError::DataLoading(format!(
                "Invalid daily rate {} on {}",
                daily[i], dates[i]
            )));
        }
        Ok(Self { dates, daily })
    }

    /// Build from daily compounding factors (1.00045 means 0.045% for the day).
    pub fn from_factors(dates: Vec<NaiveDate>, factors: Vec<f64>) -> Result<Self> {
        let daily = factors.into_iter().map(|f| f - 1.0).collect();
        Self::new(dates, daily)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn daily_rates(&self) -> &[f64] {
        &self.daily
    }

    pub fn len(&self) -> usize {
        self.daily.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// (1 + daily)^periods - 1 for every date
    pub fn annualized(&self, periods_per_year: f64) -> Vec<f64> {
        self.daily
            .iter()
            .map(|r| (1.0 + r).powf(periods_per_year) - 1.0)
            .collect()
    }

    /// Rates for exactly the requested dates. A date without a rate is an error.
    pub fn align_to(&self, dates: &[NaiveDate]) -> Result<Vec<f64>> {
        dates
            .iter()
            .map(|date| {
                self.dates
                    .binary_search(date)
                    .map(|i| self.daily[i])
                    .map_err(|_| RiskError::Misaligned(format!(
                        "no risk-free rate for {}",
                        date
                    )))
            })
            .collect()
    }
}

/// Risk-free rate used for excess returns
#[derive(Debug, Clone, PartialEq)]
pub enum RiskFreeRate {
    /// Constant annual rate, spread evenly over the periods of a year
    Annual(f64),
    Daily(RateSeries),
}

impl Default for RiskFreeRate {
    fn default() -> Self {
        Self::Annual(0.0)
    }
}
