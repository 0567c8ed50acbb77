use chrono::NaiveDate;
use serde::Serialize;

use super::connectors::DataValidator;
use crate::config::MissingDataPolicy;
use crate::engines::metrics::{correlation_matrix, CorrelationMatrix};
use crate::error::{Result, RiskError};
use crate::types::ReturnKind;

/// One named, date-aligned column of a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetSeries {
    name: String,
    values: Vec<f64>,
}

impl AssetSeries {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Daily closing prices for several assets on a shared date axis.
///
/// Construction validates everything the metric reductions rely on: dates
/// strictly increasing, unique asset names, every column as long as the date
/// axis, and every price finite and positive. The panel cannot be mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePanel {
    dates: Vec<NaiveDate>,
    assets: Vec<AssetSeries>,
}

impl PricePanel {
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        DataValidator::validate_dates(&dates)?;
        DataValidator::validate_asset_names(columns.iter().map(|(name, _)| name.as_str()))?;

        for (name, values) in &columns {
            if values.len() != dates.len() {
                return Err(RiskError::Misaligned(format!(
                    "asset '{}' has {} prices for {} dates",
                    name,
                    values.len(),
                    dates.len()
                )));
            }
            DataValidator::validate_prices(name, values)?;
        }

        let assets = columns
            .into_iter()
            .map(|(name, values)| AssetSeries { name, values })
            .collect();

        Ok(Self { dates, assets })
    }

    /// Build a panel from columns with gaps, resolving them with `policy`.
    pub fn from_raw(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<Option<f64>>)>,
        policy: MissingDataPolicy,
    ) -> Result<Self> {
        for (name, values) in &columns {
            if values.len() != dates.len() {
                return Err(RiskError::Misaligned(format!(
                    "asset '{}' has {} cells for {} dates",
                    name,
                    values.len(),
                    dates.len()
                )));
            }
        }

        let mut columns = columns;
        if policy == MissingDataPolicy::ForwardFill {
            for (name, values) in columns.iter_mut() {
                let filled = forward_fill(values);
                if filled > 0 {
                    log::warn!("Forward-filled {} missing prices for {}", filled, name);
                }
            }
        }

        let keep: Vec<bool> = (0..dates.len())
            .map(|row| columns.iter().all(|(_, values)| values[row].is_some()))
            .collect();
        let dropped = keep.iter().filter(|&&k| !k).count();
        if dropped > 0 {
            log::warn!("Dropped {} dates with incomplete prices ({:?})", dropped, policy);
        }

        let dates = dates
            .into_iter()
            .zip(&keep)
            .filter_map(|(date, &k)| k.then_some(date))
            .collect();
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let values = values
                    .into_iter()
                    .zip(&keep)
                    .filter_map(|(v, &k)| if k { v } else { None })
                    .collect();
                (name, values)
            })
            .collect();

        Self::new(dates, columns)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of trading dates
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn assets(&self) -> &[AssetSeries] {
        &self.assets
    }

    pub fn asset_names(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.name()).collect()
    }

    pub fn prices(&self, asset: &str) -> Option<&[f64]> {
        self.assets
            .iter()
            .find(|a| a.name == asset)
            .map(|a| a.values())
    }
}

/// Returns on the price panel's date axis minus its first date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnPanel {
    kind: ReturnKind,
    dates: Vec<NaiveDate>,
    assets: Vec<AssetSeries>,
}

impl ReturnPanel {
    pub(crate) fn new(kind: ReturnKind, dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Self {
        let assets = columns
            .into_iter()
            .map(|(name, values)| AssetSeries { name, values })
            .collect();
        Self { kind, dates, assets }
    }

    pub fn kind(&self) -> ReturnKind {
        self.kind
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn assets(&self) -> &[AssetSeries] {
        &self.assets
    }

    pub fn asset_names(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.name()).collect()
    }

    pub fn returns(&self, asset: &str) -> Option<&[f64]> {
        self.assets
            .iter()
            .find(|a| a.name == asset)
            .map(|a| a.values())
    }

    /// Pearson correlation between every pair of assets
    pub fn correlation_matrix(&self) -> CorrelationMatrix {
        correlation_matrix(self)
    }
}

fn forward_fill(values: &mut [Option<f64>]) -> usize {
    let mut last = None;
    let mut filled = 0;
    for cell in values.iter_mut() {
        match cell {
            Some(v) => last = Some(*v),
            None => {
                if last.is_some() {
                    *cell = last;
                    filled += 1;
                }
            }
        }
    }
    filled
}
