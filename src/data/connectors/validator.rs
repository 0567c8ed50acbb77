use crate::error::{Result, RiskError};
use chrono::NaiveDate;
use polars::prelude::*;
use super::types::DATE_ALIASES;
use std::collections::HashSet;

pub struct DataValidator;

impl DataValidator {
    /// Dates must be strictly increasing (sorted, no duplicates)
    pub fn validate_dates(dates: &[NaiveDate]) -> Result<()> {
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(RiskError::InvalidPanel(format!(
                "dates not strictly increasing: {} followed by {}",
                w[0], w[1]
            )));
        }
        Ok(())
    }

    pub fn validate_asset_names<'a, I>(names: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        for name in names {
            if name.trim().is_empty() {
                return Err(RiskError::InvalidPanel("empty asset name".to_string()));
            }
            if !seen.insert(name) {
                return Err(RiskError::InvalidPanel(format!(
                    "duplicate asset '{}'",
                    name
                )));
            }
        }
        if seen.is_empty() {
            return Err(RiskError::InvalidPanel("panel has no assets".to_string()));
        }
        Ok(())
    }

    /// Every price must be finite and strictly positive
    pub fn validate_prices(asset: &str, prices: &[f64]) -> Result<()> {
        if let Some((i, p)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(RiskError::InvalidPanel(format!(
                "asset '{}' has invalid price {} at row {}",
                asset, p, i
            )));
        }
        Ok(())
    }

    /// Check for minimum required rows
    pub fn validate_minimum_rows(rows: usize, min_rows: usize, context: &str) -> Result<()> {
        if rows < min_rows {
            return Err(RiskError::InsufficientData {
                context: context.to_string(),
                required: min_rows,
                found: rows,
            });
        }
        Ok(())
    }

    /// Resolve the date column: the configured name, else the first known alias
    pub fn find_date_column(df: &DataFrame, configured: Option<&str>) -> Result<String> {
        let columns = df.get_column_names();
        if let Some(name) = configured {
            return columns
                .iter()
                .find(|col| col.as_str() == name)
                .map(|col| col.to_string())
                .ok_or_else(|| RiskError::DataLoading(format!(
                    "Missing date column '{}'",
                    name
                )));
        }

        DATE_ALIASES
            .iter()
            .find(|&&alias| columns.iter().any(|col| col.as_str() == alias))
            .map(|alias| alias.to_string())
            .ok_or_else(|| RiskError::DataLoading(format!(
                "Missing date column (tried aliases: {:?})",
                DATE_ALIASES
            )))
    }

    /// Price columns must hold numbers
    pub fn validate_numeric(df: &DataFrame, columns: &[String]) -> Result<()> {
        for name in columns {
            let series = df.column(name)?;
            if !matches!(series.dtype(), DataType::Float64 | DataType::Float32 | DataType::Int64 | DataType::Int32 | DataType::UInt64 | DataType::UInt32) {
                return Err(RiskError::DataLoading(format!(
                    "Column '{}' must be numeric, found {:?}",
                    name,
                    series.dtype()
                )));
            }
        }
        Ok(())
    }

    /// Check for null values per column
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for col_name in df.get_column_names() {
            let series = df.column(col_name.as_str())?;
            let null_count = series.null_count();
            if null_count > 0 {
                null_report.push((col_name.to_string(), null_count));
            }
        }

        Ok(null_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_unsorted_dates_rejected() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DataValidator::validate_dates(&[d0, d1]).is_ok());
        assert!(DataValidator::validate_dates(&[d1, d0]).is_err());
        assert!(DataValidator::validate_dates(&[d0, d0]).is_err());
    }

    #[test]
    fn test_duplicate_assets_rejected() {
        assert!(DataValidator::validate_asset_names(["PETR4", "VALE3"]).is_ok());
        assert!(DataValidator::validate_asset_names(["PETR4", "PETR4"]).is_err());
        assert!(DataValidator::validate_asset_names(Vec::<&str>::new()).is_err());
    }

    #[test]
    fn test_date_column_aliases() {
        let df = df! {
            "Date" => &["2024-01-01", "2024-01-02"],
            "PETR4" => &[30.0, 31.0],
        }
        .unwrap();

        assert_eq!(DataValidator::find_date_column(&df, None).unwrap(), "Date");
        assert!(DataValidator::find_date_column(&df, Some("when")).is_err());
    }

    #[test]
    fn test_non_numeric_price_column() {
        let df = df! {
            "date" => &["2024-01-01", "2024-01-02"],
            "PETR4" => &["a", "b"],
        }
        .unwrap();

        let result = DataValidator::validate_numeric(&df, &["PETR4".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_nulls() {
        let df = df! {
            "date" => &["2024-01-01", "2024-01-02"],
            "PETR4" => &[Some(30.0), None],
        }
        .unwrap();

        let report = DataValidator::check_nulls(&df).unwrap();
        assert_eq!(report, vec![("PETR4".to_string(), 1)]);
    }
}
