use crate::config::{DataConfig, ExportConfig, RateFileConfig};
use crate::data::{PricePanel, RateSeries};
use crate::error::{Result, RiskError};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use super::{
    types::{DatasetMetadata, DATE_FORMATS},
    validator::DataValidator,
};

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| RiskError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load a wide price table (one date column, one close column per asset)
    pub fn load_panel<P: AsRef<Path>>(path: P, config: &DataConfig) -> Result<PricePanel> {
        let df = Self::load(&path)?;
        let panel = Self::panel_from_dataframe(&df, config)?;

        log::info!(
            "Loaded {} days for {} assets from {}",
            panel.len(),
            panel.num_assets(),
            path.as_ref().display()
        );
        Ok(panel)
    }

    pub fn panel_from_dataframe(df: &DataFrame, config: &DataConfig) -> Result<PricePanel> {
        let date_column = DataValidator::find_date_column(df, config.date_column.as_deref())?;
        let price_columns: Vec<String> = df
            .get_column_names()
            .iter()
            .filter(|col| col.as_str() != date_column)
            .map(|col| col.to_string())
            .collect();

        DataValidator::validate_numeric(df, &price_columns)?;

        let null_report = DataValidator::check_nulls(df)?;
        if !null_report.is_empty() {
            log::warn!("Null values detected: {:?}", null_report);
        }

        let dates = Self::parse_dates(df, &date_column)?;

        let mut columns = Vec::with_capacity(price_columns.len());
        for name in &price_columns {
            let prices = df.column(name)?.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = prices.f64()?.into_iter().collect();
            columns.push((Self::clean_ticker(name, config), values));
        }

        let panel = PricePanel::from_raw(dates, columns, config.missing)?;
        DataValidator::validate_minimum_rows(panel.len(), config.min_observations, "price panel")?;
        Ok(panel)
    }

    /// Load a daily risk-free factor file into a rate series
    pub fn load_rates<P: AsRef<Path>>(path: P, config: &RateFileConfig) -> Result<RateSeries> {
        let separator = u8::try_from(config.separator)
            .map_err(|_| RiskError::Configuration("Rate file separator must be ASCII".to_string()))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_skip_rows(config.skip_rows)
            .map_parse_options(|opts| {
                opts.with_separator(separator)
                    .with_encoding(CsvEncoding::LossyUtf8)
            })
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| RiskError::DataLoading(format!("Failed to read rate file: {}", e)))?;

        let rates = Self::rates_from_dataframe(&df, config)?;
        log::info!(
            "Loaded {} daily risk-free rates from {}",
            rates.len(),
            path.as_ref().display()
        );
        Ok(rates)
    }

    pub fn rates_from_dataframe(df: &DataFrame, config: &RateFileConfig) -> Result<RateSeries> {
        let date_column = Self::find_column_containing(df, &config.date_column_hint)?;
        let factor_column = Self::find_column_containing(df, &config.factor_column_hint)?;

        let raw_dates = df.column(&date_column)?.cast(&DataType::String)?;
        let factor = df.column(&factor_column)?;

        let factors: Vec<Option<f64>> = match factor.dtype() {
            DataType::String => factor
                .str()?
                .into_iter()
                .map(|cell| cell.and_then(|s| parse_number(s, config.decimal_comma)))
                .collect(),
            _ => {
                let cast = factor.cast(&DataType::Float64)?;
                cast.f64()?.into_iter().collect()
            }
        };

        let mut rows: Vec<(NaiveDate, f64)> = Vec::with_capacity(df.height());
        for (date, factor) in raw_dates.str()?.into_iter().zip(factors) {
            // footer and blank rows carry no date or no factor
            if let (Some(date), Some(factor)) = (date.and_then(parse_date), factor) {
                rows.push((date, factor));
            }
        }
        rows.sort_by_key(|(date, _)| *date);
        rows.dedup_by_key(|(date, _)| *date);

        let (dates, factors) = rows.into_iter().unzip();
        RateSeries::from_factors(dates, factors)
    }

    /// Write a table as delimited text with fixed float precision
    pub fn write_table<W: Write>(df: &mut DataFrame, writer: W, config: &ExportConfig) -> Result<()> {
        let separator = config.separator_byte()?;

        CsvWriter::new(writer)
            .include_header(true)
            .with_separator(separator)
            .with_float_precision(Some(config.precision))
            .with_null_value(config.undefined_marker.clone())
            .finish(df)?;

        Ok(())
    }

    pub fn export_table<P: AsRef<Path>>(df: &mut DataFrame, path: P, config: &ExportConfig) -> Result<()> {
        let file = File::create(&path)?;
        Self::write_table(df, file, config)?;

        log::info!("Results exported to {}", path.as_ref().display());
        Ok(())
    }

    /// Create metadata for a loaded panel
    pub fn create_metadata<P: AsRef<Path>>(path: P, panel: &PricePanel) -> DatasetMetadata {
        let date_range = match (panel.dates().first(), panel.dates().last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        };

        let price_range = panel
            .assets()
            .iter()
            .flat_map(|a| a.values().iter().copied())
            .fold(None, |acc: Option<(f64, f64)>, p| match acc {
                Some((min, max)) => Some((min.min(p), max.max(p))),
                None => Some((p, p)),
            })
            .unwrap_or((0.0, 0.0));

        DatasetMetadata {
            file_path: path.as_ref().to_string_lossy().to_string(),
            num_rows: panel.len(),
            num_assets: panel.num_assets(),
            assets: panel.asset_names().iter().map(|s| s.to_string()).collect(),
            date_range,
            price_range,
        }
    }

    // Helper functions
    fn parse_dates(df: &DataFrame, date_column: &str) -> Result<Vec<NaiveDate>> {
        let raw = df.column(date_column)?.cast(&DataType::String)?;
        raw.str()?
            .into_iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.and_then(parse_date).ok_or_else(|| {
                    RiskError::DataLoading(format!(
                        "Unparseable date {:?} at row {}",
                        cell, row
                    ))
                })
            })
            .collect()
    }

    fn clean_ticker(name: &str, config: &DataConfig) -> String {
        match &config.ticker_suffix {
            Some(suffix) => name.strip_suffix(suffix.as_str()).unwrap_or(name).to_string(),
            None => name.to_string(),
        }
    }

    fn find_column_containing(df: &DataFrame, hint: &str) -> Result<String> {
        let hint = hint.to_lowercase();
        df.get_column_names()
            .iter()
            .find(|col| col.to_lowercase().contains(&hint))
            .map(|col| col.to_string())
            .ok_or_else(|| RiskError::DataLoading(format!(
                "No column matching '{}'",
                hint
            )))
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    // datetime cells keep only their date part
    let text = text.split(|c| c == ' ' || c == 'T').next().unwrap_or(text);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_number(text: &str, decimal_comma: bool) -> Option<f64> {
    let text = text.trim();
    if decimal_comma {
        text.replace('.', "").replace(',', ".").parse().ok()
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_panel_from_dataframe() {
        let df = df! {
            "Date" => &["2024-01-02", "2024-01-03", "2024-01-04"],
            "PETR4.SA" => &[Some(30.0), None, Some(32.0)],
            "VALE3.SA" => &[Some(60.0), Some(61.0), Some(59.0)],
        }
        .unwrap();

        let config = DataConfig {
            ticker_suffix: Some(".SA".to_string()),
            ..Default::default()
        };
        let panel = CsvConnector::panel_from_dataframe(&df, &config).unwrap();

        assert_eq!(panel.asset_names(), vec!["PETR4", "VALE3"]);
        assert_eq!(panel.prices("PETR4").unwrap(), &[30.0, 30.0, 32.0]);
        assert_eq!(panel.dates()[2], NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn test_panel_requires_minimum_rows() {
        let df = df! {
            "date" => &["2024-01-02"],
            "PETR4" => &[30.0],
        }
        .unwrap();

        let result = CsvConnector::panel_from_dataframe(&df, &DataConfig::default());
        assert!(matches!(result, Err(RiskError::InsufficientData { .. })));
    }

    #[test]
    fn test_rates_with_decimal_comma() {
        let df = df! {
            "Data" => &["02/01/2024", "03/01/2024", ""],
            "Fator Diario" => &["1,00043739", "1,00043739", ""],
        }
        .unwrap();

        let rates = CsvConnector::rates_from_dataframe(&df, &RateFileConfig::di_pre_over()).unwrap();
        assert_eq!(rates.len(), 2);
        assert!((rates.daily_rates()[0] - 0.00043739).abs() < 1e-12);
        assert_eq!(rates.dates()[1], NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 17);
        assert_eq!(parse_date("2024-05-17"), expected);
        assert_eq!(parse_date("17/05/2024"), expected);
        assert_eq!(parse_date("2024-05-17 00:00:00"), expected);
        assert_eq!(parse_date("May 17"), None);
    }
}
