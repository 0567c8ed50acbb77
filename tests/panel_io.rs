use chrono::NaiveDate;
use riskpanel::config::{DataConfig, ExportConfig, MetricsConfig, MissingDataPolicy, RateFileConfig};
use riskpanel::data::{CsvConnector, PricePanel};
use riskpanel::engines::metrics::RiskMetricsEngine;
use riskpanel::RiskError;
use std::path::PathBuf;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("riskpanel_{}_{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_load_panel_fills_gaps() {
    let path = temp_file(
        "prices.csv",
        "Date,PETR4.SA,VALE3.SA\n\
         2024-01-02,,60.0\n\
         2024-01-03,30.0,61.0\n\
         2024-01-04,,59.5\n\
         2024-01-05,31.0,62.0\n",
    );
    let config = DataConfig {
        ticker_suffix: Some(".SA".to_string()),
        ..Default::default()
    };
    let panel = CsvConnector::load_panel(&path, &config).unwrap();

    // the leading gap cannot be filled, so the first date goes
    assert_eq!(panel.len(), 3);
    assert_eq!(panel.dates()[0], date(2024, 1, 3));
    assert_eq!(panel.prices("PETR4").unwrap(), &[30.0, 30.0, 31.0]);
    assert_eq!(panel.prices("VALE3").unwrap(), &[61.0, 59.5, 62.0]);

    let dropped = DataConfig {
        ticker_suffix: Some(".SA".to_string()),
        missing: MissingDataPolicy::DropRows,
        ..Default::default()
    };
    let panel = CsvConnector::load_panel(&path, &dropped).unwrap();
    assert_eq!(panel.dates(), &[date(2024, 1, 3), date(2024, 1, 5)]);

    let metadata = CsvConnector::create_metadata(&path, &panel);
    assert_eq!(metadata.num_assets, 2);
    assert_eq!(metadata.date_range, Some((date(2024, 1, 3), date(2024, 1, 5))));
    assert_eq!(metadata.price_range, (30.0, 62.0));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_panel_rejects_bad_prices() {
    let path = temp_file(
        "negative.csv",
        "date,AAA\n2024-01-02,10.0\n2024-01-03,-1.0\n",
    );
    let result = CsvConnector::load_panel(&path, &DataConfig::default());
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(RiskError::InvalidPanel(_))));
}

#[test]
fn test_missing_file_is_an_error() {
    let result = CsvConnector::load_panel("/nonexistent/prices.csv", &DataConfig::default());
    assert!(result.is_err());
}

#[test]
fn test_load_rate_file() {
    let path = temp_file(
        "di.txt",
        "Taxa DI PRE/OVER\n\
         Fonte: B3\n\
         Data\tFator Diario\tTaxa\n\
         03/01/2024\t1,00043739\t11,65\n\
         02/01/2024\t1,00043739\t11,65\n\
         04/01/2024\t1,00043739\t11,65\n",
    );
    let config = RateFileConfig {
        skip_rows: 2,
        ..RateFileConfig::di_pre_over()
    };
    let rates = CsvConnector::load_rates(&path, &config).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(rates.len(), 3);
    assert_eq!(rates.dates()[0], date(2024, 1, 2));
    assert!((rates.daily_rates()[2] - 0.00043739).abs() < 1e-12);

    let annual = rates.annualized(252.0);
    assert!((annual[0] - 0.1165).abs() < 1e-3);
}

#[test]
fn test_export_summary_with_undefined_cells() {
    let dates = (2..6).map(|d| date(2024, 1, d)).collect();
    let panel = PricePanel::new(
        dates,
        vec![
            ("FLAT".to_string(), vec![10.0, 10.0, 10.0, 10.0]),
            ("UP".to_string(), vec![100.0, 110.0, 99.0, 121.0]),
        ],
    )
    .unwrap();
    let engine = RiskMetricsEngine::new(MetricsConfig::default()).unwrap();
    let summary = engine.summarize(&panel).unwrap();

    let config = ExportConfig {
        undefined_marker: "NA".to_string(),
        ..Default::default()
    };
    let mut df = summary.to_dataframe().unwrap();
    let mut buffer = Vec::new();
    CsvConnector::write_table(&mut df, &mut buffer, &config).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines[0],
        "asset,sharpe,sortino,volatility,max_drawdown,var,cvar,semidev,ulcer,mad"
    );
    assert!(lines[1].starts_with("FLAT,NA,NA,0.0000,0.0000"), "{}", lines[1]);
    // a single losing day is not enough for a downside deviation
    assert!(lines[2].starts_with("UP,"));
    assert!(lines[2].contains("-0.1000"));
}

#[test]
fn test_export_table_to_file() {
    let dates = (2..5).map(|d| date(2024, 1, d)).collect();
    let panel = PricePanel::new(dates, vec![("A".to_string(), vec![1.0, 2.0, 3.0])]).unwrap();
    let engine = RiskMetricsEngine::new(MetricsConfig::default()).unwrap();
    let mut df = engine.summarize(&panel).unwrap().to_dataframe().unwrap();

    let path = std::env::temp_dir().join(format!("riskpanel_{}_summary.csv", std::process::id()));
    let config = ExportConfig {
        separator: ';',
        ..Default::default()
    };
    CsvConnector::export_table(&mut df, &path, &config).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(text.starts_with("asset;sharpe;"));
    assert_eq!(text.lines().count(), 2);
}
