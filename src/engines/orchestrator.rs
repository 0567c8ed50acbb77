use crate::config::AppConfig;
use crate::data::{CsvConnector, PricePanel, RiskFreeRate};
use crate::engines::evaluation::{PortfolioAnalyzer, StrategyComparison};
use crate::engines::metrics::{CorrelationMatrix, MetricsSummary, RiskMetricsEngine};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;

pub const SUMMARY_FILE: &str = "risk_metrics_summary.csv";
pub const COMPARISON_FILE: &str = "portfolio_comparison.csv";

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub timestamp: String,
    pub summary: MetricsSummary,
    pub comparison: StrategyComparison,
    pub correlation: CorrelationMatrix,
}

/// Runs the full analysis over one caller-owned price panel.
pub struct AnalysisOrchestrator {
    config: AppConfig,
    prices: PricePanel,
    risk_free: RiskFreeRate,
}

impl AnalysisOrchestrator {
    pub fn new(config: AppConfig, prices: PricePanel) -> Result<Self> {
        config.validate()?;
        let risk_free = RiskFreeRate::Annual(config.metrics.risk_free_rate);
        Ok(Self { config, prices, risk_free })
    }

    pub fn from_csv<P: AsRef<Path>>(config: AppConfig, path: P) -> Result<Self> {
        let prices = CsvConnector::load_panel(path, &config.data)?;
        Self::new(config, prices)
    }

    /// Use a daily rate series instead of the configured constant rate
    pub fn with_risk_free(mut self, risk_free: RiskFreeRate) -> Self {
        self.risk_free = risk_free;
        self
    }

    pub fn prices(&self) -> &PricePanel {
        &self.prices
    }

    pub fn run(&self) -> Result<AnalysisReport> {
        let engine = RiskMetricsEngine::new(self.config.metrics.clone())?;
        let summary = engine.summarize_with(&self.prices, &self.risk_free)?;

        let returns = engine.compute_returns(&self.prices)?;
        let correlation = returns.correlation_matrix();

        let analyzer = PortfolioAnalyzer::new(
            &self.prices,
            self.config.metrics.clone(),
            self.config.portfolio.clone(),
        )?;
        let comparison = analyzer.compare_configured()?;

        log::info!(
            "Analysis complete: {} assets, {} strategies",
            summary.rows().len(),
            comparison.rows.len()
        );

        Ok(AnalysisReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            comparison,
            correlation,
        })
    }

    /// Write both tables into `dir`. Both are rendered before either file is
    /// written; a failed second write removes the first file.
    pub fn export<P: AsRef<Path>>(&self, report: &AnalysisReport, dir: P) -> Result<()> {
        let mut summary = Vec::new();
        CsvConnector::write_table(&mut report.summary.to_dataframe()?, &mut summary, &self.config.export)?;
        let mut comparison = Vec::new();
        CsvConnector::write_table(&mut report.comparison.to_dataframe()?, &mut comparison, &self.config.export)?;

        std::fs::create_dir_all(&dir)?;
        let summary_path = dir.as_ref().join(SUMMARY_FILE);
        std::fs::write(&summary_path, summary)?;
        if let Err(e) = std::fs::write(dir.as_ref().join(COMPARISON_FILE), comparison) {
            std::fs::remove_file(&summary_path).ok();
            return Err(e.into());
        }

        log::info!("Results exported to {}", dir.as_ref().display());
        Ok(())
    }
}
