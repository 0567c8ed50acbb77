pub mod stats;
pub mod returns;
pub mod risk;
pub mod rolling;
pub mod summary;
pub mod engine;

pub use engine::RiskMetricsEngine;
pub use returns::{compute_returns, correlation_matrix, reconstruct_prices, CorrelationMatrix};
pub use summary::{AssetMetrics, MetricsSummary, RollingMetric};
