pub mod traits;
pub mod data;
pub mod metrics;
pub mod portfolio;
pub mod export;
pub mod manager;

pub use manager::AppConfig;
pub use data::{DataConfig, MissingDataPolicy, RateFileConfig};
pub use metrics::MetricsConfig;
pub use portfolio::PortfolioConfig;
pub use export::ExportConfig;
pub use traits::ConfigSection;
