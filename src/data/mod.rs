pub mod connectors;
pub mod panel;
pub mod rates;

pub use connectors::{CsvConnector, DataValidator, DatasetMetadata};
pub use panel::{AssetSeries, PricePanel, ReturnPanel};
pub use rates::{RateSeries, RiskFreeRate};
