use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Common names of the date column in downloaded price tables
pub const DATE_ALIASES: [&str; 8] = [
    "date", "Date", "DATE", "datetime", "Datetime", "DateTime", "timestamp", "Data",
];

/// Date layouts accepted in text date columns
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Metadata about a loaded price panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub file_path: String,
    pub num_rows: usize,
    pub num_assets: usize,
    pub assets: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub price_range: (f64, f64), // (min, max) across all assets
}
