mod csv;
mod types;
mod validator;

pub use csv::CsvConnector;
pub use types::{DatasetMetadata, DATE_ALIASES, DATE_FORMATS};
pub use validator::DataValidator;
