use super::traits::ConfigSection;
use crate::error::RiskError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub precision: usize,
    pub separator: char,
    /// Text written in cells whose statistic is undefined
    pub undefined_marker: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            precision: 4,
            separator: ',',
            undefined_marker: String::new(),
        }
    }
}

impl ExportConfig {
    pub fn separator_byte(&self) -> Result<u8, RiskError> {
        u8::try_from(self.separator)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| RiskError::Configuration(format!(
                "Separator '{}' must be a single ASCII character",
                self.separator
            )))
    }
}

impl ConfigSection for ExportConfig {
    fn section_name() -> &'static str {
        "export"
    }

    fn validate(&self) -> Result<(), RiskError> {
        if self.precision > 16 {
            return Err(RiskError::Configuration(
                "Precision must be at most 16 decimals".to_string()
            ));
        }
        self.separator_byte()?;
        Ok(())
    }
}
