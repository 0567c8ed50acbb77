pub mod evaluation;
pub mod metrics;
pub mod orchestrator;

pub use orchestrator::{AnalysisOrchestrator, AnalysisReport};
