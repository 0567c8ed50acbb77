pub mod portfolio;

pub use portfolio::{
    sample_strategies, PortfolioAnalyzer, PortfolioStatistics, StrategyComparison, Weights,
};
