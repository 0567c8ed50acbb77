//! Risk statistics for a panel of daily closing prices.
//!
//! A [`data::PricePanel`] goes through [`engines::metrics::RiskMetricsEngine`]
//! to produce a [`engines::metrics::MetricsSummary`] of nine statistics per
//! asset; [`engines::evaluation::PortfolioAnalyzer`] applies the same
//! reductions to weighted portfolios.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use error::{Result, RiskError};
pub use types::{Metric, MetricSet, MetricValue, ReturnKind, UndefinedReason};
