//! Marketing dataset preparation
//!
//! Shapes tabular records (date, target KPI, per-channel spend) into
//! period-aligned series ready for a model fit.

pub mod loader;
pub mod types;

pub use types::{DatasetMetadata, DatasetOptions, MarketingDataset, TARGET_CANDIDATES};
