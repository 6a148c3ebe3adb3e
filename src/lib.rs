//! channelmix - Channel attribution and budget allocation
//!
//! Consumes the output of a marketing-mix model fit (per-channel
//! contribution series and ROI estimates) and produces:
//!
//! - **Attribution**: a performance summary with contribution shares and
//!   ROI intervals per channel
//! - **Budget**: an ROI-proportional reallocation of a total budget that
//!   honors per-channel min/max spend and preserves the total exactly
//!
//! Both kernels are pure functions over their arguments. Dataset
//! preparation, a seeded synthetic fit, reporting and the CLI sit around
//! them.

pub mod errors;
pub mod types;
pub mod attribution;
pub mod budget;

// Re-export commonly used types
pub use errors::{MixError, Result};
pub use attribution::{aggregate, summarize, ChannelInput, ChannelPerformance, ModelFit};
pub use budget::{allocate, BudgetAllocator};
pub use types::{Allocation, BudgetConstraint, ChannelName, ChannelSeries, RoiEstimate};

// Data preparation and reporting
pub mod dataset;
pub mod synthetic;
pub mod report;

// Interface layer
pub mod cli;
pub mod telemetry;
