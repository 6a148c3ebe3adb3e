//! Type definitions module
//!
//! Value types shared by the aggregator and the allocator.

pub mod channel;
pub mod constraint;
pub mod allocation;

// Re-export commonly used types
pub use channel::{ChannelName, ChannelSeries, RoiEstimate};
pub use constraint::BudgetConstraint;
pub use allocation::Allocation;
