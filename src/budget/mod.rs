//! Constrained budget allocation
//! ROI-proportional seeding with an iterative clamp/redistribute repair

pub mod allocator;
pub mod fallback;
pub mod types;

pub use allocator::{allocate, proportional_seed, BudgetAllocator};
pub use types::{AllocationPlan, AllocationPolicy, AllocatorConfig};
