//! Equal-split fallback policy
//!
//! Not applied by `allocate`; a caller opts in after seeing
//! `DegenerateWeights`.

use crate::budget::allocator::{validate_budget, validate_constraints, BudgetAllocator};
use crate::budget::types::{AllocationPlan, AllocationPolicy};
use crate::errors::{MixError, Result};
use crate::types::{Allocation, BudgetConstraint, ChannelName};
use std::collections::BTreeMap;
use tracing::warn;

impl BudgetAllocator {
    /// Split `total_budget` evenly across `channels`, honoring constraints
    ///
    /// Runs the same clamp/redistribute loop as `allocate`, seeded with
    /// uniform weights instead of ROI.
    pub fn equal_split<'a>(
        &self,
        channels: impl IntoIterator<Item = &'a ChannelName>,
        total_budget: f64,
        constraints: &BTreeMap<ChannelName, BudgetConstraint>,
    ) -> Result<Allocation> {
        validate_budget(total_budget)?;

        let names: Vec<&ChannelName> = channels.into_iter().collect();
        if names.is_empty() {
            return Err(MixError::InvalidInput(
                "equal split needs at least one channel".to_string(),
            ));
        }
        validate_constraints(names.iter().copied(), constraints)?;

        let share = total_budget / names.len() as f64;
        let seed = names.into_iter().map(|name| (name.clone(), share)).collect();
        self.redistribute(seed, total_budget, constraints)
    }

    /// Allocate and annotate for reporting
    ///
    /// With `fallback_equal` set, `DegenerateWeights` is answered with an
    /// equal split instead of an error. Every other failure propagates.
    pub fn plan(
        &self,
        roi: &BTreeMap<ChannelName, f64>,
        total_budget: f64,
        constraints: &BTreeMap<ChannelName, BudgetConstraint>,
        fallback_equal: bool,
    ) -> Result<AllocationPlan> {
        let (allocation, policy) = match self.allocate(roi, total_budget, constraints) {
            Err(MixError::DegenerateWeights { weight_sum }) if fallback_equal => {
                warn!(weight_sum, "no channel has positive ROI, splitting budget equally");
                let allocation = self.equal_split(roi.keys(), total_budget, constraints)?;
                (allocation, AllocationPolicy::EqualSplit)
            }
            other => (other?, AllocationPolicy::Proportional),
        };

        Ok(AllocationPlan::new(allocation, total_budget, roi, policy))
    }
}
