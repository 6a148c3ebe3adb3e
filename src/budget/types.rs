//! Budget system type definitions

use crate::types::{Allocation, ChannelName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest total or bound miss ever accepted, regardless of budget size
pub const MAX_ABSOLUTE_TOLERANCE: f64 = 1e-6;

/// Configuration for the clamp/redistribute loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Maximum redistribution rounds (default: 50)
    pub max_iterations: usize,

    /// Total tolerance (default: 1e-9)
    ///
    /// A sum is accepted when
    /// `|sum - total| <= min(tolerance * max(1, |total|), 1e-6)`.
    pub tolerance: f64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-9,
        }
    }
}

impl AllocatorConfig {
    /// Absolute tolerance for a given total, never looser than 1e-6
    pub fn absolute_tolerance(&self, total_budget: f64) -> f64 {
        (self.tolerance * total_budget.abs().max(1.0)).min(MAX_ABSOLUTE_TOLERANCE)
    }
}

/// How the seed weights of an allocation were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Proportional to modeled ROI
    Proportional,
    /// Uniform weights, chosen explicitly by the caller
    EqualSplit,
}

/// Allocation annotated for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub policy: AllocationPolicy,
    pub total_budget: f64,
    pub allocation: Allocation,

    /// Share of the total budget per channel
    pub shares: BTreeMap<ChannelName, f64>,

    /// `sum(spend * roi)` under the modeled ROI means
    pub expected_return: f64,
}

impl AllocationPlan {
    pub fn new(
        allocation: Allocation,
        total_budget: f64,
        roi: &BTreeMap<ChannelName, f64>,
        policy: AllocationPolicy,
    ) -> Self {
        let shares = allocation
            .iter()
            .map(|(channel, spend)| (channel.clone(), spend / total_budget))
            .collect();
        let expected_return = allocation.expected_return(roi);

        Self {
            policy,
            total_budget,
            allocation,
            shares,
            expected_return,
        }
    }

    /// Blended return per unit of spend
    pub fn blended_roi(&self) -> f64 {
        if self.total_budget == 0.0 {
            return 0.0;
        }
        self.expected_return / self.total_budget
    }
}
