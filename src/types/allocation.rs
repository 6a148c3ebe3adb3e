//! Allocator output

use crate::types::ChannelName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spend per channel, summing to the requested total budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Allocated spend per channel
    pub amounts: BTreeMap<ChannelName, f64>,

    /// Redistribution rounds needed to reach a feasible point
    pub iterations: usize,
}

impl Allocation {
    pub fn new(amounts: BTreeMap<ChannelName, f64>, iterations: usize) -> Self {
        Self { amounts, iterations }
    }

    /// Spend for one channel
    pub fn get(&self, channel: &str) -> Option<f64> {
        self.amounts.get(channel).copied()
    }

    /// Sum across all channels
    pub fn total(&self) -> f64 {
        self.amounts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChannelName, &f64)> {
        self.amounts.iter()
    }

    /// Modeled return of this spend: `sum(spend * roi)`
    ///
    /// Channels without an ROI entry contribute nothing.
    pub fn expected_return(&self, roi: &BTreeMap<ChannelName, f64>) -> f64 {
        self.amounts
            .iter()
            .filter_map(|(channel, spend)| roi.get(channel).map(|r| spend * r))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Allocation {
        let mut amounts = BTreeMap::new();
        amounts.insert("A".to_string(), 80_000.0);
        amounts.insert("B".to_string(), 20_000.0);
        Allocation::new(amounts, 0)
    }

    #[test]
    fn test_total_and_lookup() {
        let allocation = sample();
        assert_eq!(allocation.total(), 100_000.0);
        assert_eq!(allocation.get("A"), Some(80_000.0));
        assert_eq!(allocation.get("C"), None);
        assert_eq!(allocation.len(), 2);
    }

    #[test]
    fn test_expected_return() {
        let allocation = sample();
        let mut roi = BTreeMap::new();
        roi.insert("A".to_string(), 4.0);
        roi.insert("B".to_string(), 1.0);
        assert_eq!(allocation.expected_return(&roi), 340_000.0);
    }
}
