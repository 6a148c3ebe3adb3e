//! ROI-proportional budget allocator
//! Seeds spend in proportion to modeled ROI, then clamps and redistributes
//! until every bound holds and the total is preserved

use crate::budget::types::AllocatorConfig;
use crate::errors::{MixError, Result};
use crate::types::{Allocation, BudgetConstraint, ChannelName};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Budget allocator
///
/// Holds only configuration; every call is a pure function of its
/// arguments, so one allocator may be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct BudgetAllocator {
    config: AllocatorConfig,
}

/// Unconstrained proportional baseline: `roi[c] / sum(roi) * total`
///
/// Channels with non-positive ROI receive a zero or negative seed here;
/// the clamp step lifts them to their minimum.
pub fn proportional_seed(
    roi: &BTreeMap<ChannelName, f64>,
    total_budget: f64,
) -> Result<BTreeMap<ChannelName, f64>> {
    let weight_sum: f64 = roi.values().sum();
    if !(weight_sum > 0.0) {
        return Err(MixError::DegenerateWeights { weight_sum });
    }

    Ok(roi
        .iter()
        .map(|(channel, r)| (channel.clone(), r / weight_sum * total_budget))
        .collect())
}

/// Allocate with the default configuration
pub fn allocate(
    roi: &BTreeMap<ChannelName, f64>,
    total_budget: f64,
    constraints: &BTreeMap<ChannelName, BudgetConstraint>,
) -> Result<Allocation> {
    BudgetAllocator::new().allocate(roi, total_budget, constraints)
}

impl BudgetAllocator {
    /// Create allocator with default configuration
    pub fn new() -> Self {
        Self::with_config(AllocatorConfig::default())
    }

    /// Create allocator with custom configuration
    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Distribute `total_budget` across the channels of `roi`
    ///
    /// Guarantees on success, within the configured tolerance:
    /// - `sum(allocation) == total_budget`
    /// - `min <= allocation[c] <= max` for every constrained channel
    /// - every amount is non-negative
    ///
    /// Fails with `DegenerateWeights` when the ROI sum is not positive and
    /// with `InfeasibleConstraints` when the bounds cannot hold together.
    pub fn allocate(
        &self,
        roi: &BTreeMap<ChannelName, f64>,
        total_budget: f64,
        constraints: &BTreeMap<ChannelName, BudgetConstraint>,
    ) -> Result<Allocation> {
        validate_budget(total_budget)?;
        if let Some((channel, value)) = roi.iter().find(|(_, r)| !r.is_finite()) {
            return Err(MixError::InvalidInput(format!(
                "ROI for {} must be finite, got {}",
                channel, value
            )));
        }
        validate_constraints(roi.keys(), constraints)?;

        let seed = proportional_seed(roi, total_budget)?;
        self.redistribute(seed, total_budget, constraints)
    }

    /// Clamp/redistribute loop over an arbitrary seed
    pub(crate) fn redistribute(
        &self,
        seed: BTreeMap<ChannelName, f64>,
        total_budget: f64,
        constraints: &BTreeMap<ChannelName, BudgetConstraint>,
    ) -> Result<Allocation> {
        let tolerance = self.config.absolute_tolerance(total_budget);

        let names: Vec<ChannelName> = seed.keys().cloned().collect();
        let mut values: Vec<f64> = seed.values().copied().collect();
        let bounds: Vec<(f64, f64)> = names
            .iter()
            .map(|name| {
                constraints
                    .get(name)
                    .map(|c| c.resolve(total_budget))
                    .unwrap_or((0.0, total_budget))
            })
            .collect();

        check_feasible(&names, &bounds, constraints, total_budget, tolerance)?;

        for iteration in 0..=self.config.max_iterations {
            // Low first, then high; min <= max is already validated
            for (value, (lo, hi)) in values.iter_mut().zip(&bounds) {
                *value = value.max(*lo).min(*hi);
            }

            let current: f64 = values.iter().sum();
            let residual = total_budget - current;

            if residual.abs() <= tolerance {
                info!(
                    channels = names.len(),
                    iterations = iteration,
                    total_budget,
                    "budget allocation converged"
                );
                return Ok(Allocation::new(
                    names.into_iter().zip(values).collect(),
                    iteration,
                ));
            }

            if iteration == self.config.max_iterations {
                break;
            }

            let raising = residual > 0.0;
            let free: Vec<usize> = (0..values.len())
                .filter(|&i| {
                    if raising {
                        values[i] < bounds[i].1
                    } else {
                        values[i] > bounds[i].0
                    }
                })
                .collect();

            debug!(
                iteration,
                residual,
                free = free.len(),
                pinned = values.len() - free.len(),
                "redistributing budget residual"
            );

            if free.is_empty() {
                return Err(MixError::InfeasibleConstraints {
                    channels: blocking_channels(&names, &values, &bounds, raising),
                    iterations: iteration,
                });
            }

            let free_sum: f64 = free.iter().map(|&i| values[i]).sum();
            if free_sum > 0.0 {
                let factor = (free_sum + residual) / free_sum;
                for &i in &free {
                    values[i] *= factor;
                }
            } else {
                // Free channels all sit at zero: spread by remaining headroom
                let headroom: f64 = free.iter().map(|&i| bounds[i].1 - values[i]).sum();
                for &i in &free {
                    values[i] += residual * (bounds[i].1 - values[i]) / headroom;
                }
            }
        }

        let current: f64 = values.iter().sum();
        Err(MixError::InfeasibleConstraints {
            channels: blocking_channels(&names, &values, &bounds, total_budget > current),
            iterations: self.config.max_iterations,
        })
    }
}

pub(crate) fn validate_budget(total_budget: f64) -> Result<()> {
    if !total_budget.is_finite() || total_budget <= 0.0 {
        return Err(MixError::InvalidInput(format!(
            "total budget must be a positive number, got {}",
            total_budget
        )));
    }
    Ok(())
}

pub(crate) fn validate_constraints<'a>(
    channels: impl Iterator<Item = &'a ChannelName>,
    constraints: &BTreeMap<ChannelName, BudgetConstraint>,
) -> Result<()> {
    let known: Vec<&ChannelName> = channels.collect();
    for (channel, constraint) in constraints {
        if !known.contains(&channel) {
            return Err(MixError::InvalidConstraint {
                channel: channel.clone(),
                reason: "no such channel".to_string(),
            });
        }
        constraint.validate(channel)?;
    }
    Ok(())
}

/// Reject bound sets that no allocation can satisfy
fn check_feasible(
    names: &[ChannelName],
    bounds: &[(f64, f64)],
    constraints: &BTreeMap<ChannelName, BudgetConstraint>,
    total_budget: f64,
    tolerance: f64,
) -> Result<()> {
    let lo_sum: f64 = bounds.iter().map(|b| b.0).sum();
    if lo_sum > total_budget + tolerance {
        return Err(MixError::InfeasibleConstraints {
            channels: names
                .iter()
                .zip(bounds)
                .filter(|(_, (lo, _))| *lo > 0.0)
                .map(|(name, _)| name.clone())
                .collect(),
            iterations: 0,
        });
    }

    let hi_sum: f64 = bounds.iter().map(|b| b.1).sum();
    if hi_sum < total_budget - tolerance {
        return Err(MixError::InfeasibleConstraints {
            channels: names
                .iter()
                .filter(|name| constraints.get(*name).and_then(|c| c.max).is_some())
                .cloned()
                .collect(),
            iterations: 0,
        });
    }

    Ok(())
}

/// Channels held at the bound that blocks the needed direction
fn blocking_channels(
    names: &[ChannelName],
    values: &[f64],
    bounds: &[(f64, f64)],
    raising: bool,
) -> Vec<ChannelName> {
    let mut blocking = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let (lo, hi) = bounds[i];
        let pinned = if raising {
            values[i] >= hi
        } else {
            values[i] <= lo && lo > 0.0
        };
        if pinned {
            blocking.push(name.clone());
        }
    }
    blocking
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roi(pairs: &[(&str, f64)]) -> BTreeMap<ChannelName, f64> {
        pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }

    fn constraints(pairs: &[(&str, BudgetConstraint)]) -> BTreeMap<ChannelName, BudgetConstraint> {
        pairs.iter().map(|(c, k)| (c.to_string(), *k)).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "Expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_unconstrained_proportional() {
        let result = allocate(&roi(&[("A", 4.0), ("B", 1.0)]), 100_000.0, &BTreeMap::new()).unwrap();
        assert_close(result.get("A").unwrap(), 80_000.0);
        assert_close(result.get("B").unwrap(), 20_000.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_cap_excess_moves_to_other_channel() {
        let result = allocate(
            &roi(&[("A", 4.0), ("B", 1.0)]),
            100_000.0,
            &constraints(&[("A", BudgetConstraint::at_most(50_000.0))]),
        )
        .unwrap();
        assert_close(result.get("A").unwrap(), 50_000.0);
        assert_close(result.get("B").unwrap(), 50_000.0);
        assert_close(result.total(), 100_000.0);
    }

    #[test]
    fn test_minimum_is_funded_from_others() {
        let result = allocate(
            &roi(&[("A", 4.0), ("B", 1.0), ("C", 5.0)]),
            1000.0,
            &constraints(&[("B", BudgetConstraint::at_least(300.0))]),
        )
        .unwrap();
        assert_close(result.get("B").unwrap(), 300.0);
        // A and C keep their 4:5 ratio over the remaining 700
        assert_close(result.get("A").unwrap(), 700.0 * 4.0 / 9.0);
        assert_close(result.get("C").unwrap(), 700.0 * 5.0 / 9.0);
    }

    #[test]
    fn test_cascade_of_caps() {
        let result = allocate(
            &roi(&[("A", 10.0), ("B", 5.0), ("C", 1.0)]),
            100.0,
            &constraints(&[
                ("A", BudgetConstraint::at_most(30.0)),
                ("B", BudgetConstraint::at_most(30.0)),
            ]),
        )
        .unwrap();
        assert_close(result.get("A").unwrap(), 30.0);
        assert_close(result.get("B").unwrap(), 30.0);
        assert_close(result.get("C").unwrap(), 40.0);
        assert!(result.iterations >= 1);
    }

    #[test]
    fn test_negative_roi_channel_gets_zero() {
        let result = allocate(&roi(&[("A", 3.0), ("B", -1.0)]), 100.0, &BTreeMap::new()).unwrap();
        assert_close(result.get("A").unwrap(), 100.0);
        assert_close(result.get("B").unwrap(), 0.0);
    }

    #[test]
    fn test_zero_channels_absorb_by_headroom() {
        // B is seeded negative and clamped to 0; once A is capped only B can grow
        let result = allocate(
            &roi(&[("A", 2.0), ("B", -1.0)]),
            100.0,
            &constraints(&[("A", BudgetConstraint::at_most(10.0))]),
        )
        .unwrap();
        assert_close(result.get("A").unwrap(), 10.0);
        assert_close(result.get("B").unwrap(), 90.0);
    }

    #[test]
    fn test_negative_roi_with_minimum() {
        let result = allocate(
            &roi(&[("A", 3.0), ("B", -1.0)]),
            100.0,
            &constraints(&[("B", BudgetConstraint::at_least(15.0))]),
        )
        .unwrap();
        assert_close(result.get("B").unwrap(), 15.0);
        assert_close(result.get("A").unwrap(), 85.0);
    }

    #[test]
    fn test_degenerate_weights() {
        let err = allocate(&roi(&[("A", -1.0), ("B", -2.0)]), 100_000.0, &BTreeMap::new()).unwrap_err();
        match err {
            MixError::DegenerateWeights { weight_sum } => assert_eq!(weight_sum, -3.0),
            other => panic!("Expected DegenerateWeights, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_channels_are_degenerate() {
        let err = allocate(&BTreeMap::new(), 100.0, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, MixError::DegenerateWeights { .. }));
    }

    #[test]
    fn test_minimums_exceed_budget() {
        let err = allocate(
            &roi(&[("A", 1.0), ("B", 1.0)]),
            100_000.0,
            &constraints(&[
                ("A", BudgetConstraint::at_least(90_000.0)),
                ("B", BudgetConstraint::at_least(90_000.0)),
            ]),
        )
        .unwrap_err();
        match err {
            MixError::InfeasibleConstraints { channels, .. } => {
                assert_eq!(channels, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("Expected InfeasibleConstraints, got {:?}", other),
        }
    }

    #[test]
    fn test_maximums_below_budget() {
        let err = allocate(
            &roi(&[("A", 1.0), ("B", 1.0)]),
            100.0,
            &constraints(&[
                ("A", BudgetConstraint::at_most(20.0)),
                ("B", BudgetConstraint::at_most(30.0)),
            ]),
        )
        .unwrap_err();
        match err {
            MixError::InfeasibleConstraints { channels, .. } => assert_eq!(channels.len(), 2),
            other => panic!("Expected InfeasibleConstraints, got {:?}", other),
        }
    }

    #[test]
    fn test_iteration_cap_reported() {
        // Three caps need three rounds; one round is not enough
        let allocator = BudgetAllocator::with_config(AllocatorConfig {
            max_iterations: 1,
            tolerance: 1e-9,
        });
        let err = allocator
            .allocate(
                &roi(&[("A", 100.0), ("B", 10.0), ("C", 1.0), ("D", 0.1)]),
                100.0,
                &constraints(&[
                    ("A", BudgetConstraint::at_most(25.0)),
                    ("B", BudgetConstraint::at_most(25.0)),
                    ("C", BudgetConstraint::at_most(25.0)),
                ]),
            )
            .unwrap_err();
        match err {
            MixError::InfeasibleConstraints { iterations, .. } => assert_eq!(iterations, 1),
            other => panic!("Expected InfeasibleConstraints, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_budget() {
        for budget in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = allocate(&roi(&[("A", 1.0)]), budget, &BTreeMap::new()).unwrap_err();
            assert!(matches!(err, MixError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_unknown_constraint_channel() {
        let err = allocate(
            &roi(&[("A", 1.0)]),
            100.0,
            &constraints(&[("Z", BudgetConstraint::at_most(5.0))]),
        )
        .unwrap_err();
        assert!(matches!(err, MixError::InvalidConstraint { .. }));
    }

    #[test]
    fn test_inverted_constraint() {
        let err = allocate(
            &roi(&[("A", 1.0), ("B", 1.0)]),
            100.0,
            &constraints(&[("A", BudgetConstraint::between(60.0, 40.0))]),
        )
        .unwrap_err();
        assert!(matches!(err, MixError::InvalidConstraint { .. }));
    }

    #[test]
    fn test_pinned_exact_bounds() {
        let result = allocate(
            &roi(&[("A", 1.0), ("B", 1.0)]),
            100.0,
            &constraints(&[("A", BudgetConstraint::between(70.0, 70.0))]),
        )
        .unwrap();
        assert_eq!(result.get("A"), Some(70.0));
        assert_close(result.get("B").unwrap(), 30.0);
    }

    #[test]
    fn test_seed_degenerate() {
        let err = proportional_seed(&roi(&[("A", 0.0)]), 10.0).unwrap_err();
        assert!(matches!(err, MixError::DegenerateWeights { .. }));
    }

    #[test]
    fn test_repeatable() {
        let weights = roi(&[("A", 3.3), ("B", 1.7), ("C", 0.9)]);
        let bounds = constraints(&[("A", BudgetConstraint::between(100.0, 400.0))]);
        let first = allocate(&weights, 1234.5, &bounds).unwrap();
        let second = allocate(&weights, 1234.5, &bounds).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_large_budget_caps_just_short() {
        let err = allocate(
            &roi(&[("A", 1.0), ("B", 1.0)]),
            10_000_000.0,
            &constraints(&[
                ("A", BudgetConstraint::at_most(5_000_000.0)),
                ("B", BudgetConstraint::at_most(4_999_999.995)),
            ]),
        )
        .unwrap_err();
        match err {
            MixError::InfeasibleConstraints { channels, .. } => {
                assert_eq!(channels, vec!["A".to_string(), "B".to_string()])
            }
            other => panic!("Expected InfeasibleConstraints, got {:?}", other),
        }
    }

    #[test]
    fn test_large_budget_minimums_just_over() {
        let err = allocate(
            &roi(&[("A", 1.0), ("B", 1.0)]),
            10_000_000.0,
            &constraints(&[
                ("A", BudgetConstraint::at_least(5_000_000.0)),
                ("B", BudgetConstraint::at_least(5_000_000.005)),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, MixError::InfeasibleConstraints { .. }));
    }

    #[test]
    fn test_large_budget_total_within_absolute_tolerance() {
        let budget = 12_345_678.9;
        let result = allocate(
            &roi(&[("A", 3.0), ("B", 1.0), ("C", 0.5)]),
            budget,
            &constraints(&[("A", BudgetConstraint::at_most(5_000_000.0))]),
        )
        .unwrap();
        assert!((result.total() - budget).abs() <= 1e-6);
        assert!(result.get("A").unwrap() <= 5_000_000.0 + 1e-6);
    }
}
