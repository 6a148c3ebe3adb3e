//! Rule-based attribution over an ordered touchpoint list
//!
//! Credit is assigned by position only; the order of `channels` is the
//! order of the customer journey.

use crate::errors::{MixError, Result};
use crate::types::ChannelName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Positional attribution rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionRule {
    /// All credit to the first touchpoint
    FirstTouch,
    /// All credit to the last touchpoint
    LastTouch,
    /// Equal credit to every touchpoint
    Linear,
    /// Linearly increasing weights from 0.5 to 1.5
    PositionWeighted,
}

impl fmt::Display for AttributionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributionRule::FirstTouch => "first_touch",
            AttributionRule::LastTouch => "last_touch",
            AttributionRule::Linear => "linear",
            AttributionRule::PositionWeighted => "position_weighted",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for AttributionRule {
    type Err = MixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first_touch" => Ok(AttributionRule::FirstTouch),
            "last_touch" => Ok(AttributionRule::LastTouch),
            "linear" => Ok(AttributionRule::Linear),
            "position_weighted" => Ok(AttributionRule::PositionWeighted),
            other => Err(MixError::InvalidInput(format!(
                "unknown attribution rule: {}",
                other
            ))),
        }
    }
}

/// Shares and attributed values produced by a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAttribution {
    pub rule: AttributionRule,
    pub shares: BTreeMap<ChannelName, f64>,
    pub attributed_values: BTreeMap<ChannelName, f64>,
    pub total_metric: f64,
}

impl AttributionRule {
    /// Raw positional weights, not yet normalized
    fn weights(&self, n: usize) -> Vec<f64> {
        match self {
            AttributionRule::FirstTouch => (0..n).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect(),
            AttributionRule::LastTouch => (0..n).map(|i| if i + 1 == n { 1.0 } else { 0.0 }).collect(),
            AttributionRule::Linear => vec![1.0; n],
            AttributionRule::PositionWeighted => {
                if n == 1 {
                    vec![0.5]
                } else {
                    let step = 1.0 / (n - 1) as f64;
                    (0..n).map(|i| 0.5 + step * i as f64).collect()
                }
            }
        }
    }

    /// Attribute `total_metric` across `channels` in journey order
    ///
    /// A channel listed more than once accumulates the credit of each
    /// position it occupies.
    pub fn attribute(&self, channels: &[ChannelName], total_metric: f64) -> Result<RuleAttribution> {
        if channels.is_empty() {
            return Err(MixError::InvalidInput(
                "rule-based attribution needs at least one channel".to_string(),
            ));
        }
        if !total_metric.is_finite() {
            return Err(MixError::InvalidInput(format!(
                "total metric must be finite, got {}",
                total_metric
            )));
        }

        let weights = self.weights(channels.len());
        let weight_sum: f64 = weights.iter().sum();

        let mut shares: BTreeMap<ChannelName, f64> = BTreeMap::new();
        for (channel, weight) in channels.iter().zip(weights) {
            *shares.entry(channel.clone()).or_insert(0.0) += weight / weight_sum;
        }

        let attributed_values = shares
            .iter()
            .map(|(channel, share)| (channel.clone(), share * total_metric))
            .collect();

        Ok(RuleAttribution {
            rule: *self,
            shares,
            attributed_values,
            total_metric,
        })
    }
}
