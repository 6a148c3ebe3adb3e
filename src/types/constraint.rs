//! Per-channel spend bounds

use crate::errors::{MixError, Result};
use serde::{Deserialize, Serialize};

/// Optional minimum/maximum spend for one channel
///
/// Missing bounds default to `[0, total_budget]` at allocation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl BudgetConstraint {
    /// Only a lower bound
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Only an upper bound
    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Both bounds
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Effective `[lo, hi]` interval for a given total budget
    pub fn resolve(&self, total_budget: f64) -> (f64, f64) {
        (self.min.unwrap_or(0.0), self.max.unwrap_or(total_budget))
    }

    /// Both bounds non-negative and finite, `min <= max`
    pub fn validate(&self, channel: &str) -> Result<()> {
        for (label, bound) in [("min", self.min), ("max", self.max)] {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    return Err(MixError::InvalidConstraint {
                        channel: channel.to_string(),
                        reason: format!("{} must be a non-negative number, got {}", label, value),
                    });
                }
            }
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(MixError::InvalidConstraint {
                    channel: channel.to_string(),
                    reason: format!("min {} exceeds max {}", min, max),
                });
            }
        }

        Ok(())
    }
}
