//! Channel-level model outputs: contribution series and ROI estimates

use crate::errors::{MixError, Result};
use serde::{Deserialize, Serialize};

/// Marketing channel identifier
pub type ChannelName = String;

/// Per-period modeled contribution of one channel
///
/// One value per reporting period; all channels of a fit share the same
/// period alignment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelSeries(pub Vec<f64>);

impl ChannelSeries {
    /// Create a series from per-period values
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Number of reporting periods
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over all periods
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Check that no value is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for ChannelSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// ROI point estimate with dispersion and a two-sided credible interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiEstimate {
    pub mean: f64,
    pub std: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl RoiEstimate {
    /// Create an estimate without validating it
    pub fn new(mean: f64, std: f64, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            mean,
            std,
            lower_bound,
            upper_bound,
        }
    }

    /// Degenerate estimate with no uncertainty
    pub fn point(mean: f64) -> Self {
        Self::new(mean, 0.0, mean, mean)
    }

    /// Width of the credible interval
    pub fn interval_width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Enforce `lower_bound <= mean <= upper_bound` and `std >= 0`
    pub fn validate(&self, channel: &str) -> Result<()> {
        let fields = [self.mean, self.std, self.lower_bound, self.upper_bound];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(MixError::InvalidInput(format!(
                "ROI estimate for {} has non-finite fields",
                channel
            )));
        }
        if self.std < 0.0 {
            return Err(MixError::InvalidInput(format!(
                "ROI std for {} is negative ({})",
                channel, self.std
            )));
        }
        if !(self.lower_bound <= self.mean && self.mean <= self.upper_bound) {
            return Err(MixError::InvalidInput(format!(
                "ROI interval for {} does not contain its mean: {} <= {} <= {} fails",
                channel, self.lower_bound, self.mean, self.upper_bound
            )));
        }
        Ok(())
    }
}
